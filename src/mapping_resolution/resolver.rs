use crate::alias_generator::AliasGenerator;
use crate::query_model::{ConstantRef, DataType, MemberInfo};
use crate::sql_statement::{
    ResolvedJoinInfo, ResolvedSimpleTableInfo, SqlEntity, SqlEntityRefMember, SqlExpr,
    UnresolvedJoinInfo,
};

use super::errors::MappingResolutionError;

/// Schema knowledge the compiler consults while resolving a statement.
///
/// Implementations know table names, columns, primary keys and foreign keys of the
/// mapped types. Anything they cannot map is reported as
/// [`MappingResolutionError::UnmappedType`] or [`MappingResolutionError::UnmappedMember`].
pub trait MappingResolver: Send + Sync {
    /// Table for the items of `item_type`, with a fresh alias from `generator`.
    fn resolve_table_info(
        &self,
        item_type: &DataType,
        generator: &mut AliasGenerator,
    ) -> Result<ResolvedSimpleTableInfo, MappingResolutionError>;

    /// The entity (all mapped columns, primary key first) a row of `table` stands for.
    fn resolve_simple_table_info(
        &self,
        table: &ResolvedSimpleTableInfo,
        generator: &mut AliasGenerator,
    ) -> Result<SqlEntity, MappingResolutionError>;

    /// Joined table and join condition for a navigation from `join.origin`.
    fn resolve_join_info(
        &self,
        join: &UnresolvedJoinInfo,
        generator: &mut AliasGenerator,
    ) -> Result<ResolvedJoinInfo, MappingResolutionError>;

    fn resolve_member_expression(
        &self,
        entity: &SqlEntity,
        member: &MemberInfo,
    ) -> Result<SqlExpr, MappingResolutionError>;

    /// Returns the constant unchanged unless it is a mapped object, which becomes an
    /// [`SqlExpr::EntityConstant`] carrying its identity.
    fn resolve_constant_expression(
        &self,
        constant: &ConstantRef,
    ) -> Result<SqlExpr, MappingResolutionError>;

    /// Predicate checking that the entity `expression` is of the subtype `desired_type`.
    fn resolve_type_check(
        &self,
        expression: &SqlExpr,
        desired_type: &DataType,
    ) -> Result<SqlExpr, MappingResolutionError>;

    /// Identity of the navigation target read from the origin's own columns, if the
    /// origin holds a foreign key to it.
    fn try_resolve_optimized_identity(&self, entity_ref: &SqlEntityRefMember) -> Option<SqlExpr>;

    /// A member of the navigation target available on the origin without a join.
    fn try_resolve_optimized_member(
        &self,
        entity_ref: &SqlEntityRefMember,
        member: &MemberInfo,
    ) -> Option<SqlExpr>;
}
