use std::sync::Arc;

use linqsql::alias_generator::AliasGenerator;
use linqsql::mapping_resolution::{MappingResolutionError, MappingResolver};
use linqsql::query_model::{ConstantRef, DataType, Expression, MemberInfo, QueryModel};
use linqsql::sql_statement::{
    IdentitySelector, ResolvedJoinInfo, ResolvedSimpleTableInfo, SqlColumn, SqlEntity,
    SqlEntityRefMember, SqlExpr, UnresolvedJoinInfo,
};
use linqsql::{ErrorKind, QueryCompiler};
use mockall::mock;
use pretty_assertions::assert_eq;

use super::fixtures::*;

mock! {
    pub Resolver {}

    impl MappingResolver for Resolver {
        fn resolve_table_info(
            &self,
            item_type: &DataType,
            generator: &mut AliasGenerator,
        ) -> Result<ResolvedSimpleTableInfo, MappingResolutionError>;

        fn resolve_simple_table_info(
            &self,
            table: &ResolvedSimpleTableInfo,
            generator: &mut AliasGenerator,
        ) -> Result<SqlEntity, MappingResolutionError>;

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

        fn resolve_constant_expression(
            &self,
            constant: &ConstantRef,
        ) -> Result<SqlExpr, MappingResolutionError>;

        fn resolve_type_check(
            &self,
            expression: &SqlExpr,
            desired_type: &DataType,
        ) -> Result<SqlExpr, MappingResolutionError>;

        fn try_resolve_optimized_identity(&self, entity_ref: &SqlEntityRefMember) -> Option<SqlExpr>;

        fn try_resolve_optimized_member(
            &self,
            entity_ref: &SqlEntityRefMember,
            member: &MemberInfo,
        ) -> Option<SqlExpr>;
    }
}

fn person_type() -> DataType {
    DataType::entity("Person")
}

#[test]
fn test_table_name_comes_from_resolver() {
    init_logging();
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve_table_info()
        .times(1)
        .returning(|item_type, generator| {
            Ok(ResolvedSimpleTableInfo::new(
                item_type.clone(),
                "People",
                generator.table_alias(),
            ))
        });
    resolver
        .expect_resolve_simple_table_info()
        .returning(|table, _| {
            Ok(SqlEntity::definition(
                table.item_type.clone(),
                table.table_alias.clone(),
                None,
                IdentitySelector::primary_key(),
                vec![
                    SqlColumn::definition(DataType::Int32, table.table_alias.clone(), "PersonID", true),
                    SqlColumn::definition(DataType::String, table.table_alias.clone(), "FullName", false),
                ],
            ))
        });
    resolver
        .expect_resolve_member_expression()
        .times(1)
        .returning(|entity, member| {
            assert_eq!(member.name, "Name");
            Ok(SqlExpr::Column(entity.get_column(DataType::String, "FullName", false)))
        });

    let p = from_table("p", person_type());
    let name = Expression::source(&p).member(MemberInfo::new("Person", "Name", DataType::String));
    let model = QueryModel::new(p.clone(), name);

    let command = QueryCompiler::new(Arc::new(resolver)).compile(&model).unwrap();

    assert_eq!(command.command_text, "SELECT [t0].[FullName] FROM [People] AS [t0]");
}

#[test]
fn test_resolver_failure_stops_compilation() {
    init_logging();
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve_table_info()
        .times(1)
        .returning(|item_type, _| Err(MappingResolutionError::unmapped_type(item_type)));
    resolver.expect_resolve_simple_table_info().never();
    resolver.expect_resolve_member_expression().never();

    let p = from_table("p", person_type());
    let model = QueryModel::new(p.clone(), Expression::source(&p));

    let error = QueryCompiler::new(Arc::new(resolver)).compile(&model).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnmappedItem);
    assert!(error.to_string().contains("Person"));
}
