//! A small mapped schema and a [`MappingResolver`] over it, for tests and examples.
//!
//! `Cook` lives in `CookTable`, `Kitchen` in `KitchenTable`, `Restaurant` in
//! `RestaurantTable`, `Assistant` in `AssistantTable`. `Chef` derives from `Cook` and
//! lives in `dbo.ChefTable`.

use crate::alias_generator::AliasGenerator;
use crate::mapping_resolution::{MappingResolutionError, MappingResolver};
use crate::query_model::{ConstantRef, DataType, EntityType, MemberInfo, Value};
use crate::sql_statement::{
    Cardinality, IdentitySelector, ResolvedJoinInfo, ResolvedSimpleTableInfo, SqlColumn,
    SqlEntity, SqlEntityConstant, SqlEntityRefMember, SqlExpr, UnresolvedJoinInfo,
};

pub const COOK: &str = "Cook";
pub const CHEF: &str = "Chef";
pub const KITCHEN: &str = "Kitchen";
pub const RESTAURANT: &str = "Restaurant";
pub const ASSISTANT: &str = "Assistant";

pub fn cook_type() -> DataType {
    DataType::entity(COOK)
}

pub fn chef_type() -> DataType {
    DataType::Entity(EntityType::derived(CHEF, EntityType::new(COOK)))
}

pub fn kitchen_type() -> DataType {
    DataType::entity(KITCHEN)
}

pub fn restaurant_type() -> DataType {
    DataType::entity(RESTAURANT)
}

pub fn assistant_type() -> DataType {
    DataType::entity(ASSISTANT)
}

/// `(column, type, is_primary_key)` for each mapped scalar member, primary key first.
fn columns_of(type_name: &str) -> Option<Vec<(&'static str, DataType, bool)>> {
    let cook_columns = vec![
        ("ID", DataType::Int32, true),
        ("FirstName", DataType::String, false),
        ("Name", DataType::String, false),
        ("IsStarredCook", DataType::Boolean, false),
        ("Weight", DataType::Double, false),
        ("KitchenID", DataType::nullable(DataType::Int32), false),
    ];
    match type_name {
        COOK => Some(cook_columns),
        CHEF => {
            let mut columns = cook_columns;
            columns.push(("LetterOfRecommendation", DataType::String, false));
            Some(columns)
        }
        KITCHEN => Some(vec![
            ("ID", DataType::Int32, true),
            ("Name", DataType::String, false),
            ("RestaurantID", DataType::nullable(DataType::Int32), false),
        ]),
        RESTAURANT => Some(vec![
            ("ID", DataType::Int32, true),
            ("Name", DataType::String, false),
        ]),
        ASSISTANT => Some(vec![
            ("ID", DataType::Int32, true),
            ("Name", DataType::String, false),
            ("AssistedID", DataType::Int32, false),
        ]),
        _ => None,
    }
}

fn table_name_of(type_name: &str) -> Option<&'static str> {
    match type_name {
        COOK => Some("CookTable"),
        CHEF => Some("dbo.ChefTable"),
        KITCHEN => Some("KitchenTable"),
        RESTAURANT => Some("RestaurantTable"),
        ASSISTANT => Some("AssistantTable"),
        _ => None,
    }
}

fn type_by_name(type_name: &str) -> Option<DataType> {
    match type_name {
        COOK => Some(cook_type()),
        CHEF => Some(chef_type()),
        KITCHEN => Some(kitchen_type()),
        RESTAURANT => Some(restaurant_type()),
        ASSISTANT => Some(assistant_type()),
        _ => None,
    }
}

/// A scalar member of a fixture type, e.g. `member(COOK, "FirstName")`.
///
/// Panics for members outside the fixture schema.
pub fn member(type_name: &str, name: &str) -> MemberInfo {
    if let Some(navigation) = navigation_member(type_name, name) {
        return navigation;
    }
    let ty = columns_of(type_name)
        .and_then(|columns| {
            columns
                .into_iter()
                .find(|(column, _, _)| *column == name)
                .map(|(_, ty, _)| ty)
        })
        .unwrap_or_else(|| panic!("{}.{} is not part of the fixture schema", type_name, name));
    MemberInfo::new(type_name, name, ty)
}

fn navigation_member(type_name: &str, name: &str) -> Option<MemberInfo> {
    let ty = match (type_name, name) {
        (COOK | CHEF, "Kitchen") => kitchen_type(),
        (COOK | CHEF, "Assistants") => DataType::sequence_of(assistant_type()),
        (KITCHEN, "Cook") => cook_type(),
        (KITCHEN, "Restaurant") => restaurant_type(),
        _ => return None,
    };
    Some(MemberInfo::new(type_name, name, ty))
}

/// A mapped cook object, usable as a constant.
pub fn cook_value(id: i32, first_name: &str) -> Value {
    Value::Entity {
        type_name: COOK.to_string(),
        fields: vec![
            ("ID".to_string(), Value::Int32(id)),
            ("FirstName".to_string(), Value::from(first_name)),
        ],
    }
}

/// Resolves the fixture schema. `Cook.Kitchen` is read from `KitchenID` without a join
/// when only the kitchen's identity is needed.
#[derive(Debug, Default, Clone)]
pub struct MappingResolverStub;

impl MappingResolverStub {
    pub fn new() -> Self {
        MappingResolverStub
    }

    fn join_columns(member: &MemberInfo) -> Option<(&'static str, &'static str, DataType)> {
        // (origin column, foreign column, foreign type)
        match (member.declaring_type.as_str(), member.name.as_str()) {
            (COOK | CHEF, "Kitchen") => Some(("KitchenID", "ID", kitchen_type())),
            (COOK | CHEF, "Assistants") => Some(("ID", "AssistedID", assistant_type())),
            (KITCHEN, "Cook") => Some(("ID", "KitchenID", cook_type())),
            (KITCHEN, "Restaurant") => Some(("RestaurantID", "ID", restaurant_type())),
            _ => None,
        }
    }
}

impl MappingResolver for MappingResolverStub {
    fn resolve_table_info(
        &self,
        item_type: &DataType,
        generator: &mut AliasGenerator,
    ) -> Result<ResolvedSimpleTableInfo, MappingResolutionError> {
        let entity_type = item_type
            .entity_type()
            .ok_or_else(|| MappingResolutionError::unmapped_type(item_type))?;
        let table_name = table_name_of(&entity_type.name)
            .ok_or_else(|| MappingResolutionError::unmapped_type(item_type))?;
        Ok(ResolvedSimpleTableInfo::new(
            item_type.clone(),
            table_name,
            generator.table_alias(),
        ))
    }

    fn resolve_simple_table_info(
        &self,
        table: &ResolvedSimpleTableInfo,
        _generator: &mut AliasGenerator,
    ) -> Result<SqlEntity, MappingResolutionError> {
        let columns = table
            .item_type
            .entity_type()
            .and_then(|entity_type| columns_of(&entity_type.name))
            .ok_or_else(|| MappingResolutionError::unmapped_type(&table.item_type))?;
        Ok(SqlEntity::definition(
            table.item_type.clone(),
            table.table_alias.clone(),
            None,
            IdentitySelector::primary_key(),
            columns
                .into_iter()
                .map(|(name, ty, is_primary_key)| {
                    SqlColumn::definition(ty, table.table_alias.clone(), name, is_primary_key)
                })
                .collect(),
        ))
    }

    fn resolve_join_info(
        &self,
        join: &UnresolvedJoinInfo,
        generator: &mut AliasGenerator,
    ) -> Result<ResolvedJoinInfo, MappingResolutionError> {
        let (origin_column, foreign_column, foreign_type) = Self::join_columns(&join.member)
            .ok_or_else(|| {
                MappingResolutionError::unmapped_member(&join.member.declaring_type, &join.member.name)
            })?;
        let foreign_table = self.resolve_table_info(&foreign_type, generator)?;
        let origin = join
            .origin
            .get_column(DataType::Int32, origin_column, origin_column == "ID");
        let foreign = SqlColumn::definition(
            DataType::Int32,
            foreign_table.table_alias.clone(),
            foreign_column,
            foreign_column == "ID",
        );
        let join_condition = match join.cardinality {
            Cardinality::One => SqlExpr::equal(SqlExpr::Column(origin), SqlExpr::Column(foreign)),
            Cardinality::Many => SqlExpr::equal(SqlExpr::Column(foreign), SqlExpr::Column(origin)),
        };
        Ok(ResolvedJoinInfo {
            foreign_table,
            join_condition,
        })
    }

    fn resolve_member_expression(
        &self,
        entity: &SqlEntity,
        member: &MemberInfo,
    ) -> Result<SqlExpr, MappingResolutionError> {
        let type_name = entity
            .ty
            .entity_type()
            .map(|entity_type| entity_type.name.clone())
            .unwrap_or_default();
        columns_of(&type_name)
            .and_then(|columns| {
                columns
                    .into_iter()
                    .find(|(column, _, _)| *column == member.name)
            })
            .map(|(name, ty, is_primary_key)| {
                SqlExpr::Column(entity.get_column(ty, name, is_primary_key))
            })
            .ok_or_else(|| MappingResolutionError::unmapped_member(&member.declaring_type, &member.name))
    }

    fn resolve_constant_expression(
        &self,
        constant: &ConstantRef,
    ) -> Result<SqlExpr, MappingResolutionError> {
        match constant.value() {
            Value::Entity { type_name, .. } => {
                let ty = type_by_name(type_name)
                    .ok_or_else(|| MappingResolutionError::unmapped_type(type_name))?;
                let id = constant.value().field("ID").cloned().unwrap_or(Value::Null);
                Ok(SqlExpr::EntityConstant(SqlEntityConstant {
                    ty,
                    value: constant.value().clone(),
                    identity: Box::new(SqlExpr::constant(id)),
                }))
            }
            _ => Ok(SqlExpr::Constant(constant.clone())),
        }
    }

    fn resolve_type_check(
        &self,
        expression: &SqlExpr,
        desired_type: &DataType,
    ) -> Result<SqlExpr, MappingResolutionError> {
        let is_chef = desired_type
            .entity_type()
            .is_some_and(|entity_type| entity_type.name == CHEF);
        match expression.unwrap_named() {
            SqlExpr::Entity(entity) if is_chef => Ok(SqlExpr::equal(
                SqlExpr::Column(entity.get_column(DataType::Boolean, "IsChef", false)),
                SqlExpr::int_literal(1),
            )),
            other => Err(MappingResolutionError::unsupported(
                other,
                format!("no type discriminator for '{}'", desired_type),
            )),
        }
    }

    fn try_resolve_optimized_identity(&self, entity_ref: &SqlEntityRefMember) -> Option<SqlExpr> {
        match (
            entity_ref.member.declaring_type.as_str(),
            entity_ref.member.name.as_str(),
        ) {
            (COOK | CHEF, "Kitchen") => Some(SqlExpr::Column(entity_ref.origin.get_column(
                DataType::nullable(DataType::Int32),
                "KitchenID",
                false,
            ))),
            _ => None,
        }
    }

    fn try_resolve_optimized_member(
        &self,
        entity_ref: &SqlEntityRefMember,
        member: &MemberInfo,
    ) -> Option<SqlExpr> {
        if member.name == "ID" {
            self.try_resolve_optimized_identity(entity_ref)
        } else {
            None
        }
    }
}
