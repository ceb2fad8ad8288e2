//! Output names of sub-statement projections and the expressions reading them back.

use crate::query_model::DataType;
use crate::sql_statement::{
    SqlColumn, SqlEntity, SqlExpr, SqlGroupingSelect, DEFAULT_VALUE_NAME,
};

use super::errors::MappingResolutionError;

pub(super) const GROUPING_KEY_NAME: &str = "key";
pub(super) const GROUPING_ELEMENT_NAME: &str = "element";

fn combine(outer: Option<&str>, inner: Option<&str>) -> Option<String> {
    match (outer, inner) {
        (Some(outer), Some(inner)) => Some(format!("{}_{}", outer, inner)),
        (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}

/// Gives every value a sub-statement selects a column name that is unique within the
/// select list. Nested names are joined with `_`; unnamed scalars become `value`.
pub(super) fn ensure_named(expression: SqlExpr, name: Option<&str>) -> SqlExpr {
    match expression {
        SqlExpr::Named {
            name: inner,
            expression,
        } => {
            let combined = combine(name, inner.as_deref());
            ensure_named(*expression, combined.as_deref())
        }
        SqlExpr::Entity(entity) => SqlExpr::Entity(entity.with_name(name.map(str::to_string))),
        SqlExpr::New {
            ty,
            members,
            arguments,
        } => {
            let arguments = arguments
                .into_iter()
                .zip(members.iter().map(Some).chain(std::iter::repeat(None)))
                .map(|(argument, member)| match argument {
                    named @ SqlExpr::Named { .. } => ensure_named(named, name),
                    other => {
                        let combined = combine(name, member.map(String::as_str));
                        ensure_named(other, combined.as_deref())
                    }
                })
                .collect();
            SqlExpr::New {
                ty,
                members,
                arguments,
            }
        }
        SqlExpr::GroupingSelect(grouping) => {
            let key_name = combine(name, Some(GROUPING_KEY_NAME));
            let element_name = combine(name, Some(GROUPING_ELEMENT_NAME));
            SqlExpr::GroupingSelect(SqlGroupingSelect {
                key: Box::new(ensure_named(*grouping.key, key_name.as_deref())),
                element: Box::new(ensure_named(*grouping.element, element_name.as_deref())),
                aggregations: grouping.aggregations,
            })
        }
        other => SqlExpr::named(name.unwrap_or(DEFAULT_VALUE_NAME), other),
    }
}

/// The expression reading a projection normalized by [`ensure_named`] from outside the
/// derived table `table_alias`.
pub(super) fn create_reference(
    table_alias: &str,
    projection: &SqlExpr,
) -> Result<SqlExpr, MappingResolutionError> {
    match projection {
        SqlExpr::Named {
            name: Some(name),
            expression,
        } => Ok(column_reference(table_alias, name, expression.data_type())),
        SqlExpr::Entity(entity) => Ok(SqlExpr::Entity(SqlEntity::reference(
            table_alias,
            None,
            entity,
        ))),
        SqlExpr::New {
            ty,
            members,
            arguments,
        } => Ok(SqlExpr::New {
            ty: ty.clone(),
            members: members.clone(),
            arguments: arguments
                .iter()
                .map(|argument| create_reference(table_alias, argument))
                .collect::<Result<_, _>>()?,
        }),
        SqlExpr::GroupingSelect(grouping) => Ok(SqlExpr::GroupingSelect(SqlGroupingSelect {
            key: Box::new(create_reference(table_alias, &grouping.key)?),
            element: Box::new(create_reference(table_alias, &grouping.element)?),
            aggregations: grouping
                .aggregations
                .iter()
                .map(|aggregation| create_reference(table_alias, aggregation))
                .collect::<Result<_, _>>()?,
        })),
        other => Err(MappingResolutionError::InvalidState(format!(
            "cannot reference unnamed projection '{}'",
            other
        ))),
    }
}

fn column_reference(table_alias: &str, name: &str, ty: DataType) -> SqlExpr {
    if ty.is_boolean() {
        // Booleans leave a sub-statement as 0/1 integers.
        let column = SqlColumn::reference(DataType::Int32, table_alias, name, false, None);
        return SqlExpr::ConvertedBoolean(Box::new(SqlExpr::Column(column)));
    }
    SqlExpr::Column(SqlColumn::reference(ty, table_alias, name, false, None))
}
