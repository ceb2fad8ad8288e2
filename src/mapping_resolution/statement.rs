use crate::alias_generator::AliasGenerator;
use crate::query_model::{DataType, OrderingDirection, StreamedDataInfo};
use crate::sql_statement::{
    Cardinality, ResolvedSubStatementTableInfo, SetOperationCombinedStatement, SqlExpr, SqlOrdering, SqlStatement,
    SqlStatementBuilder, SqlTable, TableInfo, UnresolvedJoinInfo,
};

use super::context::MappingResolutionContext;
use super::errors::MappingResolutionError;
use super::expression::{materialize_entity_ref, resolve_top_level_expression};
use super::naming::{create_reference, ensure_named};
use super::MappingResolutionStage;

const KEY: &str = "Key";
const VALUE: &str = "Value";

pub(super) fn resolve_statement(
    stage: &MappingResolutionStage<'_>,
    statement: SqlStatement,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlStatement, MappingResolutionError> {
    let mut builder = SqlStatementBuilder::from_statement(statement);
    // A set operation discards the orderings of its operands.
    let keeps_inner_orderings = builder.group_by.is_none()
        && !builder.has_set_operations()
        && !matches!(
            builder.select_projection.as_ref().map(SqlExpr::unwrap_named),
            Some(SqlExpr::Aggregation { .. })
        );

    context.push_scope();
    let mut extracted_orderings = Vec::new();
    for table in std::mem::take(&mut builder.tables) {
        let (table, orderings) =
            resolve_table(stage, table, keeps_inner_orderings, context, generator)?;
        extracted_orderings.extend(orderings);
        context.add_table(table);
    }

    let projection = builder.select_projection.take().ok_or_else(|| {
        MappingResolutionError::InvalidState("statement without select projection".to_string())
    })?;
    let before = projection.data_type();
    let projection = resolve_top_level_expression(stage, projection, context, generator)?;
    let after = projection.data_type();
    if !before.is_assignable_from(&after) {
        return Err(MappingResolutionError::ProjectionTypeChanged {
            before: before.to_string(),
            after: after.to_string(),
        });
    }
    builder.select_projection = Some(projection);

    builder.where_condition = builder
        .where_condition
        .take()
        .map(|condition| resolve_top_level_expression(stage, condition, context, generator))
        .transpose()?;
    builder.group_by = builder
        .group_by
        .take()
        .map(|key| resolve_top_level_expression(stage, key, context, generator))
        .transpose()?;
    let mut orderings = std::mem::take(&mut builder.orderings)
        .into_iter()
        .map(|ordering| {
            Ok(SqlOrdering::new(
                resolve_top_level_expression(stage, ordering.expression, context, generator)?,
                ordering.direction,
            ))
        })
        .collect::<Result<Vec<_>, MappingResolutionError>>()?;
    orderings.extend(extracted_orderings);
    builder.orderings = orderings;
    builder.top = builder
        .top
        .take()
        .map(|top| resolve_top_level_expression(stage, top, context, generator))
        .transpose()?;

    builder.set_operation_combined = std::mem::take(&mut builder.set_operation_combined)
        .into_iter()
        .map(|combined| {
            let resolved = resolve_statement(stage, combined.statement, context, generator)?;
            Ok(SetOperationCombinedStatement {
                statement: without_unlimited_orderings(resolved)?,
                operation: combined.operation,
            })
        })
        .collect::<Result<Vec<_>, MappingResolutionError>>()?;

    builder.tables = context.pop_scope();
    Ok(builder.build()?)
}

/// Orderings of a nested statement only matter when a `TOP` consumes them.
pub(super) fn without_unlimited_orderings(
    statement: SqlStatement,
) -> Result<SqlStatement, MappingResolutionError> {
    if statement.top().is_some() || statement.orderings().is_empty() {
        return Ok(statement);
    }
    let mut builder = SqlStatementBuilder::from_statement(statement);
    builder.orderings.clear();
    Ok(builder.build()?)
}

fn resolve_table(
    stage: &MappingResolutionStage<'_>,
    table: SqlTable,
    keeps_inner_orderings: bool,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<(SqlTable, Vec<SqlOrdering>), MappingResolutionError> {
    let SqlTable {
        key,
        join_semantics,
        table_info,
        joined_tables,
    } = table;
    let resolver = stage.resolver();
    let mut extracted_orderings = Vec::new();

    let table_info = match table_info {
        TableInfo::Unresolved { item_type } => {
            let info = resolver.resolve_table_info(&item_type, generator)?;
            let entity = resolver.resolve_simple_table_info(&info, generator)?;
            context.add_table_expression(key, SqlExpr::Entity(entity));
            TableInfo::ResolvedSimple(info)
        }
        TableInfo::ResolvedSimple(info) => {
            let entity = resolver.resolve_simple_table_info(&info, generator)?;
            context.add_table_expression(key, SqlExpr::Entity(entity));
            TableInfo::ResolvedSimple(info)
        }
        TableInfo::UnresolvedCollectionJoin(info) => {
            let source = resolve_top_level_expression(stage, *info.source, context, generator)?;
            let origin = match source.into_unnamed() {
                SqlExpr::Entity(entity) => entity,
                SqlExpr::EntityRefMember(reference) => {
                    materialize_entity_ref(stage, &reference, context, generator)?
                }
                other => {
                    return Err(MappingResolutionError::unsupported(
                        other,
                        "collection members can only be enumerated on entities",
                    ))
                }
            };
            let join = resolver.resolve_join_info(
                &UnresolvedJoinInfo {
                    origin,
                    member: info.member,
                    cardinality: Cardinality::Many,
                },
                generator,
            )?;
            let entity = resolver.resolve_simple_table_info(&join.foreign_table, generator)?;
            context.add_table_expression(key, SqlExpr::Entity(entity));
            context.add_join_condition(key, join.join_condition);
            TableInfo::ResolvedSimple(join.foreign_table)
        }
        TableInfo::UnresolvedGroupReference { item_type, .. } => {
            return Err(MappingResolutionError::unsupported(
                format!("group of {}", item_type),
                "the items of a group can only be used through an aggregate",
            ))
        }
        TableInfo::ResolvedSubStatement(info) => {
            let (statement, reference, orderings) = resolve_derived_table(
                stage,
                *info.statement,
                &info.table_alias,
                keeps_inner_orderings,
                context,
                generator,
            )?;
            context.add_table_expression(key, reference);
            extracted_orderings = orderings;
            TableInfo::ResolvedSubStatement(ResolvedSubStatementTableInfo {
                table_alias: info.table_alias,
                statement: Box::new(statement),
            })
        }
    };

    log::trace!("Resolved table {} as {:?}", key, table_info.table_alias());
    Ok((
        SqlTable {
            key,
            join_semantics,
            table_info,
            joined_tables,
        },
        extracted_orderings,
    ))
}

/// Resolves the statement of a derived table and names its select list.
///
/// Returns the statement, the expression standing for one of its items outside of it,
/// and the orderings the enclosing statement inherits.
fn resolve_derived_table(
    stage: &MappingResolutionStage<'_>,
    statement: SqlStatement,
    table_alias: &str,
    keeps_inner_orderings: bool,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<(SqlStatement, SqlExpr, Vec<SqlOrdering>), MappingResolutionError> {
    let resolved = resolve_statement(stage, statement, context, generator)?;
    let mut builder = SqlStatementBuilder::from_statement(resolved);
    let projection = builder.select_projection.take().ok_or_else(|| {
        MappingResolutionError::InvalidState("statement without select projection".to_string())
    })?;

    let inner_orderings = if builder.top.is_none() {
        std::mem::take(&mut builder.orderings)
    } else {
        Vec::new()
    };

    if inner_orderings.is_empty() || !keeps_inner_orderings {
        let projection = ensure_named(projection, None);
        let reference = create_reference(table_alias, &projection)?;
        builder.select_projection = Some(projection);
        return Ok((builder.build()?, reference, Vec::new()));
    }

    // The orderings travel out of the derived table as extra columns of the select
    // list: the item becomes the key of a key/value pair whose value holds the
    // ordering keys, nested pair by pair.
    let directions: Vec<OrderingDirection> =
        inner_orderings.iter().map(|ordering| ordering.direction).collect();
    let mut ordering_keys = inner_orderings.into_iter().map(|ordering| ordering.expression).rev();
    let last = ordering_keys.next().ok_or_else(|| {
        MappingResolutionError::InvalidState("ordering extraction without orderings".to_string())
    })?;
    let value = ordering_keys.fold(last, |value, key| key_value_pair(key, value));
    let projection = ensure_named(key_value_pair(projection, value), None);
    let pair_type = projection.data_type();

    let reference = create_reference(table_alias, &projection)?;
    let (item, mut value) = split_key_value_pair(reference)?;
    let mut outer_orderings = Vec::with_capacity(directions.len());
    for (i, direction) in directions.iter().enumerate() {
        if i + 1 == directions.len() {
            outer_orderings.push(SqlOrdering::new(value.clone(), *direction));
        } else {
            let (key, rest) = split_key_value_pair(value)?;
            outer_orderings.push(SqlOrdering::new(key, *direction));
            value = rest;
        }
    }

    builder.select_projection = Some(projection);
    builder.data_info = Some(StreamedDataInfo::sequence(pair_type));
    Ok((builder.build()?, item, outer_orderings))
}

fn key_value_pair(key: SqlExpr, value: SqlExpr) -> SqlExpr {
    SqlExpr::New {
        ty: DataType::key_value_pair(key.data_type(), value.data_type()),
        members: vec![KEY.to_string(), VALUE.to_string()],
        arguments: vec![SqlExpr::named(KEY, key), SqlExpr::named(VALUE, value)],
    }
}

fn split_key_value_pair(pair: SqlExpr) -> Result<(SqlExpr, SqlExpr), MappingResolutionError> {
    match pair {
        SqlExpr::New { arguments, .. } if arguments.len() == 2 => {
            let mut arguments = arguments.into_iter();
            match (arguments.next(), arguments.next()) {
                (Some(key), Some(value)) => Ok((key.into_unnamed(), value.into_unnamed())),
                _ => unreachable_pair(),
            }
        }
        other => Err(MappingResolutionError::InvalidState(format!(
            "expected a key/value pair, got '{}'",
            other
        ))),
    }
}

fn unreachable_pair<T>() -> Result<T, MappingResolutionError> {
    Err(MappingResolutionError::InvalidState(
        "key/value pair without two arguments".to_string(),
    ))
}

