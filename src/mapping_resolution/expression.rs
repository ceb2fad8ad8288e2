use crate::alias_generator::AliasGenerator;
use crate::query_model::{BinaryOperator, ConstantRef, DataType, MemberInfo, StreamedDataInfo, UnaryOperator};
use crate::sql_statement::{
    Cardinality, JoinInfo, JoinSemantics, ResolvedSubStatementTableInfo, SqlColumn, SqlEntity,
    SqlEntityRefMember, SqlExpr, SqlGroupingSelect, SqlJoinedTable, SqlStatement,
    SqlStatementBuilder, SqlTable, TableInfo, TableKey, UnresolvedJoinInfo,
};

use super::context::MappingResolutionContext;
use super::errors::MappingResolutionError;
use super::naming::{create_reference, ensure_named};
use super::statement::{resolve_statement, without_unlimited_orderings};
use super::MappingResolutionStage;

/// Resolves `expression` and turns navigations nobody consumed into joined entities.
pub(super) fn resolve_top_level_expression(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    let resolved = resolve_expression(stage, expression, context, generator)?;
    materialize_remaining(stage, resolved, context, generator)
}

fn materialize_remaining(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    match expression {
        SqlExpr::EntityRefMember(reference) => Ok(SqlExpr::Entity(materialize_entity_ref(
            stage, &reference, context, generator,
        )?)),
        SqlExpr::SubStatement(_) => Ok(expression),
        other => other
            .try_map_children(&mut |child| materialize_remaining(stage, child, context, generator)),
    }
}

pub(super) fn resolve_expression(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    match expression {
        SqlExpr::SubStatement(statement) => {
            resolve_sub_statement_expression(stage, *statement, context, generator)
        }
        SqlExpr::Constant(constant) => stage.resolver().resolve_constant_expression(&constant),
        SqlExpr::TableReference(reference) => context
            .get_table_expression(reference.table)
            .cloned()
            .ok_or_else(|| {
                MappingResolutionError::InvalidState(format!(
                    "no table {} in scope",
                    reference.table
                ))
            }),
        SqlExpr::JoinCondition(table) => {
            context.get_join_condition(table).cloned().ok_or_else(|| {
                MappingResolutionError::InvalidState(format!(
                    "no join condition for table {}",
                    table
                ))
            })
        }
        other => {
            let resolved = other
                .try_map_children(&mut |child| resolve_expression(stage, child, context, generator))?;
            resolve_node(stage, resolved, context, generator)
        }
    }
}

/// Resolves one node whose children are already resolved.
fn resolve_node(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    match expression {
        SqlExpr::MemberAccess { expression, member } => {
            resolve_member_access(stage, *expression, member, context, generator)
        }
        SqlExpr::TypeIs { expression, ty } => {
            resolve_type_check(stage, *expression, &ty, context, generator)
        }
        SqlExpr::Binary {
            operator: operator @ (BinaryOperator::Equal | BinaryOperator::NotEqual),
            left,
            right,
            ty,
        } => {
            if is_entity_like(&left) || is_entity_like(&right) {
                resolve_identity_comparison(stage, operator, *left, *right, context, generator)
            } else {
                Ok(SqlExpr::Binary {
                    operator,
                    left,
                    right,
                    ty,
                })
            }
        }
        SqlExpr::IsNull(operand) if is_entity_like(&operand) => {
            let identity = identity_of(stage, *operand, context, generator)?;
            Ok(null_test(BinaryOperator::Equal, identity))
        }
        SqlExpr::IsNotNull(operand) if is_entity_like(&operand) => {
            let identity = identity_of(stage, *operand, context, generator)?;
            Ok(null_test(BinaryOperator::NotEqual, identity))
        }
        SqlExpr::Unary {
            operator: UnaryOperator::Convert(ty),
            operand,
            ty: result_type,
        } => match operand.into_unnamed() {
            SqlExpr::Entity(entity) if ty.is_entity() => Ok(SqlExpr::Entity(entity.with_type(ty))),
            operand => Ok(SqlExpr::Unary {
                operator: UnaryOperator::Convert(ty),
                operand: Box::new(operand),
                ty: result_type,
            }),
        },
        SqlExpr::In { left, right } if is_entity_like(&left) => {
            let left = identity_of(stage, *left, context, generator)?;
            let right = match right.into_unnamed() {
                SqlExpr::SubStatement(statement) => {
                    let mut builder = SqlStatementBuilder::from_statement(*statement);
                    let projection = builder.select_projection.take().ok_or_else(|| {
                        MappingResolutionError::InvalidState(
                            "statement without select projection".to_string(),
                        )
                    })?;
                    let identity = identity_of(stage, projection, context, generator)?;
                    builder.data_info = Some(StreamedDataInfo::sequence(identity.data_type()));
                    builder.select_projection = Some(identity);
                    SqlExpr::sub_statement(builder.build()?)
                }
                other => other,
            };
            Ok(SqlExpr::In {
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        other => Ok(other),
    }
}

fn is_entity_like(expression: &SqlExpr) -> bool {
    matches!(
        expression.unwrap_named(),
        SqlExpr::Entity(_) | SqlExpr::EntityRefMember(_) | SqlExpr::EntityConstant(_)
    )
}

fn is_null_value(expression: &SqlExpr) -> bool {
    match expression.unwrap_named() {
        SqlExpr::Constant(constant) => constant.value().is_null(),
        SqlExpr::Literal(literal) => literal.value.is_null(),
        _ => false,
    }
}

fn resolve_member_access(
    stage: &MappingResolutionStage<'_>,
    source: SqlExpr,
    member: MemberInfo,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    match source {
        SqlExpr::Named { expression, .. } => {
            resolve_member_access(stage, *expression, member, context, generator)
        }
        SqlExpr::Entity(entity) => {
            if member.ty.is_entity() {
                Ok(SqlExpr::EntityRefMember(SqlEntityRefMember {
                    origin: entity,
                    member,
                }))
            } else if member.ty.is_sequence() {
                // Collections stay member accesses; only a from clause can enumerate them.
                Ok(SqlExpr::member_access(SqlExpr::Entity(entity), member))
            } else {
                stage.resolver().resolve_member_expression(&entity, &member)
            }
        }
        SqlExpr::EntityRefMember(reference) => {
            if stage.optimize_member_access() && member.ty.is_scalar() {
                if let Some(optimized) = stage
                    .resolver()
                    .try_resolve_optimized_member(&reference, &member)
                {
                    log::trace!("Answered {} from {} without a join", member, reference.member);
                    return Ok(optimized);
                }
            }
            let entity = materialize_entity_ref(stage, &reference, context, generator)?;
            resolve_member_access(stage, SqlExpr::Entity(entity), member, context, generator)
        }
        SqlExpr::EntityConstant(constant) => {
            let value = constant.value.field(&member.name).cloned().ok_or_else(|| {
                MappingResolutionError::unmapped_member(&constant.ty, &member.name)
            })?;
            stage
                .resolver()
                .resolve_constant_expression(&ConstantRef::new(value, member.ty.clone()))
        }
        SqlExpr::New {
            ty,
            members,
            arguments,
        } => match members.iter().position(|name| *name == member.name) {
            Some(position) => arguments
                .into_iter()
                .nth(position)
                .map(SqlExpr::into_unnamed)
                .ok_or_else(|| {
                    MappingResolutionError::InvalidState(format!(
                        "'{}' has no argument for member '{}'",
                        ty, member.name
                    ))
                }),
            None => Err(MappingResolutionError::unmapped_member(ty, &member.name)),
        },
        SqlExpr::GroupingSelect(grouping) if member.name == "Key" => {
            Ok(grouping.key.into_unnamed())
        }
        SqlExpr::Unary {
            operator: UnaryOperator::Convert(_),
            operand,
            ..
        } => resolve_member_access(stage, *operand, member, context, generator),
        other => Err(MappingResolutionError::unsupported(
            format!("{}.{}", other, member.name),
            "members can only be read from entities, records and group keys",
        )),
    }
}

fn resolve_type_check(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    desired_type: &DataType,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    let actual_type = expression.data_type();
    match (actual_type.entity_type(), desired_type.entity_type()) {
        (Some(actual), Some(desired)) => {
            if actual.is_subtype_of(desired) {
                Ok(SqlExpr::literal(true))
            } else if desired.is_subtype_of(actual) {
                let expression = match expression.into_unnamed() {
                    SqlExpr::EntityRefMember(reference) => SqlExpr::Entity(
                        materialize_entity_ref(stage, &reference, context, generator)?,
                    ),
                    other => other,
                };
                stage.resolver().resolve_type_check(&expression, desired_type)
            } else {
                Ok(SqlExpr::literal(false))
            }
        }
        _ => Ok(SqlExpr::literal(
            desired_type.is_assignable_from(&actual_type),
        )),
    }
}

/// The value standing for an entity in comparisons: its identity, or the expression
/// itself when it is not an entity.
fn identity_of(
    stage: &MappingResolutionStage<'_>,
    expression: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    match expression.into_unnamed() {
        SqlExpr::Entity(entity) => Ok(entity.identity_expression()),
        SqlExpr::EntityConstant(constant) => Ok(*constant.identity),
        SqlExpr::EntityRefMember(reference) => {
            if stage.optimize_member_access() {
                if let Some(identity) = stage.resolver().try_resolve_optimized_identity(&reference)
                {
                    return Ok(identity);
                }
            }
            let entity = materialize_entity_ref(stage, &reference, context, generator)?;
            Ok(entity.identity_expression())
        }
        other => Ok(other),
    }
}

fn resolve_identity_comparison(
    stage: &MappingResolutionStage<'_>,
    operator: BinaryOperator,
    left: SqlExpr,
    right: SqlExpr,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    if is_null_value(&right) {
        return Ok(null_test(operator, identity_of(stage, left, context, generator)?));
    }
    if is_null_value(&left) {
        return Ok(null_test(operator, identity_of(stage, right, context, generator)?));
    }
    let left = identity_of(stage, left, context, generator)?;
    let right = identity_of(stage, right, context, generator)?;
    match (left, right) {
        (
            SqlExpr::New {
                arguments: left_parts,
                ..
            },
            SqlExpr::New {
                arguments: right_parts,
                ..
            },
        ) if left_parts.len() == right_parts.len() => {
            let comparisons = left_parts
                .into_iter()
                .zip(right_parts)
                .map(|(l, r)| SqlExpr::binary(operator, l.into_unnamed(), r.into_unnamed()));
            combine_parts(operator, comparisons).ok_or_else(|| {
                MappingResolutionError::InvalidState("empty composite identity".to_string())
            })
        }
        (left, right) => Ok(SqlExpr::binary(operator, left, right)),
    }
}

/// Composite keys match when all parts match and differ when any part differs.
fn combine_parts(
    operator: BinaryOperator,
    parts: impl Iterator<Item = SqlExpr>,
) -> Option<SqlExpr> {
    parts.reduce(|combined, part| match operator {
        BinaryOperator::NotEqual => SqlExpr::or_else(combined, part),
        _ => SqlExpr::and_also(combined, part),
    })
}

fn null_test(operator: BinaryOperator, identity: SqlExpr) -> SqlExpr {
    let test = |part: SqlExpr| match operator {
        BinaryOperator::NotEqual => SqlExpr::is_not_null(part),
        _ => SqlExpr::is_null(part),
    };
    match identity {
        SqlExpr::New { arguments, .. } if !arguments.is_empty() => {
            combine_parts(operator, arguments.into_iter().map(|part| test(part.into_unnamed())))
                .unwrap_or_else(|| SqlExpr::literal(false))
        }
        other => test(other),
    }
}

/// Turns a navigation into a left join on the table the navigation starts from and
/// returns the joined entity. Each member is joined at most once per origin table.
pub(super) fn materialize_entity_ref(
    stage: &MappingResolutionStage<'_>,
    reference: &SqlEntityRefMember,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlEntity, MappingResolutionError> {
    let join_key = reference.member.to_string();
    let origin_alias = reference.origin.table_alias.clone();
    let missing_origin = || {
        MappingResolutionError::InvalidState(format!(
            "navigation '{}' starts from unknown table '{}'",
            join_key, origin_alias
        ))
    };

    let existing = context
        .find_join_container(&origin_alias)
        .ok_or_else(missing_origin)?
        .get(&join_key)
        .map(|joined| joined.key);
    if let Some(key) = existing {
        return context.get_join_entity(key).cloned().ok_or_else(|| {
            MappingResolutionError::InvalidState(format!("no entity for joined table {}", key))
        });
    }

    let resolver = stage.resolver();
    let join = resolver.resolve_join_info(
        &UnresolvedJoinInfo {
            origin: reference.origin.clone(),
            member: reference.member.clone(),
            cardinality: Cardinality::One,
        },
        generator,
    )?;
    let entity = resolver.resolve_simple_table_info(&join.foreign_table, generator)?;
    let key = generator.next_table_key();
    log::trace!(
        "Joining {} as [{}] for {}",
        join.foreign_table.table_name,
        join.foreign_table.table_alias,
        join_key
    );

    context
        .find_join_container(&origin_alias)
        .ok_or_else(missing_origin)?
        .insert(
            join_key.clone(),
            SqlJoinedTable::new(key, JoinSemantics::Left, JoinInfo::Resolved(join)),
        );
    context.add_join_entity(key, entity.clone());
    Ok(entity)
}

fn resolve_sub_statement_expression(
    stage: &MappingResolutionStage<'_>,
    statement: SqlStatement,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    if let [table] = statement.tables() {
        if let TableInfo::UnresolvedGroupReference {
            referenced_table, ..
        } = table.table_info
        {
            let group_table = table.key;
            return fold_group_aggregate(
                stage,
                statement,
                group_table,
                referenced_table,
                context,
                generator,
            );
        }
    }

    let resolved = without_unlimited_orderings(resolve_statement(
        stage, statement, context, generator,
    )?)?;

    // A table-less statement such as `SELECT EXISTS(...)` contributes only its projection.
    if resolved.tables().is_empty()
        && resolved.where_condition().is_none()
        && resolved.group_by().is_none()
        && resolved.top().is_none()
        && !resolved.is_distinct()
        && resolved.set_operation_combined().is_empty()
    {
        return Ok(resolved.select_projection().clone().into_unnamed());
    }

    let selects_single_entity = matches!(
        resolved.data_info(),
        StreamedDataInfo::SingleValue { ty, .. } if ty.is_entity()
    );
    if !selects_single_entity {
        return Ok(SqlExpr::sub_statement(resolved));
    }

    // A single entity cannot be selected as a scalar sub-query; it becomes a derived
    // table applied to the enclosing statement instead.
    let table_alias = generator.sub_statement_alias();
    let mut builder = SqlStatementBuilder::from_statement(resolved);
    let projection = builder.select_projection.take().ok_or_else(|| {
        MappingResolutionError::InvalidState("statement without select projection".to_string())
    })?;
    let projection = ensure_named(projection, None);
    let reference = create_reference(&table_alias, &projection)?;
    builder.select_projection = Some(projection);

    let key = generator.next_table_key();
    context.add_table(SqlTable::new(
        key,
        TableInfo::ResolvedSubStatement(ResolvedSubStatementTableInfo {
            table_alias,
            statement: Box::new(builder.build()?),
        }),
        JoinSemantics::Left,
    ));
    context.add_table_expression(key, reference.clone());
    Ok(reference)
}

fn is_foldable_aggregate(statement: &SqlStatement) -> bool {
    matches!(
        statement.select_projection().unwrap_named(),
        SqlExpr::Aggregation { .. }
    ) && statement.where_condition().is_none()
        && statement.group_by().is_none()
        && statement.top().is_none()
        && !statement.is_distinct()
        && statement.set_operation_combined().is_empty()
}

/// Computes an aggregate over a group inside the grouped statement itself and returns
/// the column reading it back. `group_table` is the table enumerating the group's items;
/// `grouped_table` is the derived table producing the groups.
fn fold_group_aggregate(
    stage: &MappingResolutionStage<'_>,
    statement: SqlStatement,
    group_table: TableKey,
    grouped_table: TableKey,
    context: &mut MappingResolutionContext,
    generator: &mut AliasGenerator,
) -> Result<SqlExpr, MappingResolutionError> {
    if !is_foldable_aggregate(&statement) {
        return Err(MappingResolutionError::unsupported(
            &statement,
            "the items of a group can only be aggregated without further clauses",
        ));
    }

    let (table_alias, grouping) = {
        let table = context.find_table_mut(grouped_table).ok_or_else(|| {
            MappingResolutionError::InvalidState(format!("no grouped table {}", grouped_table))
        })?;
        match &table.table_info {
            TableInfo::ResolvedSubStatement(info) => {
                match info.statement.select_projection().unwrap_named() {
                    SqlExpr::GroupingSelect(grouping) => {
                        (info.table_alias.clone(), grouping.clone())
                    }
                    other => {
                        return Err(MappingResolutionError::InvalidState(format!(
                            "table {} does not produce groups: {}",
                            grouped_table, other
                        )))
                    }
                }
            }
            _ => {
                return Err(MappingResolutionError::InvalidState(format!(
                    "table {} does not produce groups",
                    grouped_table
                )))
            }
        }
    };

    let element = match grouping.element.as_ref().unwrap_named() {
        SqlExpr::Entity(entity) => SqlExpr::Entity(entity.with_name(None)),
        other => other.clone(),
    };
    context.add_table_expression(group_table, element);
    let aggregation = resolve_expression(
        stage,
        statement.select_projection().clone().into_unnamed(),
        context,
        generator,
    )?;

    let name = format!("a{}", grouping.aggregations.len());
    let ty = aggregation.data_type();
    let mut aggregations = grouping.aggregations;
    aggregations.push(SqlExpr::named(name.clone(), aggregation));
    let projection = SqlExpr::GroupingSelect(SqlGroupingSelect {
        key: grouping.key,
        element: grouping.element,
        aggregations,
    });

    let table = context.find_table_mut(grouped_table).ok_or_else(|| {
        MappingResolutionError::InvalidState(format!("no grouped table {}", grouped_table))
    })?;
    if let TableInfo::ResolvedSubStatement(info) = &mut table.table_info {
        let mut builder = SqlStatementBuilder::from_statement((*info.statement).clone());
        builder.select_projection = Some(projection);
        info.statement = Box::new(builder.build()?);
    }
    log::trace!("Folded group aggregate {} into [{}]", name, table_alias);

    Ok(SqlExpr::Column(SqlColumn::reference(
        ty,
        table_alias,
        name,
        false,
        None,
    )))
}
