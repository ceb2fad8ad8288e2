//! Classification of the expressions query sources draw their items from.

use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::query_model::{
    DataType, Expression, JoinClause, QuerySourceKind, ResultOperator,
};
use crate::sql_statement::{
    JoinSemantics, ResolvedSubStatementTableInfo, SqlExpr, SqlTable, TableInfo,
    UnresolvedCollectionJoinInfo,
};

use super::errors::PreparationError;
use super::SqlPreparationStage;

/// What a from expression contributes to the statement.
#[derive(Debug, Clone)]
pub struct FromExpressionInfo {
    /// New table, or `None` if the expression reuses a table the statement already has.
    pub table: Option<SqlTable>,
    /// Expression standing for the current item, registered for the query source.
    pub item_selector: SqlExpr,
    pub where_condition: Option<SqlExpr>,
}

impl FromExpressionInfo {
    fn new_table(table: SqlTable, where_condition: Option<SqlExpr>) -> Self {
        let item_selector = SqlExpr::table_reference(table.key, table.item_type());
        FromExpressionInfo {
            table: Some(table),
            item_selector,
            where_condition,
        }
    }
}

pub(super) fn prepare_from_expression(
    stage: &SqlPreparationStage<'_>,
    expression: &Expression,
    context: &SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<FromExpressionInfo, PreparationError> {
    match expression {
        Expression::Table(item_type) => {
            let table = SqlTable::new(
                generator.next_table_key(),
                TableInfo::Unresolved {
                    item_type: item_type.clone(),
                },
                JoinSemantics::Inner,
            );
            Ok(FromExpressionInfo::new_table(table, None))
        }
        Expression::QuerySourceReference(source) => match &source.kind {
            QuerySourceKind::GroupJoin(join) => {
                prepare_group_join(stage, join, context, generator)
            }
            _ => prepare_prepared_source(stage, expression, context, generator),
        },
        Expression::SubQuery(model) => {
            let mut model = (**model).clone();
            // `x.DefaultIfEmpty()` as a source means "left join x".
            let join_semantics = match model.result_operators.last() {
                Some(ResultOperator::DefaultIfEmpty) => {
                    model.result_operators.pop();
                    JoinSemantics::Left
                }
                _ => JoinSemantics::Inner,
            };
            let statement = stage.prepare_sql_statement(&model, Some(context), generator)?;
            let table = SqlTable::new(
                generator.next_table_key(),
                TableInfo::ResolvedSubStatement(ResolvedSubStatementTableInfo {
                    table_alias: generator.sub_statement_alias(),
                    statement: Box::new(statement),
                }),
                join_semantics,
            );
            Ok(FromExpressionInfo::new_table(table, None))
        }
        _ => prepare_prepared_source(stage, expression, context, generator),
    }
}

/// Enumerating a group join creates the inner table, correlated through the join keys.
fn prepare_group_join(
    stage: &SqlPreparationStage<'_>,
    join: &JoinClause,
    context: &SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<FromExpressionInfo, PreparationError> {
    let inner = prepare_from_expression(stage, &join.inner_sequence, context, generator)?;
    let outer_key = stage.prepare_expression(&join.outer_key, context, generator)?;
    let inner_key =
        stage.prepare_item_lambda(&join.inner_key, inner.item_selector.clone(), context, generator)?;
    let key_condition = SqlExpr::equal(outer_key, inner_key);

    Ok(FromExpressionInfo {
        where_condition: Some(match inner.where_condition {
            Some(condition) => SqlExpr::and_also(condition, key_condition),
            None => key_condition,
        }),
        ..inner
    })
}

fn prepare_prepared_source(
    stage: &SqlPreparationStage<'_>,
    expression: &Expression,
    context: &SqlPreparationContext<'_>,
    generator: &mut AliasGenerator,
) -> Result<FromExpressionInfo, PreparationError> {
    match stage.prepare_expression(expression, context, generator)? {
        SqlExpr::TableReference(reference) => match &reference.ty {
            DataType::Grouping { element, .. } => {
                let table = SqlTable::new(
                    generator.next_table_key(),
                    TableInfo::UnresolvedGroupReference {
                        referenced_table: reference.table,
                        item_type: (**element).clone(),
                    },
                    JoinSemantics::Inner,
                );
                Ok(FromExpressionInfo::new_table(table, None))
            }
            _ => Ok(FromExpressionInfo {
                table: None,
                item_selector: SqlExpr::TableReference(reference),
                where_condition: None,
            }),
        },
        SqlExpr::MemberAccess {
            expression: source,
            member,
        } if member.ty.is_sequence() => {
            let key = generator.next_table_key();
            let table = SqlTable::new(
                key,
                TableInfo::UnresolvedCollectionJoin(UnresolvedCollectionJoinInfo {
                    source,
                    member,
                }),
                JoinSemantics::Inner,
            );
            // The join condition is filled in once the collection join is resolved.
            Ok(FromExpressionInfo::new_table(
                table,
                Some(SqlExpr::JoinCondition(key)),
            ))
        }
        _ => Err(PreparationError::UnsupportedFromExpression(
            expression.to_string(),
        )),
    }
}
