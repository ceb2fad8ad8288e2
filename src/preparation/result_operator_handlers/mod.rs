//! Default result-operator handlers and the statement-wrapping helpers they share.
//!
//! Most operators can only be applied to a statement that does not yet use some
//! feature (a `TOP`, `DISTINCT`, `GROUP BY` or a set operation). The `ensure_*`
//! helpers move the statement built so far into a sub-statement table when it does,
//! and the handler continues on the fresh outer statement.

pub mod aggregation;
pub mod any_all;
pub mod cast;
pub mod contains;
pub mod default_if_empty;
pub mod distinct;
pub mod group_by;
pub mod set_operation;
pub mod single;
pub mod skip;
pub mod take;

use crate::alias_generator::AliasGenerator;
use crate::preparation::errors::PreparationError;
use crate::query_model::ResultOperator;
use crate::sql_statement::{
    JoinSemantics, ResolvedSubStatementTableInfo, SqlExpr, SqlStatementBuilder, SqlTable,
    TableInfo,
};

/// Freezes the statement built so far and makes it the only table of a new statement,
/// whose projection selects the sub-statement's items. The data info is kept.
pub fn move_current_statement_to_sql_table(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
    join_semantics: JoinSemantics,
) -> Result<(), PreparationError> {
    let data_info = builder.data_info.clone().ok_or_else(|| {
        PreparationError::InvalidState("cannot wrap a statement without data info".to_string())
    })?;
    let statement = builder.get_statement_and_reset_builder()?;
    let item_type = data_info.item_type().clone();

    let table = SqlTable::new(
        generator.next_table_key(),
        TableInfo::ResolvedSubStatement(ResolvedSubStatementTableInfo {
            table_alias: generator.sub_statement_alias(),
            statement: Box::new(statement),
        }),
        join_semantics,
    );
    log::trace!("Moved current statement into sub-statement table {}", table.key);

    builder.select_projection = Some(SqlExpr::table_reference(table.key, item_type));
    builder.tables.push(table);
    builder.data_info = Some(data_info);
    Ok(())
}

pub fn ensure_no_top_expression(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    if builder.top.is_some() {
        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
    }
    Ok(())
}

pub fn ensure_no_distinct_query(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    if builder.is_distinct {
        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
    }
    Ok(())
}

pub fn ensure_no_group_expression(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    if builder.group_by.is_some() {
        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
    }
    Ok(())
}

pub fn ensure_no_set_operations(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    if builder.has_set_operations() {
        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
    }
    Ok(())
}

/// Wraps unless the statement is a plain select an aggregate can be applied to directly.
pub(crate) fn ensure_aggregatable(
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
) -> Result<(), PreparationError> {
    ensure_no_top_expression(builder, generator)?;
    ensure_no_distinct_query(builder, generator)?;
    ensure_no_group_expression(builder, generator)?;
    ensure_no_set_operations(builder, generator)
}

pub(crate) fn current_projection(
    builder: &SqlStatementBuilder,
) -> Result<SqlExpr, PreparationError> {
    builder.select_projection.clone().ok_or_else(|| {
        PreparationError::InvalidState("result operator applied before the select clause".to_string())
    })
}

/// A copy of `expression` that does not share its constants with the original, so the
/// generator emits separate parameters for both.
pub(crate) fn fresh_copy(expression: &SqlExpr) -> SqlExpr {
    match expression {
        SqlExpr::Constant(constant) => SqlExpr::Constant(constant.fresh_copy()),
        other => other.clone(),
    }
}

pub(crate) fn unexpected_operator(handler: &str, operator: &ResultOperator) -> PreparationError {
    PreparationError::InvalidState(format!("{} cannot handle '{}'", handler, operator))
}
