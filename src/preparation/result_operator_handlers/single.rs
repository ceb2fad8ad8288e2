use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::ResultOperator;
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlStatementBuilder};

use super::{ensure_no_set_operations, ensure_no_top_expression, unexpected_operator};

/// `First()` / `FirstOrDefault()`: `TOP (1)`.
#[derive(Debug, Default)]
pub struct FirstResultOperatorHandler;

impl ResultOperatorHandler for FirstResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        if !matches!(operator, ResultOperator::First { .. }) {
            return Err(unexpected_operator("FirstResultOperatorHandler", operator));
        }
        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;
        builder.top = Some(SqlExpr::int_literal(1));
        Ok(())
    }
}

/// `Single()` / `SingleOrDefault()`: fetches two rows so that a second match is detectable.
#[derive(Debug, Default)]
pub struct SingleResultOperatorHandler;

impl ResultOperatorHandler for SingleResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        if !matches!(operator, ResultOperator::Single { .. }) {
            return Err(unexpected_operator("SingleResultOperatorHandler", operator));
        }
        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;
        builder.top = Some(SqlExpr::constant(2));
        Ok(())
    }
}
