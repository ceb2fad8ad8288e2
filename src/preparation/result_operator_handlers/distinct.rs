use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::ResultOperator;
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{JoinSemantics, SqlStatementBuilder};

use super::{
    ensure_no_set_operations, ensure_no_top_expression, move_current_statement_to_sql_table,
    unexpected_operator,
};

#[derive(Debug, Default)]
pub struct DistinctResultOperatorHandler;

impl ResultOperatorHandler for DistinctResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        if !matches!(operator, ResultOperator::Distinct) {
            return Err(unexpected_operator("DistinctResultOperatorHandler", operator));
        }

        ensure_no_set_operations(builder, generator)?;
        // DISTINCT applies before TOP, so a limited statement must be wrapped first.
        ensure_no_top_expression(builder, generator)?;
        if builder.row_number_selector.is_some() {
            move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
        }
        builder.is_distinct = true;
        Ok(())
    }
}
