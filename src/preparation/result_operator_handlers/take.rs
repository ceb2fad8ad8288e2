use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{BinaryOperator, ResultOperator};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlStatementBuilder};

use super::{ensure_no_set_operations, ensure_no_top_expression, fresh_copy, unexpected_operator};

/// `Take(n)`: a `TOP (n)`, or an upper row-number bound directly after a `Skip`.
#[derive(Debug, Default)]
pub struct TakeResultOperatorHandler;

impl ResultOperatorHandler for TakeResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::Take(count) = operator else {
            return Err(unexpected_operator("TakeResultOperatorHandler", operator));
        };
        let count = stage.prepare_expression(count, context, generator)?;

        if let (Some(row_number), Some(offset)) = (
            builder.row_number_selector.clone(),
            builder.current_row_number_offset.clone(),
        ) {
            let upper_bound = SqlExpr::add(fresh_copy(&offset), count);
            builder.add_where_condition(SqlExpr::binary(
                BinaryOperator::LessThanOrEqual,
                row_number,
                upper_bound,
            ));
            return Ok(());
        }

        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;
        builder.top = Some(count);
        Ok(())
    }
}
