use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::ResultOperator;
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlStatementBuilder};

use super::unexpected_operator;

/// `Contains(item)`: the whole statement becomes the right side of `item IN (...)`.
#[derive(Debug, Default)]
pub struct ContainsResultOperatorHandler;

impl ResultOperatorHandler for ContainsResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::Contains(item) = operator else {
            return Err(unexpected_operator("ContainsResultOperatorHandler", operator));
        };
        let item = stage.prepare_expression(item, context, generator)?;

        let statement = builder.get_statement_and_reset_builder()?;
        builder.select_projection = Some(SqlExpr::In {
            left: Box::new(item),
            right: Box::new(SqlExpr::sub_statement(statement)),
        });
        Ok(())
    }
}
