use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{ItemLambda, ResultOperator};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlStatementBuilder};

use super::{
    current_projection, ensure_no_set_operations, ensure_no_top_expression, unexpected_operator,
};

/// Adds `predicate` over the current items as a where condition and returns
/// `EXISTS (statement)`, leaving the builder empty.
fn exists_with_predicate(
    predicate: Option<&ItemLambda>,
    negate_predicate: bool,
    builder: &mut SqlStatementBuilder,
    generator: &mut AliasGenerator,
    stage: &SqlPreparationStage<'_>,
    context: &SqlPreparationContext<'_>,
) -> Result<SqlExpr, PreparationError> {
    if let Some(predicate) = predicate {
        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;
        let item = current_projection(builder)?;
        let condition = stage.prepare_item_lambda(predicate, item, context, generator)?;
        builder.add_where_condition(if negate_predicate {
            SqlExpr::not(condition)
        } else {
            condition
        });
    }
    builder.orderings.clear();

    let statement = builder.get_statement_and_reset_builder()?;
    Ok(SqlExpr::Exists(Box::new(SqlExpr::sub_statement(statement))))
}

/// `Any()` / `Any(predicate)`: `EXISTS (SELECT ... WHERE predicate)`.
#[derive(Debug, Default)]
pub struct AnyResultOperatorHandler;

impl ResultOperatorHandler for AnyResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::Any(predicate) = operator else {
            return Err(unexpected_operator("AnyResultOperatorHandler", operator));
        };
        let exists = exists_with_predicate(
            predicate.as_ref(),
            false,
            builder,
            generator,
            stage,
            context,
        )?;
        builder.select_projection = Some(exists);
        Ok(())
    }
}

/// `All(predicate)`: `NOT EXISTS (SELECT ... WHERE NOT predicate)`.
#[derive(Debug, Default)]
pub struct AllResultOperatorHandler;

impl ResultOperatorHandler for AllResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::All(predicate) = operator else {
            return Err(unexpected_operator("AllResultOperatorHandler", operator));
        };
        let exists =
            exists_with_predicate(Some(predicate), true, builder, generator, stage, context)?;
        builder.select_projection = Some(SqlExpr::not(exists));
        Ok(())
    }
}
