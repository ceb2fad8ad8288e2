use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{Expression, QueryModel, QuerySourceRef, ResultOperator};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{
    JoinSemantics, SetOperation, SetOperationCombinedStatement, SqlStatement,
    SqlStatementBuilder,
};

use super::{move_current_statement_to_sql_table, unexpected_operator};

/// `Union(source)` and `Concat(source)`, rendered as `UNION` and `UNION ALL`.
#[derive(Debug, Default)]
pub struct SetOperationResultOperatorHandler;

impl ResultOperatorHandler for SetOperationResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let (source, operation) = match operator {
            ResultOperator::Union(source) => (source, SetOperation::Union),
            ResultOperator::Concat(source) => (source, SetOperation::UnionAll),
            other => return Err(unexpected_operator("SetOperationResultOperatorHandler", other)),
        };

        // ORDER BY is not allowed on the first operand of a set operation.
        if !builder.orderings.is_empty() {
            move_current_statement_to_sql_table(builder, generator, JoinSemantics::Inner)?;
        }

        let statement = prepare_operand(source, generator, stage, context)?;
        builder
            .set_operation_combined
            .push(SetOperationCombinedStatement {
                statement,
                operation,
            });
        Ok(())
    }
}

fn prepare_operand(
    source: &Expression,
    generator: &mut AliasGenerator,
    stage: &SqlPreparationStage<'_>,
    context: &SqlPreparationContext<'_>,
) -> Result<SqlStatement, PreparationError> {
    match source {
        Expression::SubQuery(model) => stage.prepare_sql_statement(model, Some(context), generator),
        Expression::Table(item_type) => {
            let item = QuerySourceRef::main_from("item", item_type.clone(), source.clone());
            let model = QueryModel::new(item.clone(), Expression::source(&item));
            stage.prepare_sql_statement(&model, Some(context), generator)
        }
        other => Err(PreparationError::unsupported_expression(
            other,
            "the second sequence of a set operation must be a query or a table",
        )),
    }
}
