use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::ResultOperator;
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{JoinSemantics, SqlStatementBuilder};

use super::{move_current_statement_to_sql_table, unexpected_operator};

/// `DefaultIfEmpty()`: the statement becomes a left-joined sub-statement, yielding one
/// all-NULL row when it is empty.
#[derive(Debug, Default)]
pub struct DefaultIfEmptyResultOperatorHandler;

impl ResultOperatorHandler for DefaultIfEmptyResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        if !matches!(operator, ResultOperator::DefaultIfEmpty) {
            return Err(unexpected_operator(
                "DefaultIfEmptyResultOperatorHandler",
                operator,
            ));
        }
        move_current_statement_to_sql_table(builder, generator, JoinSemantics::Left)
    }
}
