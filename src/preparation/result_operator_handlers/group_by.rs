use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::ResultOperator;
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlGroupingSelect, SqlStatementBuilder};

use super::{current_projection, ensure_aggregatable, unexpected_operator};

/// `GroupBy(key, element)`: `GROUP BY key` with a grouping projection.
///
/// Aggregates computed over the groups by later nested queries are attached to the
/// grouping select during mapping resolution.
#[derive(Debug, Default)]
pub struct GroupByResultOperatorHandler;

impl ResultOperatorHandler for GroupByResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::GroupBy {
            key_selector,
            element_selector,
        } = operator
        else {
            return Err(unexpected_operator("GroupByResultOperatorHandler", operator));
        };

        ensure_aggregatable(builder, generator)?;
        builder.orderings.clear();

        let item = current_projection(builder)?;
        let key = stage.prepare_item_lambda(key_selector, item.clone(), context, generator)?;
        let element = stage.prepare_item_lambda(element_selector, item, context, generator)?;

        builder.group_by = Some(key.clone());
        builder.select_projection = Some(SqlExpr::GroupingSelect(SqlGroupingSelect {
            key: Box::new(key),
            element: Box::new(element),
            aggregations: Vec::new(),
        }));
        Ok(())
    }
}
