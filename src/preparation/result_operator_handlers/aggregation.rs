use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{DataType, ResultOperator};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{AggregationKind, SqlExpr, SqlStatementBuilder};

use super::{current_projection, ensure_aggregatable, unexpected_operator};

/// `Count()` and `LongCount()`, both `COUNT(*)`-style aggregates over the current rows.
#[derive(Debug, Default)]
pub struct CountResultOperatorHandler;

impl ResultOperatorHandler for CountResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let (kind, ty) = match operator {
            ResultOperator::Count => (AggregationKind::Count, DataType::Int32),
            ResultOperator::LongCount => (AggregationKind::CountBig, DataType::Int64),
            other => return Err(unexpected_operator("CountResultOperatorHandler", other)),
        };

        ensure_aggregatable(builder, generator)?;
        builder.orderings.clear();
        builder.select_projection = Some(SqlExpr::aggregation(kind, None, ty));
        Ok(())
    }
}

/// `Min()`, `Max()`, `Sum()` and `Average()` over the current projection.
#[derive(Debug, Default)]
pub struct AggregationResultOperatorHandler;

impl ResultOperatorHandler for AggregationResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let kind = match operator {
            ResultOperator::Min => AggregationKind::Min,
            ResultOperator::Max => AggregationKind::Max,
            ResultOperator::Sum => AggregationKind::Sum,
            ResultOperator::Average => AggregationKind::Average,
            other => return Err(unexpected_operator("AggregationResultOperatorHandler", other)),
        };

        ensure_aggregatable(builder, generator)?;
        builder.orderings.clear();

        let projection = current_projection(builder)?;
        let ty = match kind {
            AggregationKind::Average => DataType::Double,
            _ => projection.data_type(),
        };
        builder.select_projection = Some(SqlExpr::aggregation(kind, Some(projection), ty));
        Ok(())
    }
}
