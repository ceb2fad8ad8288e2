use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{ResultOperator, UnaryOperator};
use crate::registries::ResultOperatorHandler;
use crate::sql_statement::{SqlExpr, SqlStatementBuilder};

use super::{
    current_projection, ensure_no_set_operations, ensure_no_top_expression, unexpected_operator,
};

/// `Cast<T>()`: converts the projection; entities keep their columns.
#[derive(Debug, Default)]
pub struct CastResultOperatorHandler;

impl ResultOperatorHandler for CastResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::Cast(ty) = operator else {
            return Err(unexpected_operator("CastResultOperatorHandler", operator));
        };
        ensure_no_set_operations(builder, generator)?;
        let projection = current_projection(builder)?;
        builder.select_projection = Some(SqlExpr::unary(
            UnaryOperator::Convert(ty.clone()),
            projection,
        ));
        Ok(())
    }
}

/// `OfType<T>()`: filters on a type check, then casts.
#[derive(Debug, Default)]
pub struct OfTypeResultOperatorHandler;

impl ResultOperatorHandler for OfTypeResultOperatorHandler {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        _stage: &SqlPreparationStage<'_>,
        _context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError> {
        let ResultOperator::OfType(ty) = operator else {
            return Err(unexpected_operator("OfTypeResultOperatorHandler", operator));
        };
        ensure_no_set_operations(builder, generator)?;
        ensure_no_top_expression(builder, generator)?;

        let projection = current_projection(builder)?;
        builder.add_where_condition(SqlExpr::TypeIs {
            expression: Box::new(projection.clone()),
            ty: ty.clone(),
        });
        builder.select_projection = Some(SqlExpr::unary(
            UnaryOperator::Convert(ty.clone()),
            projection,
        ));
        Ok(())
    }
}
