use crate::preparation::errors::PreparationError;
use crate::query_model::DataType;
use crate::registries::{MethodCallTransformer, SqlMethodCall};
use crate::sql_statement::SqlExpr;

/// `x.ToString()` on any type.
#[derive(Debug, Default)]
pub struct ToStringTransformer;

impl MethodCallTransformer for ToStringTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(SqlExpr::SqlConvert {
            source: Box::new(call.object()?.clone()),
            ty: DataType::String,
        })
    }
}

/// `x.Equals(y)`, compared like `x == y` so that entities get identity comparison.
#[derive(Debug, Default)]
pub struct EqualsTransformer;

impl MethodCallTransformer for EqualsTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let (left, right) = match &call.object {
            Some(object) => (object.clone(), call.argument(0)?.clone()),
            None => (call.argument(0)?.clone(), call.argument(1)?.clone()),
        };
        Ok(SqlExpr::equal(left, right))
    }
}
