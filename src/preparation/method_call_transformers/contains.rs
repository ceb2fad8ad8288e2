use crate::preparation::errors::PreparationError;
use crate::registries::{MethodCallTransformer, SqlMethodCall};
use crate::sql_statement::SqlExpr;

/// `collection.Contains(item)` over an in-memory collection, rendered as `item IN (...)`.
///
/// Works for the static `Enumerable.Contains(collection, item)` form as well as for
/// instance calls on the collection.
#[derive(Debug, Default)]
pub struct EnumerableContainsTransformer;

impl MethodCallTransformer for EnumerableContainsTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let (collection, item) = match &call.object {
            Some(collection) => (collection.clone(), call.argument(0)?.clone()),
            None => (call.argument(0)?.clone(), call.argument(1)?.clone()),
        };
        if !collection.data_type().is_sequence() {
            return Err(PreparationError::unsupported_expression(
                &call.original,
                "Contains must be called on a collection",
            ));
        }
        Ok(SqlExpr::In {
            left: Box::new(item),
            right: Box::new(collection),
        })
    }
}
