use crate::preparation::errors::PreparationError;
use crate::registries::{MethodCallTransformer, SqlMethodCall};
use crate::sql_statement::SqlExpr;

/// `Math.*` functions with a direct T-SQL counterpart.
#[derive(Debug, Default)]
pub struct MathFunctionTransformer;

fn sql_function_name(method_name: &str) -> Option<&'static str> {
    Some(match method_name {
        "Abs" => "ABS",
        "Ceiling" => "CEILING",
        "Floor" => "FLOOR",
        "Round" => "ROUND",
        "Sqrt" => "SQRT",
        "Pow" => "POWER",
        "Exp" => "EXP",
        "Log" => "LOG",
        "Sign" => "SIGN",
        _ => return None,
    })
}

impl MethodCallTransformer for MathFunctionTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let name = sql_function_name(&call.method.name).ok_or_else(|| {
            PreparationError::UnsupportedMethod {
                method: call.method.to_string(),
                expression: call.original.clone(),
            }
        })?;

        let mut arguments = call.arguments;
        // ROUND requires an explicit precision.
        if name == "ROUND" && arguments.len() == 1 {
            arguments.push(SqlExpr::int_literal(0));
        }
        Ok(SqlExpr::function(name, arguments, call.method.return_type))
    }
}
