//! `Contains`, `StartsWith` and `EndsWith` as `LIKE` predicates.

use lazy_static::lazy_static;
use regex::Regex;

use crate::preparation::errors::PreparationError;
use crate::query_model::{DataType, Value};
use crate::registries::{MethodCallTransformer, SqlMethodCall};
use crate::sql_statement::SqlExpr;

const LIKE_SPECIAL_CHARACTERS: [&str; 3] = ["[", "%", "_"];

lazy_static! {
    static ref LIKE_SPECIAL_CHARACTER: Regex =
        Regex::new(r"[%_\[]").expect("valid LIKE escape pattern");
    static ref ESCAPED_LIKE_CHARACTER: Regex =
        Regex::new(r"\[([%_\[])\]").expect("valid LIKE unescape pattern");
}

/// Brackets every LIKE wildcard: `a%b` becomes `a[%]b`.
pub fn escape_like_pattern(text: &str) -> String {
    LIKE_SPECIAL_CHARACTER.replace_all(text, "[$0]").into_owned()
}

/// Inverse of [`escape_like_pattern`].
pub fn unescape_like_pattern(pattern: &str) -> String {
    ESCAPED_LIKE_CHARACTER.replace_all(pattern, "$1").into_owned()
}

/// The escaped pattern for the first argument of `call`, wrapped in `prefix`/`suffix`.
///
/// Constant arguments are escaped now; anything else is escaped by the database
/// through nested `REPLACE` calls.
fn like_pattern(
    call: &SqlMethodCall,
    prefix: &str,
    suffix: &str,
) -> Result<SqlExpr, PreparationError> {
    match call.argument(0)? {
        SqlExpr::Constant(constant) => {
            let text = match constant.value() {
                Value::String(text) => text.clone(),
                Value::Char(c) => c.to_string(),
                Value::Null => {
                    return Err(PreparationError::unsupported_expression(
                        &call.original,
                        format!("'{}' cannot take a null argument", call.method.name),
                    ))
                }
                other => {
                    return Err(PreparationError::unsupported_expression(
                        &call.original,
                        format!("'{}' is not a string", other),
                    ))
                }
            };
            Ok(SqlExpr::constant(format!(
                "{}{}{}",
                prefix,
                escape_like_pattern(&text),
                suffix
            )))
        }
        argument => {
            let mut pattern = LIKE_SPECIAL_CHARACTERS
                .iter()
                .fold(argument.clone(), |escaped, special| {
                    SqlExpr::function(
                        "REPLACE",
                        vec![
                            escaped,
                            SqlExpr::string_literal(special),
                            SqlExpr::string_literal(&format!("[{}]", special)),
                        ],
                        DataType::String,
                    )
                });
            if !prefix.is_empty() {
                pattern = SqlExpr::add(SqlExpr::string_literal(prefix), pattern);
            }
            if !suffix.is_empty() {
                pattern = SqlExpr::add(pattern, SqlExpr::string_literal(suffix));
            }
            Ok(pattern)
        }
    }
}

fn like(call: &SqlMethodCall, prefix: &str, suffix: &str) -> Result<SqlExpr, PreparationError> {
    let pattern = like_pattern(call, prefix, suffix)?;
    Ok(SqlExpr::like(call.object()?.clone(), pattern))
}

#[derive(Debug, Default)]
pub struct ContainsTransformer;

impl MethodCallTransformer for ContainsTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        like(&call, "%", "%")
    }
}

#[derive(Debug, Default)]
pub struct StartsWithTransformer;

impl MethodCallTransformer for StartsWithTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        like(&call, "", "%")
    }
}

#[derive(Debug, Default)]
pub struct EndsWithTransformer;

impl MethodCallTransformer for EndsWithTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        like(&call, "%", "")
    }
}

/// `SqlMethods.Like(text, pattern)`: the pattern is used as written.
#[derive(Debug, Default)]
pub struct LikeTransformer;

impl MethodCallTransformer for LikeTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(SqlExpr::like(
            call.argument(0)?.clone(),
            call.argument(1)?.clone(),
        ))
    }
}
