//! String methods, mapped onto T-SQL string functions with 0-based indexes shifted to 1-based.

use crate::preparation::errors::PreparationError;
use crate::query_model::DataType;
use crate::registries::{MethodCallTransformer, SqlMethodCall};
use crate::sql_statement::SqlExpr;

fn len(expression: SqlExpr) -> SqlExpr {
    SqlExpr::function("LEN", vec![expression], DataType::Int32)
}

fn one_based(index: SqlExpr) -> SqlExpr {
    SqlExpr::add(index, SqlExpr::int_literal(1))
}

fn string_function(name: &str, arguments: Vec<SqlExpr>) -> SqlExpr {
    SqlExpr::function(name, arguments, DataType::String)
}

/// `IndexOf(value)` / `IndexOf(value, start)`; searching for "" yields the start index.
#[derive(Debug, Default)]
pub struct IndexOfTransformer;

impl MethodCallTransformer for IndexOfTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let object = call.object()?.clone();
        let value = call.argument(0)?.clone();
        let empty_value = SqlExpr::equal(len(value.clone()), SqlExpr::int_literal(0));

        let (empty_result, mut char_index_arguments) = match call.arguments.get(1) {
            Some(start) => (start.clone(), vec![value, object, one_based(start.clone())]),
            None => (SqlExpr::int_literal(0), vec![value, object]),
        };
        let char_index = SqlExpr::function(
            "CHARINDEX",
            std::mem::take(&mut char_index_arguments),
            DataType::Int32,
        );

        Ok(SqlExpr::case_when(
            empty_value,
            empty_result,
            SqlExpr::subtract(char_index, SqlExpr::int_literal(1)),
        ))
    }
}

/// `Substring(start)` / `Substring(start, length)`.
#[derive(Debug, Default)]
pub struct SubstringTransformer;

impl MethodCallTransformer for SubstringTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let object = call.object()?.clone();
        let start = one_based(call.argument(0)?.clone());
        let length = match call.arguments.get(1) {
            Some(length) => length.clone(),
            None => len(object.clone()),
        };
        Ok(string_function("SUBSTRING", vec![object, start, length]))
    }
}

/// `Remove(start)` keeps the left part; `Remove(start, count)` cuts with STUFF.
#[derive(Debug, Default)]
pub struct RemoveTransformer;

impl MethodCallTransformer for RemoveTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let object = call.object()?.clone();
        let start = call.argument(0)?.clone();
        Ok(match call.arguments.get(1) {
            Some(count) => string_function(
                "STUFF",
                vec![
                    object,
                    one_based(start),
                    count.clone(),
                    SqlExpr::string_literal(""),
                ],
            ),
            None => string_function("LEFT", vec![object, start]),
        })
    }
}

#[derive(Debug, Default)]
pub struct InsertTransformer;

impl MethodCallTransformer for InsertTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(string_function(
            "STUFF",
            vec![
                call.object()?.clone(),
                one_based(call.argument(0)?.clone()),
                SqlExpr::int_literal(0),
                call.argument(1)?.clone(),
            ],
        ))
    }
}

#[derive(Debug, Default)]
pub struct ReplaceTransformer;

impl MethodCallTransformer for ReplaceTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(string_function(
            "REPLACE",
            vec![
                call.object()?.clone(),
                call.argument(0)?.clone(),
                call.argument(1)?.clone(),
            ],
        ))
    }
}

#[derive(Debug, Default)]
pub struct ToUpperTransformer;

impl MethodCallTransformer for ToUpperTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(string_function("UPPER", vec![call.object()?.clone()]))
    }
}

#[derive(Debug, Default)]
pub struct ToLowerTransformer;

impl MethodCallTransformer for ToLowerTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(string_function("LOWER", vec![call.object()?.clone()]))
    }
}

/// `Trim`, `TrimStart` and `TrimEnd`, told apart by method name.
#[derive(Debug, Default)]
pub struct TrimTransformer;

impl MethodCallTransformer for TrimTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let object = call.object()?.clone();
        match call.method.name.as_str() {
            "TrimStart" => Ok(string_function("LTRIM", vec![object])),
            "TrimEnd" => Ok(string_function("RTRIM", vec![object])),
            "Trim" => Ok(string_function(
                "LTRIM",
                vec![string_function("RTRIM", vec![object])],
            )),
            _ => Err(PreparationError::UnsupportedMethod {
                method: call.method.to_string(),
                expression: call.original,
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct LengthTransformer;

impl MethodCallTransformer for LengthTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(len(call.object()?.clone()))
    }
}

#[derive(Debug, Default)]
pub struct IsNullOrEmptyTransformer;

impl MethodCallTransformer for IsNullOrEmptyTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let value = call.subject()?.clone();
        Ok(SqlExpr::or_else(
            SqlExpr::is_null(value.clone()),
            SqlExpr::equal(len(value), SqlExpr::int_literal(0)),
        ))
    }
}

#[derive(Debug, Default)]
pub struct ConcatTransformer;

impl MethodCallTransformer for ConcatTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        let mut arguments = call.arguments.into_iter();
        let first = arguments.next().unwrap_or_else(|| SqlExpr::string_literal(""));
        Ok(arguments.fold(first, SqlExpr::add))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_model::known_methods::{
        STRING_CONCAT, STRING_INDEX_OF, STRING_INDEX_OF_FROM, STRING_REMOVE,
        STRING_SUBSTRING_LENGTH, STRING_TRIM,
    };
    use crate::query_model::MethodInfo;
    use crate::sql_statement::SqlColumn;

    fn name_column() -> SqlExpr {
        SqlExpr::Column(SqlColumn::definition(DataType::String, "t0", "Name", false))
    }

    fn call(method: &MethodInfo, arguments: Vec<SqlExpr>) -> SqlMethodCall {
        SqlMethodCall {
            method: method.clone(),
            object: Some(name_column()),
            arguments,
            original: String::new(),
        }
    }

    #[test]
    fn test_index_of_shifts_result_to_zero_based() {
        let result = IndexOfTransformer
            .transform(call(&STRING_INDEX_OF, vec![SqlExpr::string_literal("a")]))
            .unwrap();
        assert_eq!(
            result.to_string(),
            "CASE WHEN (LEN(\"a\") == 0) THEN 0 ELSE (CHARINDEX(\"a\", [t0].[Name]) - 1) END"
        );
    }

    #[test]
    fn test_index_of_with_start_index() {
        let result = IndexOfTransformer
            .transform(call(
                &STRING_INDEX_OF_FROM,
                vec![SqlExpr::string_literal("a"), SqlExpr::int_literal(2)],
            ))
            .unwrap();
        assert_eq!(
            result.to_string(),
            "CASE WHEN (LEN(\"a\") == 0) THEN 2 ELSE (CHARINDEX(\"a\", [t0].[Name], (2 + 1)) - 1) END"
        );
    }

    #[test]
    fn test_substring_with_length() {
        let result = SubstringTransformer
            .transform(call(
                &STRING_SUBSTRING_LENGTH,
                vec![SqlExpr::int_literal(0), SqlExpr::int_literal(3)],
            ))
            .unwrap();
        assert_eq!(result.to_string(), "SUBSTRING([t0].[Name], (0 + 1), 3)");
    }

    #[test]
    fn test_remove_without_count_keeps_left_part() {
        let result = RemoveTransformer
            .transform(call(&STRING_REMOVE, vec![SqlExpr::int_literal(4)]))
            .unwrap();
        assert_eq!(result.to_string(), "LEFT([t0].[Name], 4)");
    }

    #[test]
    fn test_trim_nests_both_sides() {
        let result = TrimTransformer.transform(call(&STRING_TRIM, Vec::new())).unwrap();
        assert_eq!(result.to_string(), "LTRIM(RTRIM([t0].[Name]))");
    }

    #[test]
    fn test_concat_adds_arguments() {
        let concat = SqlMethodCall {
            method: STRING_CONCAT.clone(),
            object: None,
            arguments: vec![name_column(), SqlExpr::string_literal("!")],
            original: String::new(),
        };
        let result = ConcatTransformer.transform(concat).unwrap();
        assert_eq!(result.to_string(), "([t0].[Name] + \"!\")");
        assert_eq!(result.data_type(), DataType::String);
    }
}
