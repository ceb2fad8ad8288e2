use linqsql::query_model::known_methods::{
    enumerable_contains, to_string_method, STRING_CONTAINS, STRING_STARTS_WITH,
    STRING_SUBSTRING_LENGTH, STRING_TO_UPPER,
};
use linqsql::query_model::{DataType, Expression, MethodInfo, QueryModel, Value};
use linqsql::ErrorKind;
use pretty_assertions::assert_eq;

use super::fixtures::*;

#[test]
fn test_string_contains_becomes_like() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(
        field(&c, "FirstName").call(STRING_CONTAINS.clone(), vec![Expression::constant("oo")]),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE [t0].[FirstName] LIKE @1"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::from("%oo%")));
}

#[test]
fn test_starts_with_escapes_wildcards() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(
        field(&c, "FirstName").call(STRING_STARTS_WITH.clone(), vec![Expression::constant("a%b")]),
    );

    let command = compile(&model);

    assert_eq!(command.parameter("@1"), Some(&Value::from("a[%]b%")));
}

#[test]
fn test_to_upper_in_select() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        field(&c, "FirstName").call(STRING_TO_UPPER.clone(), vec![]),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT UPPER([t0].[FirstName]) FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_substring_is_one_based() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        field(&c, "FirstName").call(
            STRING_SUBSTRING_LENGTH.clone(),
            vec![Expression::constant(1), Expression::constant(2)],
        ),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT SUBSTRING([t0].[FirstName], (@1 + 1), @2) FROM [CookTable] AS [t0]"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::Int32(1)));
    assert_eq!(command.parameter("@2"), Some(&Value::Int32(2)));
}

#[test]
fn test_enumerable_contains_expands_list() {
    let c = cooks("c");
    let ids = Expression::constant(Value::List(vec![
        Value::Int32(3),
        Value::Int32(4),
        Value::Int32(5),
    ]));
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::static_call(
        enumerable_contains(DataType::Int32),
        vec![ids, field(&c, "ID")],
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE [t0].[ID] IN (@1, @2, @3)"
    );
    assert_eq!(command.parameters.len(), 3);
    assert_eq!(command.parameter("@3"), Some(&Value::Int32(5)));
}

#[test]
fn test_enumerable_contains_empty_list() {
    let c = cooks("c");
    let ids = Expression::typed_constant(
        Value::List(vec![]),
        DataType::sequence_of(DataType::Int32),
    );
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::static_call(
        enumerable_contains(DataType::Int32),
        vec![ids, field(&c, "ID")],
    ));

    let command = compile(&model);

    assert!(command.command_text.ends_with("WHERE [t0].[ID] IN (NULL)"));
    assert!(command.parameters.is_empty());
}

#[test]
fn test_to_string_is_matched_by_name() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        field(&c, "ID").call(to_string_method(&DataType::Int32), vec![]),
    );

    let command = compile(&model);

    assert!(command.command_text.starts_with("SELECT CONVERT("));
    assert!(command.command_text.contains("[t0].[ID]"));
}

#[test]
fn test_unknown_method_is_rejected() {
    let c = cooks("c");
    let frobnicate = MethodInfo::instance("String", "Frobnicate", vec![], DataType::String);
    let model = QueryModel::new(c.clone(), field(&c, "Name").call(frobnicate, vec![]));

    let error = try_compile(&model).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnsupportedConstruct);
    assert!(error.to_string().contains("Frobnicate"));
}
