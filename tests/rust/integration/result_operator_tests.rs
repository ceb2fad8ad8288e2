use linqsql::query_model::{
    BinaryOperator, DataType, Expression, ItemLambda, Ordering, QueryModel, QuerySourceRef,
    ResultOperator, Value,
};
use linqsql::sql_generation::ProjectionExpr;
use linqsql::testing::cook_type;
use pretty_assertions::assert_eq;

use super::fixtures::*;

fn first_names() -> QueryModel {
    let c = cooks("c");
    QueryModel::new(c.clone(), field(&c, "FirstName"))
}

fn all_cooks() -> QueryModel {
    let c = cooks("c");
    QueryModel::new(c.clone(), Expression::source(&c))
}

#[test]
fn test_take() {
    let model = first_names().with_result_operator(ResultOperator::Take(Expression::constant(5)));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT TOP (@1) [t0].[FirstName] FROM [CookTable] AS [t0]"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::Int32(5)));
}

#[test]
fn test_take_after_take_wraps() {
    let model = first_names()
        .with_result_operator(ResultOperator::Take(Expression::constant(5)))
        .with_result_operator(ResultOperator::Take(Expression::constant(3)));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT TOP (@1) [q0].[value] FROM (SELECT TOP (@2) [t0].[FirstName] AS [value] FROM [CookTable] AS [t0]) AS [q0]"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::Int32(3)));
    assert_eq!(command.parameter("@2"), Some(&Value::Int32(5)));
}

#[test]
fn test_skip_then_take() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName"))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
        .with_result_operator(ResultOperator::Skip(Expression::constant(100)))
        .with_result_operator(ResultOperator::Take(Expression::constant(5)));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [q0].[Key] FROM (SELECT [t0].[FirstName] AS [Key],ROW_NUMBER() OVER (ORDER BY [t0].[Name] ASC) AS [Value] FROM [CookTable] AS [t0]) AS [q0] WHERE (([q0].[Value] > @1) AND ([q0].[Value] <= (@2 + @3))) ORDER BY [q0].[Value] ASC"
    );
    let values: Vec<_> = command.parameters.iter().map(|p| p.value.clone()).collect();
    assert_eq!(
        values,
        vec![Value::Int32(100), Value::Int32(100), Value::Int32(5)]
    );
}

#[test]
fn test_skip_without_ordering_uses_constant_row_order() {
    let model =
        first_names().with_result_operator(ResultOperator::Skip(Expression::constant(10)));

    let command = compile(&model);

    assert!(command
        .command_text
        .contains("ROW_NUMBER() OVER (ORDER BY (SELECT 1) ASC) AS [Value]"));
    assert!(command.command_text.ends_with("WHERE ([q0].[Value] > @1) ORDER BY [q0].[Value] ASC"));
}

#[test]
fn test_distinct_then_count_wraps() {
    let model = all_cooks()
        .with_result_operator(ResultOperator::Distinct)
        .with_result_operator(ResultOperator::Count);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!(
            "SELECT COUNT(*) FROM (SELECT DISTINCT {} FROM [CookTable] AS [t0]) AS [q0]",
            COOK_COLUMNS
        )
    );
}

#[test]
fn test_count_without_wrapping() {
    let model = all_cooks().with_result_operator(ResultOperator::Count);

    let command = compile(&model);

    assert_eq!(command.command_text, "SELECT COUNT(*) FROM [CookTable] AS [t0]");
    assert!(matches!(
        command.projection,
        ProjectionExpr::Value {
            ty: DataType::Int32,
            ..
        }
    ));
}

#[test]
fn test_long_count() {
    let model = all_cooks().with_result_operator(ResultOperator::LongCount);

    let command = compile(&model);

    assert_eq!(command.command_text, "SELECT COUNT_BIG(*) FROM [CookTable] AS [t0]");
}

#[test]
fn test_count_drops_orderings() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), Expression::source(&c))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
        .with_result_operator(ResultOperator::Count);

    let command = compile(&model);

    assert_eq!(command.command_text, "SELECT COUNT(*) FROM [CookTable] AS [t0]");
}

#[test]
fn test_take_then_distinct_wraps() {
    let model = first_names()
        .with_result_operator(ResultOperator::Take(Expression::constant(5)))
        .with_result_operator(ResultOperator::Distinct);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT DISTINCT [q0].[value] FROM (SELECT TOP (@1) [t0].[FirstName] AS [value] FROM [CookTable] AS [t0]) AS [q0]"
    );
}

#[test]
fn test_distinct_then_take_shares_statement() {
    let model = first_names()
        .with_result_operator(ResultOperator::Distinct)
        .with_result_operator(ResultOperator::Take(Expression::constant(5)));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT DISTINCT TOP (@1) [t0].[FirstName] FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_skip_after_skip_nests_row_numbers() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName"))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
        .with_result_operator(ResultOperator::Skip(Expression::constant(100)))
        .with_result_operator(ResultOperator::Skip(Expression::constant(10)));

    let command = compile(&model);

    assert_eq!(command.command_text.matches("ROW_NUMBER() OVER").count(), 2);
    assert!(
        command
            .command_text
            .contains("ROW_NUMBER() OVER (ORDER BY [q0].[Value] ASC) AS [Value]"),
        "{}",
        command.command_text
    );
    assert!(
        command
            .command_text
            .ends_with(") AS [q1] WHERE ([q1].[Value] > @2) ORDER BY [q1].[Value] ASC"),
        "{}",
        command.command_text
    );
}

#[test]
fn test_default_if_empty_as_first_table_applies_to_empty_row() {
    let model = first_names().with_result_operator(ResultOperator::DefaultIfEmpty);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [q0].[value] FROM (SELECT NULL AS [Empty]) AS [Empty] \
         OUTER APPLY (SELECT [t0].[FirstName] AS [value] FROM [CookTable] AS [t0]) AS [q0]"
    );
}

#[test]
fn test_first_and_single() {
    let first = compile(&first_names().with_result_operator(ResultOperator::First {
        or_default: false,
    }));
    assert_eq!(
        first.command_text,
        "SELECT TOP (1) [t0].[FirstName] FROM [CookTable] AS [t0]"
    );

    let single = compile(&first_names().with_result_operator(ResultOperator::Single {
        or_default: true,
    }));
    assert_eq!(
        single.command_text,
        "SELECT TOP (@1) [t0].[FirstName] FROM [CookTable] AS [t0]"
    );
    assert_eq!(single.parameter("@1"), Some(&Value::Int32(2)));
}

#[test]
fn test_contains() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "ID"))
        .with_result_operator(ResultOperator::Contains(Expression::constant(7)));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT CASE WHEN @1 IN (SELECT [t0].[ID] FROM [CookTable] AS [t0]) THEN 1 ELSE 0 END"
    );
    assert!(matches!(command.projection, ProjectionExpr::IntToBool(_)));
}

#[test]
fn test_any() {
    let model = all_cooks().with_result_operator(ResultOperator::Any(None));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!(
            "SELECT CASE WHEN EXISTS(SELECT {} FROM [CookTable] AS [t0]) THEN 1 ELSE 0 END",
            COOK_COLUMNS
        )
    );
}

#[test]
fn test_all_negates_predicate() {
    let x = QuerySourceRef::parameter("x", cook_type());
    let model = all_cooks().with_result_operator(ResultOperator::All(ItemLambda::new(
        x.clone(),
        field(&x, "IsStarredCook"),
    )));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!(
            "SELECT CASE WHEN NOT EXISTS(SELECT {} FROM [CookTable] AS [t0] WHERE NOT ([t0].[IsStarredCook] = 1)) THEN 1 ELSE 0 END",
            COOK_COLUMNS
        )
    );
}

#[test]
fn test_aggregates() {
    let c = cooks("c");
    let weights = QueryModel::new(c.clone(), field(&c, "Weight"));

    let max = compile(&weights.clone().with_result_operator(ResultOperator::Max));
    assert_eq!(max.command_text, "SELECT MAX([t0].[Weight]) FROM [CookTable] AS [t0]");

    let average = compile(&weights.with_result_operator(ResultOperator::Average));
    assert_eq!(average.command_text, "SELECT AVG([t0].[Weight]) FROM [CookTable] AS [t0]");
}

#[test]
fn test_sum_after_take_wraps() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Weight"))
        .with_result_operator(ResultOperator::Take(Expression::constant(3)))
        .with_result_operator(ResultOperator::Sum);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT SUM([q0].[value]) FROM (SELECT TOP (@1) [t0].[Weight] AS [value] FROM [CookTable] AS [t0]) AS [q0]"
    );
}

#[test]
fn test_union_and_concat() {
    let c = cooks("c");
    let d = cooks("d");
    let other = QueryModel::new(d.clone(), field(&d, "Name"));

    let union = compile(
        &QueryModel::new(c.clone(), field(&c, "FirstName"))
            .with_result_operator(ResultOperator::Union(Expression::sub_query(other.clone()))),
    );
    assert_eq!(
        union.command_text,
        "SELECT [t0].[FirstName] FROM [CookTable] AS [t0] UNION (SELECT [t1].[Name] FROM [CookTable] AS [t1])"
    );

    let concat = compile(
        &QueryModel::new(c.clone(), field(&c, "FirstName"))
            .with_result_operator(ResultOperator::Concat(Expression::sub_query(other))),
    );
    assert!(concat.command_text.contains(" UNION ALL (SELECT [t1].[Name]"));
}

#[test]
fn test_union_drops_orderings_of_first_operand() {
    let c = cooks("c");
    let d = cooks("d");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName"))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
        .with_result_operator(ResultOperator::Union(Expression::sub_query(QueryModel::new(
            d.clone(),
            field(&d, "Name"),
        ))));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [q0].[value] FROM (SELECT [t0].[FirstName] AS [value] FROM [CookTable] AS [t0]) AS [q0] \
         UNION (SELECT [t1].[Name] FROM [CookTable] AS [t1])"
    );
}

#[test]
fn test_set_operation_keeps_constants_in_sql() {
    let c = cooks("c");
    let d = cooks("d");
    let model = QueryModel::new(c.clone(), Expression::constant(1)).with_result_operator(
        ResultOperator::Union(Expression::sub_query(QueryModel::new(
            d.clone(),
            Expression::constant(2),
        ))),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT @1 FROM [CookTable] AS [t0] UNION (SELECT @2 FROM [CookTable] AS [t1])"
    );
}

#[test]
fn test_of_type_filters_on_discriminator() {
    let model = all_cooks().with_result_operator(ResultOperator::OfType(
        linqsql::testing::chef_type(),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!(
            "SELECT {} FROM [CookTable] AS [t0] WHERE ([t0].[IsChef] = 1)",
            COOK_COLUMNS
        )
    );
}

#[test]
fn test_cast_keeps_columns() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "KitchenID"))
        .with_result_operator(ResultOperator::Cast(DataType::Int32));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[KitchenID] FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_where_on_constant_comparison_operator() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::binary(
        BinaryOperator::GreaterThan,
        field(&c, "Weight"),
        Expression::constant(75.5),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE ([t0].[Weight] > @1)"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::Double(75.5)));
}
