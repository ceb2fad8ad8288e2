use linqsql::query_model::{
    BinaryOperator, DataType, Expression, Ordering, QueryModel, Value,
};
use linqsql::sql_generation::{ColumnId, ProjectionExpr};
use pretty_assertions::assert_eq;

use super::fixtures::*;

#[test]
fn test_select_member() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[FirstName] FROM [CookTable] AS [t0]"
    );
    assert!(command.parameters.is_empty());
    assert_eq!(
        command.projection,
        ProjectionExpr::Value {
            column: ColumnId::new("", 0),
            ty: DataType::String,
        }
    );
}

#[test]
fn test_select_entity() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), Expression::source(&c));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!("SELECT {} FROM [CookTable] AS [t0]", COOK_COLUMNS)
    );
    match &command.projection {
        ProjectionExpr::Entity { columns, .. } => {
            let names: Vec<_> = columns.iter().map(|column| column.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["ID", "FirstName", "Name", "IsStarredCook", "Weight", "KitchenID"]
            );
        }
        other => panic!("expected an entity projection, got {:?}", other),
    }
}

#[test]
fn test_where_with_constant() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName")).with_where(Expression::equal(
        field(&c, "Name"),
        Expression::constant("Huber"),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[FirstName] FROM [CookTable] AS [t0] WHERE ([t0].[Name] = @1)"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::from("Huber")));
}

#[test]
fn test_comparison_with_null_becomes_is_null() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::equal(
        field(&c, "FirstName"),
        Expression::null(DataType::String),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE ([t0].[FirstName] IS NULL)"
    );
    assert!(command.parameters.is_empty());
}

#[test]
fn test_boolean_member_as_where_condition() {
    let c = cooks("c");
    let model =
        QueryModel::new(c.clone(), field(&c, "Name")).with_where(field(&c, "IsStarredCook"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE ([t0].[IsStarredCook] = 1)"
    );
}

#[test]
fn test_where_clauses_are_combined() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name"))
        .with_where(Expression::equal(
            field(&c, "Name"),
            Expression::constant("Huber"),
        ))
        .with_where(Expression::not_equal(
            field(&c, "FirstName"),
            Expression::null(DataType::String),
        ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE (([t0].[Name] = @1) AND ([t0].[FirstName] IS NOT NULL))"
    );
}

#[test]
fn test_same_constant_is_one_parameter() {
    let c = cooks("c");
    let huber = Expression::constant("Huber");
    let model = QueryModel::new(c.clone(), field(&c, "ID")).with_where(Expression::binary(
        BinaryOperator::OrElse,
        Expression::equal(field(&c, "Name"), huber.clone()),
        Expression::equal(field(&c, "FirstName"), huber),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[ID] FROM [CookTable] AS [t0] WHERE (([t0].[Name] = @1) OR ([t0].[FirstName] = @1))"
    );
    assert_eq!(command.parameters.len(), 1);
}

#[test]
fn test_equal_values_are_separate_parameters() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "ID")).with_where(Expression::binary(
        BinaryOperator::OrElse,
        Expression::equal(field(&c, "Name"), Expression::constant("Huber")),
        Expression::equal(field(&c, "FirstName"), Expression::constant("Huber")),
    ));

    let command = compile(&model);

    assert!(command.command_text.ends_with("([t0].[FirstName] = @2))"));
    assert_eq!(command.parameters.len(), 2);
}

#[test]
fn test_order_by() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName")).with_order_by(vec![
        Ordering::asc(field(&c, "Name")),
        Ordering::desc(field(&c, "Weight")),
    ]);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[FirstName] FROM [CookTable] AS [t0] ORDER BY [t0].[Name] ASC, [t0].[Weight] DESC"
    );
}

#[test]
fn test_later_order_by_takes_priority() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName"))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
        .with_order_by(vec![Ordering::asc(field(&c, "Weight"))]);

    let command = compile(&model);

    assert!(command
        .command_text
        .ends_with("ORDER BY [t0].[Weight] ASC, [t0].[Name] ASC"));
}

#[test]
fn test_order_by_entity_orders_by_all_columns() {
    let k = kitchens("k");
    let model = QueryModel::new(k.clone(), field(&k, "Name"))
        .with_order_by(vec![Ordering::desc(Expression::source(&k))]);

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [KitchenTable] AS [t0] ORDER BY [t0].[ID] DESC, [t0].[Name] DESC, [t0].[RestaurantID] DESC"
    );
}

#[test]
fn test_additional_from_is_cross_join() {
    let c = cooks("c");
    let k = linqsql::query_model::QuerySourceRef::additional_from(
        "k",
        linqsql::testing::kitchen_type(),
        Expression::table(linqsql::testing::kitchen_type()),
    );
    let model = QueryModel::new(c.clone(), field(&k, "Name")).with_additional_from(k.clone());

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[Name] FROM [CookTable] AS [t0] CROSS JOIN [KitchenTable] AS [t1]"
    );
}

#[test]
fn test_anonymous_projection() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        Expression::new_anonymous(vec![
            ("FirstName", field(&c, "FirstName")),
            ("Answer", Expression::constant(42)),
        ]),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[FirstName] AS [FirstName] FROM [CookTable] AS [t0]"
    );
    assert!(command.parameters.is_empty());
    match &command.projection {
        ProjectionExpr::New {
            members, arguments, ..
        } => {
            assert_eq!(members, &vec!["FirstName".to_string(), "Answer".to_string()]);
            assert_eq!(arguments[1], ProjectionExpr::Constant(Value::Int32(42)));
        }
        other => panic!("expected a record projection, got {:?}", other),
    }
}

#[test]
fn test_boolean_predicate_in_select_list() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        Expression::equal(field(&c, "Name"), Expression::constant("Huber")),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT CASE WHEN ([t0].[Name] = @1) THEN 1 ELSE 0 END FROM [CookTable] AS [t0]"
    );
    assert!(matches!(command.projection, ProjectionExpr::IntToBool(_)));
}
