use linqsql::query_model::{
    BodyClause, DataType, Expression, ItemLambda, JoinClause, QueryModel, QuerySourceRef,
    ResultOperator, Value,
};
use linqsql::testing::{assistant_type, cook_value, kitchen_type};
use pretty_assertions::assert_eq;

use super::fixtures::*;

#[test]
fn test_navigation_to_identity_needs_no_join() {
    let c = cooks("c");
    let kitchen = field(&c, "Kitchen");
    let model = QueryModel::new(c.clone(), member_of(kitchen, "ID"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[KitchenID] FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_navigation_member_joins_table() {
    let c = cooks("c");
    let kitchen = field(&c, "Kitchen");
    let model = QueryModel::new(c.clone(), member_of(kitchen, "Name"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[Name] FROM [CookTable] AS [t0] \
         LEFT OUTER JOIN [KitchenTable] AS [t1] ON ([t0].[KitchenID] = [t1].[ID])"
    );
}

#[test]
fn test_same_navigation_is_joined_once() {
    let k = kitchens("k");
    let model = QueryModel::new(k.clone(), member_of(field(&k, "Cook"), "Name")).with_where(
        Expression::not_equal(
            member_of(field(&k, "Cook"), "FirstName"),
            Expression::null(DataType::String),
        ),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[Name] FROM [KitchenTable] AS [t0] \
         LEFT OUTER JOIN [CookTable] AS [t1] ON ([t0].[ID] = [t1].[KitchenID]) \
         WHERE ([t1].[FirstName] IS NOT NULL)"
    );
    assert_eq!(command.command_text.matches("JOIN").count(), 1);
}

#[test]
fn test_nested_navigation_chains_joins() {
    let c = cooks("c");
    let restaurant = member_of(field(&c, "Kitchen"), "Restaurant");
    let model = QueryModel::new(c.clone(), member_of(restaurant, "Name"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t2].[Name] FROM [CookTable] AS [t0] \
         LEFT OUTER JOIN [KitchenTable] AS [t1] ON ([t0].[KitchenID] = [t1].[ID]) \
         LEFT OUTER JOIN [RestaurantTable] AS [t2] ON ([t1].[RestaurantID] = [t2].[ID])"
    );
}

#[test]
fn test_select_navigated_entity() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Kitchen"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[ID],[t1].[Name],[t1].[RestaurantID] FROM [CookTable] AS [t0] \
         LEFT OUTER JOIN [KitchenTable] AS [t1] ON ([t0].[KitchenID] = [t1].[ID])"
    );
}

#[test]
fn test_navigation_compared_with_null_uses_foreign_key() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::equal(
        field(&c, "Kitchen"),
        Expression::null(kitchen_type()),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE ([t0].[KitchenID] IS NULL)"
    );
}

#[test]
fn test_entity_constant_compared_by_identity() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::equal(
        Expression::source(&c),
        Expression::constant(cook_value(5, "Hugo")),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] WHERE ([t0].[ID] = @1)"
    );
    assert_eq!(command.parameter("@1"), Some(&Value::Int32(5)));
}

#[test]
fn test_explicit_join_becomes_where_condition() {
    let c = cooks("c");
    let inner = QuerySourceRef::parameter("k", kitchen_type());
    let k = QuerySourceRef::join(
        "k",
        kitchen_type(),
        JoinClause {
            inner_sequence: Expression::table(kitchen_type()),
            outer_key: field(&c, "KitchenID"),
            inner_key: ItemLambda::new(inner.clone(), field(&inner, "ID")),
        },
    );
    let model = QueryModel::new(c.clone(), field(&k, "Name"))
        .with_body_clause(BodyClause::Join(k.clone()));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[Name] FROM [CookTable] AS [t0] CROSS JOIN [KitchenTable] AS [t1] \
         WHERE ([t0].[KitchenID] = [t1].[ID])"
    );
}

#[test]
fn test_from_collection_member() {
    let c = cooks("c");
    let a = QuerySourceRef::additional_from("a", assistant_type(), field(&c, "Assistants"));
    let model = QueryModel::new(c.clone(), field(&a, "Name")).with_additional_from(a.clone());

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t1].[Name] FROM [CookTable] AS [t0] CROSS JOIN [AssistantTable] AS [t1] \
         WHERE ([t1].[AssistedID] = [t0].[ID])"
    );
}

#[test]
fn test_group_join_with_default_if_empty_is_outer_apply() {
    let c = cooks("c");
    let inner = QuerySourceRef::parameter("k", kitchen_type());
    let kg = QuerySourceRef::group_join(
        "kg",
        kitchen_type(),
        JoinClause {
            inner_sequence: Expression::table(kitchen_type()),
            outer_key: field(&c, "KitchenID"),
            inner_key: ItemLambda::new(inner.clone(), field(&inner, "ID")),
        },
    );
    let k = QuerySourceRef::main_from("k", kitchen_type(), Expression::source(&kg));
    let defaulted = QueryModel::new(k.clone(), Expression::source(&k))
        .with_result_operator(ResultOperator::DefaultIfEmpty);
    let x = QuerySourceRef::additional_from("x", kitchen_type(), Expression::sub_query(defaulted));
    let model = QueryModel::new(c.clone(), field(&x, "Name"))
        .with_body_clause(BodyClause::GroupJoin(kg.clone()))
        .with_additional_from(x.clone());

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [q0].[Name] FROM [CookTable] AS [t0] OUTER APPLY \
         (SELECT [t1].[ID],[t1].[Name],[t1].[RestaurantID] FROM [KitchenTable] AS [t1] \
         WHERE ([t0].[KitchenID] = [t1].[ID])) AS [q0]"
    );
}
