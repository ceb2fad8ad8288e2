use linqsql::query_model::{
    DataType, Expression, ItemLambda, MemberInfo, Ordering, QueryModel, QuerySourceRef,
    ResultOperator,
};
use linqsql::testing::cook_type;
use pretty_assertions::assert_eq;

use super::fixtures::*;

/// `from c in Cooks group c by c.Name`, as the source of a grouping query.
pub fn cooks_by_name() -> (QuerySourceRef, DataType) {
    let p = QuerySourceRef::parameter("p", cook_type());
    let inner = cooks("c");
    let grouped = QueryModel::new(inner.clone(), Expression::source(&inner)).with_result_operator(
        ResultOperator::GroupBy {
            key_selector: ItemLambda::new(p.clone(), field(&p, "Name")),
            element_selector: ItemLambda::new(p.clone(), Expression::source(&p)),
        },
    );
    let grouping_type = DataType::Grouping {
        key: Box::new(DataType::String),
        element: Box::new(cook_type()),
    };
    let g = QuerySourceRef::main_from("g", grouping_type.clone(), Expression::sub_query(grouped));
    (g, grouping_type)
}

pub fn grouping_key(g: &QuerySourceRef) -> Expression {
    Expression::source(g).member(MemberInfo::new("IGrouping", "Key", DataType::String))
}

#[test]
fn test_scalar_sub_query_in_select() {
    let c = cooks("c");
    let d = cooks("d");
    let same_name = QueryModel::new(d.clone(), Expression::source(&d))
        .with_where(Expression::equal(field(&d, "Name"), field(&c, "Name")))
        .with_result_operator(ResultOperator::Count);
    let model = QueryModel::new(c.clone(), Expression::sub_query(same_name));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT (SELECT COUNT(*) FROM [CookTable] AS [t1] WHERE ([t1].[Name] = [t0].[Name])) \
         FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_first_entity_sub_query_in_select_becomes_apply() {
    let c = cooks("c");
    let d = cooks("d");
    let first_namesake = QueryModel::new(d.clone(), Expression::source(&d))
        .with_where(Expression::equal(field(&d, "Name"), field(&c, "Name")))
        .with_result_operator(ResultOperator::First { or_default: true });
    let model = QueryModel::new(c.clone(), Expression::sub_query(first_namesake));

    let command = compile(&model);

    assert!(
        command.command_text.contains(&format!(
            "FROM [CookTable] AS [t0] OUTER APPLY (SELECT TOP (1) {} FROM [CookTable] AS [t1] \
             WHERE ([t1].[Name] = [t0].[Name])) AS [q0]",
            COOK_COLUMNS.replace("[t0]", "[t1]")
        )),
        "{}",
        command.command_text
    );
    assert!(command.command_text.starts_with("SELECT [q0]."), "{}", command.command_text);
}

#[test]
fn test_first_scalar_sub_query_in_select_stays_inline() {
    let c = cooks("c");
    let d = cooks("d");
    let first_namesake = QueryModel::new(d.clone(), field(&d, "FirstName"))
        .with_where(Expression::equal(field(&d, "Name"), field(&c, "Name")))
        .with_result_operator(ResultOperator::First { or_default: true });
    let model = QueryModel::new(c.clone(), Expression::sub_query(first_namesake));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT (SELECT TOP (1) [t1].[FirstName] FROM [CookTable] AS [t1] \
         WHERE ([t1].[Name] = [t0].[Name])) FROM [CookTable] AS [t0]"
    );
}

/// `from k in Kitchens where k.ID == c.KitchenID select k`, correlated on `c`.
fn kitchens_of(c: &QuerySourceRef) -> QueryModel {
    let k = kitchens("k");
    QueryModel::new(k.clone(), Expression::source(&k))
        .with_where(Expression::equal(field(&k, "ID"), field(c, "KitchenID")))
}

#[test]
fn test_any_sub_query_in_where_is_exists_predicate() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::sub_query(
        kitchens_of(&c).with_result_operator(ResultOperator::Any(None)),
    ));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] \
         WHERE EXISTS(SELECT [t1].[ID],[t1].[Name],[t1].[RestaurantID] FROM [KitchenTable] AS [t1] \
         WHERE ([t1].[ID] = [t0].[KitchenID]))"
    );
    assert!(!command.command_text.contains("CASE WHEN"));
}

#[test]
fn test_contains_sub_query_in_where_is_in_predicate() {
    let c = cooks("c");
    let k = kitchens("k");
    let kitchen_ids = QueryModel::new(k.clone(), field(&k, "ID"))
        .with_result_operator(ResultOperator::Contains(field(&c, "KitchenID")));
    let model =
        QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::sub_query(kitchen_ids));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [t0].[Name] FROM [CookTable] AS [t0] \
         WHERE [t0].[KitchenID] IN (SELECT [t1].[ID] FROM [KitchenTable] AS [t1])"
    );
}

#[test]
fn test_sub_query_in_from() {
    let inner = cooks("c");
    let starred = QueryModel::new(inner.clone(), Expression::source(&inner))
        .with_where(field(&inner, "IsStarredCook"));
    let s = QuerySourceRef::main_from("s", cook_type(), Expression::sub_query(starred));
    let model = QueryModel::new(s.clone(), field(&s, "Name"));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        format!(
            "SELECT [q0].[Name] FROM (SELECT {} FROM [CookTable] AS [t0] \
             WHERE ([t0].[IsStarredCook] = 1)) AS [q0]",
            COOK_COLUMNS
        )
    );
}

#[test]
fn test_group_key_and_aggregate() {
    let (g, _) = cooks_by_name();
    let x = QuerySourceRef::main_from("x", cook_type(), Expression::source(&g));
    let count = QueryModel::new(x.clone(), Expression::source(&x))
        .with_result_operator(ResultOperator::Count);
    let model = QueryModel::new(
        g.clone(),
        Expression::new_anonymous(vec![
            ("Key", grouping_key(&g)),
            ("Count", Expression::sub_query(count)),
        ]),
    );

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT [q0].[key] AS [Key],[q0].[a0] AS [Count] FROM \
         (SELECT [t0].[Name] AS [key],COUNT(*) AS [a0] FROM [CookTable] AS [t0] \
         GROUP BY [t0].[Name]) AS [q0]"
    );
}

/// `from c in Cooks orderby c.Name select c.FirstName`
fn first_names_by_name() -> QueryModel {
    let c = cooks("c");
    QueryModel::new(c.clone(), field(&c, "FirstName"))
        .with_order_by(vec![Ordering::asc(field(&c, "Name"))])
}

fn derived_table_sql(command_text: &str) -> &str {
    let start = command_text
        .find("(SELECT")
        .unwrap_or_else(|| panic!("no derived table in {}", command_text));
    let end = command_text
        .find(") AS [q0]")
        .unwrap_or_else(|| panic!("no derived table alias in {}", command_text));
    &command_text[start..end]
}

#[test]
fn test_sub_query_orderings_move_to_outer_statement() {
    let s = QuerySourceRef::main_from(
        "s",
        DataType::String,
        Expression::sub_query(first_names_by_name()),
    );
    let model = QueryModel::new(s.clone(), Expression::source(&s));

    let command = compile(&model);

    assert!(!derived_table_sql(&command.command_text).contains("ORDER BY"));
    assert!(
        command.command_text.contains(") AS [q0] ORDER BY [q0]."),
        "{}",
        command.command_text
    );
    assert!(command.command_text.ends_with(" ASC"));
}

#[test]
fn test_sub_query_orderings_dropped_under_aggregate() {
    let s = QuerySourceRef::main_from(
        "s",
        DataType::String,
        Expression::sub_query(first_names_by_name()),
    );
    let model = QueryModel::new(s.clone(), Expression::source(&s))
        .with_result_operator(ResultOperator::Count);

    let command = compile(&model);

    assert!(command.command_text.starts_with("SELECT COUNT(*) FROM"));
    assert!(!command.command_text.contains("ORDER BY"), "{}", command.command_text);
}

#[test]
fn test_sub_query_orderings_kept_with_top() {
    let s = QuerySourceRef::main_from(
        "s",
        DataType::String,
        Expression::sub_query(
            first_names_by_name().with_result_operator(ResultOperator::Take(Expression::constant(3))),
        ),
    );
    let model = QueryModel::new(s.clone(), Expression::source(&s));

    let command = compile(&model);

    assert!(
        command
            .command_text
            .contains("TOP (@1) [t0].[FirstName]"),
        "{}",
        command.command_text
    );
    assert!(
        command.command_text.ends_with("ORDER BY [t0].[Name] ASC) AS [q0]"),
        "{}",
        command.command_text
    );
}
