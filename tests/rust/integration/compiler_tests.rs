use std::sync::Arc;

use linqsql::preparation::PreparationError;
use linqsql::query_model::{DataType, Expression, MethodInfo, QueryModel, Value};
use linqsql::registries::{MethodCallTransformer, SqlMethodCall, TransformerAttribute};
use linqsql::sql_generation::InMemoryRow;
use linqsql::sql_statement::SqlExpr;
use linqsql::testing::MappingResolverStub;
use linqsql::{compile_query, CompilerConfig, QueryCompiler};
use pretty_assertions::assert_eq;

use super::fixtures::*;

struct SoundexTransformer;

impl MethodCallTransformer for SoundexTransformer {
    fn transform(&self, call: SqlMethodCall) -> Result<SqlExpr, PreparationError> {
        Ok(SqlExpr::function(
            "SOUNDEX",
            vec![call.object()?.clone()],
            DataType::String,
        ))
    }
}

fn configured(config: CompilerConfig) -> QueryCompiler {
    init_logging();
    QueryCompiler::with_config(Arc::new(MappingResolverStub::new()), config)
        .unwrap_or_else(|e| panic!("invalid config: {}", e))
}

#[test]
fn test_custom_prefixes() {
    let compiler = configured(CompilerConfig {
        parameter_prefix: ":p".to_string(),
        table_alias_prefix: "a".to_string(),
        sub_statement_alias_prefix: "s".to_string(),
        ..Default::default()
    });
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "FirstName")).with_where(Expression::equal(
        field(&c, "Name"),
        Expression::constant("Huber"),
    ));

    let command = compiler.compile(&model).unwrap();

    assert_eq!(
        command.command_text,
        "SELECT [a0].[FirstName] FROM [CookTable] AS [a0] WHERE ([a0].[Name] = :p1)"
    );
    assert_eq!(command.parameter(":p1"), Some(&Value::from("Huber")));
}

#[test]
fn test_member_access_optimization_can_be_disabled() {
    let compiler = configured(CompilerConfig {
        optimize_member_access: false,
        ..Default::default()
    });
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), member_of(field(&c, "Kitchen"), "ID"));

    let command = compiler.compile(&model).unwrap();

    assert_eq!(
        command.command_text,
        "SELECT [t1].[ID] FROM [CookTable] AS [t0] \
         LEFT OUTER JOIN [KitchenTable] AS [t1] ON ([t0].[KitchenID] = [t1].[ID])"
    );
}

#[test]
fn test_compile_query_uses_defaults() {
    init_logging();
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name"));

    let command = compile_query(&model, Arc::new(MappingResolverStub::new())).unwrap();

    assert_eq!(command.command_text, "SELECT [t0].[Name] FROM [CookTable] AS [t0]");
}

#[test]
fn test_compiler_is_reusable() {
    let compiler = compiler();
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name"));

    let first = compiler.compile(&model).unwrap();
    let second = compiler.compile(&model).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_compile_to_statement_stops_before_sql() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name"));

    assert!(compiler().compile_to_statement(&model).is_ok());
}

#[test]
fn test_transformer_attribute_on_method() {
    let soundex = MethodInfo::instance("String", "Soundex", vec![], DataType::String)
        .with_transformer_attribute(TransformerAttribute::new(SoundexTransformer));
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name").call(soundex, vec![]));

    let command = compile(&model);

    assert_eq!(
        command.command_text,
        "SELECT SOUNDEX([t0].[Name]) FROM [CookTable] AS [t0]"
    );
}

#[test]
fn test_projection_reads_entity_from_row() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), Expression::source(&c));
    let command = compile(&model);
    let row = InMemoryRow::new(vec![
        Value::Int32(7),
        Value::from("Hugo"),
        Value::from("Huber"),
        Value::Boolean(true),
        Value::Double(80.0),
        Value::Null,
    ]);

    let cook = command.projection.evaluate(&row).unwrap();

    assert_eq!(cook.field("ID"), Some(&Value::Int32(7)));
    assert_eq!(cook.field("FirstName"), Some(&Value::from("Hugo")));
    assert_eq!(cook.field("KitchenID"), Some(&Value::Null));
}

#[test]
fn test_projection_of_anonymous_type() {
    let c = cooks("c");
    let model = QueryModel::new(
        c.clone(),
        Expression::new_anonymous(vec![
            ("Name", field(&c, "Name")),
            ("Answer", Expression::constant(42)),
        ]),
    );
    let command = compile(&model);
    let row = InMemoryRow::new(vec![Value::from("Huber")]);

    let record = command.projection.evaluate(&row).unwrap();

    assert_eq!(
        record,
        Value::Record(vec![
            ("Name".to_string(), Value::from("Huber")),
            ("Answer".to_string(), Value::Int32(42)),
        ])
    );
}

#[test]
fn test_command_to_json() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Name")).with_where(Expression::equal(
        field(&c, "FirstName"),
        Expression::constant("Hugo"),
    ));
    let command = compile(&model);

    let json: serde_json::Value = serde_json::from_str(&command.to_json().unwrap()).unwrap();

    assert_eq!(json["command_text"], command.command_text.as_str());
    assert_eq!(json["parameters"][0]["name"], "@1");
}
