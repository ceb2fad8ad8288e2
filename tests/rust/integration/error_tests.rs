use std::sync::Arc;

use linqsql::mapping_resolution::MappingResolutionError;
use linqsql::preparation::PreparationError;
use linqsql::query_model::{
    DataType, Expression, ItemLambda, MemberInfo, QueryModel, QuerySourceRef, ResultOperator,
};
use linqsql::sql_generation::SqlGenerationError;
use linqsql::testing::{cook_type, MappingResolverStub};
use linqsql::{CompilerConfig, ErrorKind, QueryCompiler, QueryCompilerError};

use super::fixtures::*;
use super::sub_query_tests::cooks_by_name;

#[test]
fn test_unmapped_table() {
    let u = from_table("u", DataType::entity("Unknown"));
    let model = QueryModel::new(u.clone(), Expression::source(&u));

    let error = try_compile(&model).unwrap_err();

    assert!(matches!(
        error,
        QueryCompilerError::MappingResolution(MappingResolutionError::UnmappedType { .. })
    ));
    assert_eq!(error.kind(), ErrorKind::UnmappedItem);
}

#[test]
fn test_unmapped_member() {
    let c = cooks("c");
    let age = Expression::source(&c).member(MemberInfo::new("Cook", "Age", DataType::Int32));
    let model = QueryModel::new(c.clone(), age);

    let error = try_compile(&model).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnmappedItem);
    assert!(error.to_string().contains("Age"));
}

#[test]
fn test_selecting_collection_is_not_supported() {
    let c = cooks("c");
    let model = QueryModel::new(c.clone(), field(&c, "Assistants"));

    let error = try_compile(&model).unwrap_err();

    assert!(matches!(
        error,
        QueryCompilerError::SqlGeneration(SqlGenerationError::NotSupported { .. })
    ));
    assert_eq!(error.kind(), ErrorKind::UnsupportedConstruct);
}

#[test]
fn test_statement_depth_limit() {
    let config = CompilerConfig {
        max_statement_depth: 1,
        ..Default::default()
    };
    let compiler =
        QueryCompiler::with_config(Arc::new(MappingResolverStub::new()), config).unwrap();
    let c = cooks("c");
    let d = cooks("d");
    let count = QueryModel::new(d.clone(), Expression::source(&d))
        .with_result_operator(ResultOperator::Count);
    let model = QueryModel::new(c.clone(), Expression::sub_query(count));

    let error = compiler.compile(&model).unwrap_err();

    assert!(matches!(
        error,
        QueryCompilerError::Preparation(PreparationError::NestingTooDeep { .. })
    ));
    assert_eq!(error.kind(), ErrorKind::UnsupportedConstruct);
}

#[test]
fn test_top_level_group_by_is_not_supported() {
    let c = cooks("c");
    let p = QuerySourceRef::parameter("p", cook_type());
    let model = QueryModel::new(c.clone(), Expression::source(&c)).with_result_operator(
        ResultOperator::GroupBy {
            key_selector: ItemLambda::new(p.clone(), field(&p, "Name")),
            element_selector: ItemLambda::new(p.clone(), Expression::source(&p)),
        },
    );

    let error = try_compile(&model).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnsupportedConstruct);
}

#[test]
fn test_group_elements_need_an_aggregate() {
    let (g, _) = cooks_by_name();
    let x = QuerySourceRef::main_from("x", cook_type(), Expression::source(&g));
    let names = QueryModel::new(x.clone(), field(&x, "FirstName"));
    let model = QueryModel::new(g.clone(), Expression::sub_query(names));

    let error = try_compile(&model).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnsupportedConstruct);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = CompilerConfig {
        table_alias_prefix: "q".to_string(),
        sub_statement_alias_prefix: "q".to_string(),
        ..Default::default()
    };

    let result = QueryCompiler::with_config(Arc::new(MappingResolverStub::new()), config);

    match result {
        Err(error) => assert_eq!(error.kind(), ErrorKind::ConfigurationError),
        Ok(_) => panic!("overlapping alias prefixes were accepted"),
    }
}
