use std::sync::Arc;

use linqsql::query_model::{DataType, Expression, QueryModel, QuerySourceRef};
use linqsql::sql_generation::SqlCommandData;
use linqsql::testing::{cook_type, kitchen_type, member, MappingResolverStub};
use linqsql::{QueryCompiler, QueryCompilerError};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn compiler() -> QueryCompiler {
    init_logging();
    QueryCompiler::new(Arc::new(MappingResolverStub::new()))
}

pub fn compile(model: &QueryModel) -> SqlCommandData {
    compiler()
        .compile(model)
        .unwrap_or_else(|e| panic!("failed to compile '{}': {}", model, e))
}

pub fn try_compile(model: &QueryModel) -> Result<SqlCommandData, QueryCompilerError> {
    compiler().compile(model)
}

pub fn from_table(item_name: &str, item_type: DataType) -> QuerySourceRef {
    QuerySourceRef::main_from(item_name, item_type.clone(), Expression::table(item_type))
}

pub fn cooks(item_name: &str) -> QuerySourceRef {
    from_table(item_name, cook_type())
}

pub fn kitchens(item_name: &str) -> QuerySourceRef {
    from_table(item_name, kitchen_type())
}

/// `source.name` for a member of the fixture schema.
pub fn field(source: &QuerySourceRef, name: &str) -> Expression {
    member_of(Expression::source(source), name)
}

pub fn member_of(expression: Expression, name: &str) -> Expression {
    let type_name = expression
        .data_type()
        .entity_type()
        .map(|entity_type| entity_type.name.clone())
        .unwrap_or_else(|| panic!("'{}' is not an entity", expression));
    expression.member(member(&type_name, name))
}

/// Every column of `CookTable` as selected for a whole cook.
pub const COOK_COLUMNS: &str =
    "[t0].[ID],[t0].[FirstName],[t0].[Name],[t0].[IsStarredCook],[t0].[Weight],[t0].[KitchenID]";
