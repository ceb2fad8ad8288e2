use std::collections::HashMap;
use std::sync::Arc;

use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::preparation::errors::PreparationError;
use crate::preparation::result_operator_handlers as handlers;
use crate::preparation::SqlPreparationStage;
use crate::query_model::{ResultOperator, ResultOperatorKind};
use crate::sql_statement::SqlStatementBuilder;

/// Applies one result operator to the statement being prepared.
///
/// Handlers may change the builder in place or move its current statement into a
/// sub-statement table and continue on a fresh builder. Updating the builder's data
/// info to the operator's output is left to the caller.
pub trait ResultOperatorHandler: Send + Sync {
    fn handle_result_operator(
        &self,
        operator: &ResultOperator,
        builder: &mut SqlStatementBuilder,
        generator: &mut AliasGenerator,
        stage: &SqlPreparationStage<'_>,
        context: &SqlPreparationContext<'_>,
    ) -> Result<(), PreparationError>;
}

#[derive(Default)]
pub struct ResultOperatorHandlerRegistry {
    handlers: HashMap<ResultOperatorKind, Arc<dyn ResultOperatorHandler>>,
}

impl ResultOperatorHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_default() -> Self {
        let mut registry = Self::new();
        registry.register(ResultOperatorKind::Take, handlers::take::TakeResultOperatorHandler);
        registry.register(ResultOperatorKind::Skip, handlers::skip::SkipResultOperatorHandler);
        registry.register(
            ResultOperatorKind::Distinct,
            handlers::distinct::DistinctResultOperatorHandler,
        );
        registry.register(ResultOperatorKind::Count, handlers::aggregation::CountResultOperatorHandler);
        registry.register(
            ResultOperatorKind::Aggregate,
            handlers::aggregation::AggregationResultOperatorHandler,
        );
        registry.register(ResultOperatorKind::First, handlers::single::FirstResultOperatorHandler);
        registry.register(ResultOperatorKind::Single, handlers::single::SingleResultOperatorHandler);
        registry.register(
            ResultOperatorKind::Contains,
            handlers::contains::ContainsResultOperatorHandler,
        );
        registry.register(ResultOperatorKind::Any, handlers::any_all::AnyResultOperatorHandler);
        registry.register(ResultOperatorKind::All, handlers::any_all::AllResultOperatorHandler);
        registry.register(ResultOperatorKind::Cast, handlers::cast::CastResultOperatorHandler);
        registry.register(ResultOperatorKind::OfType, handlers::cast::OfTypeResultOperatorHandler);
        registry.register(
            ResultOperatorKind::GroupBy,
            handlers::group_by::GroupByResultOperatorHandler,
        );
        registry.register(
            ResultOperatorKind::DefaultIfEmpty,
            handlers::default_if_empty::DefaultIfEmptyResultOperatorHandler,
        );
        registry.register(
            ResultOperatorKind::Union,
            handlers::set_operation::SetOperationResultOperatorHandler,
        );
        registry.register(
            ResultOperatorKind::Concat,
            handlers::set_operation::SetOperationResultOperatorHandler,
        );
        registry
    }

    pub fn register(
        &mut self,
        kind: ResultOperatorKind,
        handler: impl ResultOperatorHandler + 'static,
    ) {
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Handler for `kind`, falling back to the handler of its base kind.
    pub fn get_item(&self, kind: ResultOperatorKind) -> Option<Arc<dyn ResultOperatorHandler>> {
        self.handlers
            .get(&kind)
            .or_else(|| kind.base_kind().and_then(|base| self.handlers.get(&base)))
            .cloned()
    }

    pub fn is_registered(&self, kind: ResultOperatorKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}
