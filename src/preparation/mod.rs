//! Preparation: lowers a [`QueryModel`] into an unresolved [`SqlStatement`].
//!
//! Clauses are visited in source order. Query sources become tables whose item
//! selectors are registered in a [`SqlPreparationContext`]; expressions are lowered by
//! the expression visitor, method calls go through the method-call transformer
//! registry and result operators through the result-operator handler registry.

pub mod errors;
mod expression_visitor;
pub mod from_expression;
pub mod method_call_transformers;
mod query_model_visitor;
pub mod result_operator_handlers;

use crate::alias_generator::AliasGenerator;
use crate::context::SqlPreparationContext;
use crate::query_model::{Expression, ItemLambda, QueryModel};
use crate::registries::{MethodCallTransformerProvider, ResultOperatorHandlerRegistry};
use crate::sql_statement::{SqlExpr, SqlStatement};

pub use errors::PreparationError;
pub use from_expression::FromExpressionInfo;

const DEFAULT_MAX_STATEMENT_DEPTH: usize = 64;

pub struct SqlPreparationStage<'a> {
    method_call_transformers: &'a dyn MethodCallTransformerProvider,
    result_operator_handlers: &'a ResultOperatorHandlerRegistry,
    max_statement_depth: usize,
}

impl<'a> SqlPreparationStage<'a> {
    pub fn new(
        method_call_transformers: &'a dyn MethodCallTransformerProvider,
        result_operator_handlers: &'a ResultOperatorHandlerRegistry,
    ) -> Self {
        SqlPreparationStage {
            method_call_transformers,
            result_operator_handlers,
            max_statement_depth: DEFAULT_MAX_STATEMENT_DEPTH,
        }
    }

    pub fn with_max_statement_depth(mut self, max_statement_depth: usize) -> Self {
        self.max_statement_depth = max_statement_depth;
        self
    }

    pub fn method_call_transformers(&self) -> &dyn MethodCallTransformerProvider {
        self.method_call_transformers
    }

    pub fn result_operator_handlers(&self) -> &ResultOperatorHandlerRegistry {
        self.result_operator_handlers
    }

    /// Prepares one query level. `parent` is the context of the enclosing level, if any;
    /// the new level sees its sources but adds its own only to a private child context.
    pub fn prepare_sql_statement(
        &self,
        model: &QueryModel,
        parent: Option<&SqlPreparationContext<'_>>,
        generator: &mut AliasGenerator,
    ) -> Result<SqlStatement, PreparationError> {
        let depth = parent.map_or(0, |context| context.depth() + 1);
        if depth >= self.max_statement_depth {
            return Err(PreparationError::NestingTooDeep {
                depth: depth + 1,
                max: self.max_statement_depth,
            });
        }
        query_model_visitor::transform_query_model(self, model, parent, generator)
    }

    pub fn prepare_expression(
        &self,
        expression: &Expression,
        context: &SqlPreparationContext<'_>,
        generator: &mut AliasGenerator,
    ) -> Result<SqlExpr, PreparationError> {
        expression_visitor::prepare_expression(self, expression, context, generator)
    }

    /// Prepares the body of `lambda` with its parameter standing for `item`.
    pub fn prepare_item_lambda(
        &self,
        lambda: &ItemLambda,
        item: SqlExpr,
        context: &SqlPreparationContext<'_>,
        generator: &mut AliasGenerator,
    ) -> Result<SqlExpr, PreparationError> {
        let mut lambda_context = SqlPreparationContext::child(context);
        lambda_context.add_mapping(lambda.parameter.clone(), item);
        self.prepare_expression(&lambda.body, &lambda_context, generator)
    }

    pub fn prepare_from_expression(
        &self,
        expression: &Expression,
        context: &SqlPreparationContext<'_>,
        generator: &mut AliasGenerator,
    ) -> Result<FromExpressionInfo, PreparationError> {
        from_expression::prepare_from_expression(self, expression, context, generator)
    }
}
