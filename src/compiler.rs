//! Entry point chaining preparation, mapping resolution and SQL generation.

use std::sync::Arc;

use validator::Validate;

use crate::alias_generator::AliasGenerator;
use crate::config::CompilerConfig;
use crate::errors::QueryCompilerError;
use crate::mapping_resolution::{MappingResolutionStage, MappingResolver};
use crate::preparation::SqlPreparationStage;
use crate::query_model::QueryModel;
use crate::registries::{
    CompoundMethodCallTransformerProvider, MethodCallTransformerProvider,
    ResultOperatorHandlerRegistry,
};
use crate::sql_generation::{SqlCommandData, SqlGenerationStage};
use crate::sql_statement::SqlStatement;

/// Compiles query models against one schema.
///
/// The compiler holds no per-query state: every call to [`QueryCompiler::compile`] uses
/// its own alias generator, so one compiler can serve several threads.
pub struct QueryCompiler {
    config: CompilerConfig,
    resolver: Arc<dyn MappingResolver>,
    method_call_transformers: Box<dyn MethodCallTransformerProvider>,
    result_operator_handlers: ResultOperatorHandlerRegistry,
}

impl QueryCompiler {
    /// A compiler with the default configuration and the default registries.
    pub fn new(resolver: Arc<dyn MappingResolver>) -> Self {
        QueryCompiler {
            config: CompilerConfig::default(),
            resolver,
            method_call_transformers: Box::new(CompoundMethodCallTransformerProvider::create_default()),
            result_operator_handlers: ResultOperatorHandlerRegistry::create_default(),
        }
    }

    pub fn with_config(
        resolver: Arc<dyn MappingResolver>,
        config: CompilerConfig,
    ) -> Result<Self, QueryCompilerError> {
        config.validate()?;
        Ok(QueryCompiler {
            config,
            ..QueryCompiler::new(resolver)
        })
    }

    pub fn with_method_call_transformers(
        mut self,
        provider: impl MethodCallTransformerProvider + 'static,
    ) -> Self {
        self.method_call_transformers = Box::new(provider);
        self
    }

    pub fn with_result_operator_handlers(mut self, registry: ResultOperatorHandlerRegistry) -> Self {
        self.result_operator_handlers = registry;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Runs preparation and mapping resolution only.
    pub fn compile_to_statement(
        &self,
        model: &QueryModel,
    ) -> Result<SqlStatement, QueryCompilerError> {
        let mut generator = AliasGenerator::from_config(&self.config);
        self.prepare_and_resolve(model, &mut generator)
    }

    pub fn compile(&self, model: &QueryModel) -> Result<SqlCommandData, QueryCompilerError> {
        let mut generator = AliasGenerator::from_config(&self.config);
        let statement = self.prepare_and_resolve(model, &mut generator)?;
        let command = SqlGenerationStage::from_config(&self.config)
            .generate_text_for_outermost_sql_statement(&statement)?;
        Ok(command)
    }

    fn prepare_and_resolve(
        &self,
        model: &QueryModel,
        generator: &mut AliasGenerator,
    ) -> Result<SqlStatement, QueryCompilerError> {
        let preparation = SqlPreparationStage::new(
            self.method_call_transformers.as_ref(),
            &self.result_operator_handlers,
        )
        .with_max_statement_depth(self.config.max_statement_depth as usize);
        let prepared = preparation.prepare_sql_statement(model, None, generator)?;
        log::debug!("Prepared statement: {}", prepared);

        let resolution = MappingResolutionStage::new(self.resolver.as_ref())
            .with_optimize_member_access(self.config.optimize_member_access);
        Ok(resolution.resolve_sql_statement(prepared, generator)?)
    }
}

/// Compiles `model` with the default configuration and registries.
pub fn compile_query(
    model: &QueryModel,
    resolver: Arc<dyn MappingResolver>,
) -> Result<SqlCommandData, QueryCompilerError> {
    QueryCompiler::new(resolver).compile(model)
}
