//! SQL generation: renders a resolved statement as T-SQL text with positional
//! parameters, and builds the in-memory projection for the outermost select list.
//!
//! Generation never changes the statement; anything still unresolved at this point is
//! reported as an error.

mod command;
pub mod errors;
mod expression;
mod projection;
mod statement;

use crate::config::CompilerConfig;
use crate::sql_statement::SqlStatement;

pub use command::{CommandParameter, SqlCommandBuilder, SqlCommandData};
pub use errors::{ProjectionError, SqlGenerationError};
pub use expression::{append_expression, is_predicate, SqlContext};
pub use projection::{ColumnId, InMemoryRow, ProjectionExpr, Row};

const DEFAULT_PARAMETER_PREFIX: &str = "@";

#[derive(Debug, Clone)]
pub struct SqlGenerationStage {
    parameter_prefix: String,
}

impl Default for SqlGenerationStage {
    fn default() -> Self {
        SqlGenerationStage::new(DEFAULT_PARAMETER_PREFIX)
    }
}

impl SqlGenerationStage {
    pub fn new(parameter_prefix: &str) -> Self {
        SqlGenerationStage {
            parameter_prefix: parameter_prefix.to_string(),
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        SqlGenerationStage::new(&config.parameter_prefix)
    }

    pub fn create_command_builder(&self) -> SqlCommandBuilder {
        SqlCommandBuilder::new(&self.parameter_prefix)
    }

    /// Generates the complete command for a top-level statement.
    pub fn generate_text_for_outermost_sql_statement(
        &self,
        statement: &SqlStatement,
    ) -> Result<SqlCommandData, SqlGenerationError> {
        let mut command = self.create_command_builder();
        let projection = statement::append_outermost_statement(&mut command, statement)?;
        log::debug!(
            "Generated SQL with {} parameter(s): {}",
            command.parameters().len(),
            command.command_text()
        );
        Ok(command.into_command(projection))
    }

    /// Appends `statement` as a nested statement (plain select list, no projection).
    pub fn generate_text_for_sql_statement(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_statement(command, statement)
    }

    pub fn generate_text_for_top_expression(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_top(command, statement)
    }

    pub fn generate_text_for_from_table(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_from(command, statement)
    }

    pub fn generate_text_for_where_expression(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_where(command, statement)
    }

    pub fn generate_text_for_group_by_expression(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_group_by(command, statement)
    }

    pub fn generate_text_for_order_by_expression(
        &self,
        command: &mut SqlCommandBuilder,
        statement: &SqlStatement,
    ) -> Result<(), SqlGenerationError> {
        statement::append_order_by(command, statement)
    }
}
