use thiserror::Error;

use crate::registries::errors::RegistryError;
use crate::sql_statement::StatementBuildError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreparationError {
    #[error("The method '{method}' is not supported by this code generator, and no custom transformer has been registered. Expression: '{expression}'")]
    UnsupportedMethod { method: String, expression: String },

    #[error("The expression '{expression}' cannot be translated to SQL: {reason}")]
    UnsupportedExpression { expression: String, reason: String },

    #[error("Unsupported from-expression '{0}'.")]
    UnsupportedFromExpression(String),

    #[error("No handler is registered for result operator '{0}'.")]
    UnsupportedResultOperator(String),

    #[error("Query models nested {depth} levels deep exceed the configured maximum of {max}.")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("The query source '{0}' is not mapped in the current context.")]
    UnknownQuerySource(String),

    #[error("Invalid preparation state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Statement build error: {0}")]
    StatementBuild(#[from] StatementBuildError),
}

impl PreparationError {
    pub fn unsupported_expression(expression: impl ToString, reason: impl Into<String>) -> Self {
        PreparationError::UnsupportedExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}
