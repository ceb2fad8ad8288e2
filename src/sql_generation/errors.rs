use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlGenerationError {
    #[error("The expression '{expression}' is not supported by the SQL generator: {reason}")]
    NotSupported { expression: String, reason: String },

    #[error("Table info '{0}' is not valid at SQL generation; it should have been resolved.")]
    InvalidTableInfo(String),

    #[error("Join info '{0}' is not valid at SQL generation; it should have been resolved.")]
    InvalidJoinInfo(String),

    #[error("The expression '{0}' should have been resolved before SQL generation.")]
    UnresolvedExpression(String),
}

impl SqlGenerationError {
    pub fn not_supported(expression: impl ToString, reason: impl Into<String>) -> Self {
        SqlGenerationError::NotSupported {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while materializing a result row through the in-memory projection.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Column '{name}' (position {position}) is not present in the row.")]
    MissingColumn { name: String, position: usize },

    #[error("Column '{column}' holds {value}, which cannot be read as {expected}.")]
    InvalidValue {
        column: String,
        value: String,
        expected: String,
    },
}
