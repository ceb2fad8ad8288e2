//! The error returned by [`crate::compiler::QueryCompiler`], wrapping the first failure
//! of whichever stage raised it.

use thiserror::Error;

use crate::config::ConfigError;
use crate::mapping_resolution::MappingResolutionError;
use crate::preparation::PreparationError;
use crate::registries::RegistryError;
use crate::sql_generation::SqlGenerationError;

/// Broad classes of compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A query shape the compiler has no translation for.
    UnsupportedConstruct,
    /// The mapping resolver does not know a type or member.
    UnmappedItem,
    /// A stage broke a contract of the pipeline; a compiler bug rather than a user error.
    InvariantViolation,
    ConfigurationError,
}

#[derive(Debug, Error)]
pub enum QueryCompilerError {
    #[error("Preparation failed: {0}")]
    Preparation(#[from] PreparationError),

    #[error("Mapping resolution failed: {0}")]
    MappingResolution(#[from] MappingResolutionError),

    #[error("SQL generation failed: {0}")]
    SqlGeneration(#[from] SqlGenerationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<validator::ValidationErrors> for QueryCompilerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        QueryCompilerError::Config(ConfigError::Validation(errors))
    }
}

impl QueryCompilerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryCompilerError::Preparation(error) => match error {
                PreparationError::UnsupportedMethod { .. }
                | PreparationError::UnsupportedExpression { .. }
                | PreparationError::UnsupportedFromExpression(_)
                | PreparationError::UnsupportedResultOperator(_)
                | PreparationError::NestingTooDeep { .. } => ErrorKind::UnsupportedConstruct,
                PreparationError::Registry(_) => ErrorKind::ConfigurationError,
                PreparationError::UnknownQuerySource(_)
                | PreparationError::InvalidState(_)
                | PreparationError::StatementBuild(_) => ErrorKind::InvariantViolation,
            },
            QueryCompilerError::MappingResolution(error) => match error {
                MappingResolutionError::UnmappedType { .. }
                | MappingResolutionError::UnmappedMember { .. } => ErrorKind::UnmappedItem,
                MappingResolutionError::UnsupportedConstruct { .. } => {
                    ErrorKind::UnsupportedConstruct
                }
                MappingResolutionError::ProjectionTypeChanged { .. }
                | MappingResolutionError::InvalidState(_)
                | MappingResolutionError::StatementBuild(_) => ErrorKind::InvariantViolation,
            },
            QueryCompilerError::SqlGeneration(error) => match error {
                SqlGenerationError::NotSupported { .. } => ErrorKind::UnsupportedConstruct,
                SqlGenerationError::InvalidTableInfo(_)
                | SqlGenerationError::InvalidJoinInfo(_)
                | SqlGenerationError::UnresolvedExpression(_) => ErrorKind::InvariantViolation,
            },
            QueryCompilerError::Registry(_) | QueryCompilerError::Config(_) => {
                ErrorKind::ConfigurationError
            }
        }
    }
}
