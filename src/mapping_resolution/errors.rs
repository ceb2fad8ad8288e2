use thiserror::Error;

use crate::sql_statement::StatementBuildError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MappingResolutionError {
    #[error("The type '{type_name}' is not mapped.")]
    UnmappedType { type_name: String },

    #[error("The member '{type_name}.{member}' is not mapped.")]
    UnmappedMember { type_name: String, member: String },

    #[error("The expression '{expression}' is not supported: {reason}")]
    UnsupportedConstruct { expression: String, reason: String },

    #[error("Resolving the select projection changed its type from '{before}' to '{after}'.")]
    ProjectionTypeChanged { before: String, after: String },

    #[error("Invalid resolution state: {0}")]
    InvalidState(String),

    #[error("Statement build error: {0}")]
    StatementBuild(#[from] StatementBuildError),
}

impl MappingResolutionError {
    pub fn unmapped_type(type_name: impl ToString) -> Self {
        MappingResolutionError::UnmappedType {
            type_name: type_name.to_string(),
        }
    }

    pub fn unmapped_member(type_name: impl ToString, member: impl ToString) -> Self {
        MappingResolutionError::UnmappedMember {
            type_name: type_name.to_string(),
            member: member.to_string(),
        }
    }

    pub fn unsupported(expression: impl ToString, reason: impl Into<String>) -> Self {
        MappingResolutionError::UnsupportedConstruct {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}
