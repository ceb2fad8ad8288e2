use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatementBuildError {
    #[error("A statement must have a select projection.")]
    MissingSelectProjection,

    #[error("A statement must have data info.")]
    MissingDataInfo,
}
