use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    #[error("Method '{method}' is annotated with {count} transformer attributes; at most one is allowed.")]
    AmbiguousTransformerAttributes { method: String, count: usize },
}
