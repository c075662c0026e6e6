//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised by flattening, unflattening and spec handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("leaf count mismatch: spec expects {expected} leaves, got {actual}")]
    LeafCountMismatch { expected: usize, actual: usize },

    #[error("malformed tree spec: {0}")]
    MalformedSpec(String),

    #[error("invalid tree document: {0}")]
    InvalidDocument(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
