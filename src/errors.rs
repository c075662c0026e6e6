//! Application-level errors (wraps domain errors, adds I/O and config)

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::TreeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type AppResult<T> = Result<T, AppError>;
