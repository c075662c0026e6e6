//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::domain::TreeError;
use crate::errors::AppError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    App(#[from] AppError),
}

impl From<TreeError> for CliError {
    fn from(e: TreeError) -> Self {
        CliError::App(AppError::Tree(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::App(e) => match e {
                AppError::Config { .. } => crate::exitcode::CONFIG,
                AppError::Io { .. } => crate::exitcode::NOINPUT,
                AppError::Json(_) => crate::exitcode::DATAERR,
                AppError::Tree(TreeError::InvalidDocument(_)) => crate::exitcode::DATAERR,
                AppError::Tree(_) => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_errors_when_mapped_then_use_sysexits_codes() {
        assert_eq!(
            CliError::from(TreeError::InvalidDocument("x".into())).exit_code(),
            crate::exitcode::DATAERR
        );
        assert_eq!(
            CliError::from(TreeError::LeafCountMismatch {
                expected: 1,
                actual: 0
            })
            .exit_code(),
            crate::exitcode::SOFTWARE
        );
        assert_eq!(
            CliError::App(AppError::Config {
                message: "bad".into()
            })
            .exit_code(),
            crate::exitcode::CONFIG
        );
    }
}
