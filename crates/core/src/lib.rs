//! Shared primitives for all Rust crates in squadsync.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across squadsync crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Stored synchronization settings are missing or malformed.
    ///
    /// A run that hits this error must stop before touching any user.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
