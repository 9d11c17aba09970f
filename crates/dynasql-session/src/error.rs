//! Registry error types.

use thiserror::Error;

/// Errors from session registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Non-existing index or alias '{label}'.")]
    NotFound { label: String },

    #[error("Session label '{label}' is already in use.")]
    DuplicateLabel { label: String },

    #[error("Session label must not be empty.")]
    EmptyLabel,

    #[error("No sessions.")]
    NoCurrent,
}
