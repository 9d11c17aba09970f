//! Unified error type for keyword calls.

use dynasql_compare::RestoreError;
use dynasql_session::RegistryError;
use dynasql_types::{AssertionFailure, UpstreamError};
use thiserror::Error;

/// Any failure a keyword can surface. Messages pass through unchanged.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error(transparent)]
    Restore(#[from] RestoreError),

    /// Engine errors are returned exactly as the engine reported them.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
