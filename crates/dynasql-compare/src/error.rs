//! Restoration error types.

use thiserror::Error;

/// Errors raised while parsing or restoring a fixture document.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Number '{text}' cannot be represented as a decimal")]
    Number { text: String },

    #[error("Invalid '{tag}' envelope: {message}")]
    InvalidEnvelope { tag: &'static str, message: String },
}

impl RestoreError {
    pub(crate) fn envelope(tag: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            tag,
            message: message.into(),
        }
    }
}
