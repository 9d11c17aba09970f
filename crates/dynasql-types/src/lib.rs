//! Shared value model and error hierarchy for dynasql.

pub mod error;
pub mod value;

pub use error::{AssertionFailure, ConfigError, UpstreamError};
pub use value::{Record, Value, tags};
