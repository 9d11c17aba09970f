//! Error hierarchy shared across dynasql crates.

use thiserror::Error;

/// Failures raised by assertion keywords.
///
/// These always surface to the caller and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionFailure {
    #[error("DynamoDBSQLLibraryError: Table schema dumps are different")]
    SchemaMismatch,

    #[error(
        "DynamoDBSQLLibraryError: Table '{table}' does not exist in the requested DynamoDB session"
    )]
    TableMissing { table: String },

    #[error("DynamoDBSQLLibraryError: Table '{table}' exists in the requested DynamoDB session")]
    TableExists { table: String },

    #[error("{actual} != {expected}")]
    NotEqual { actual: String, expected: String },
}

/// An error reported by the external query engine.
///
/// Keywords hand it back unchanged unless they recognise the code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct UpstreamError {
    pub code: String,
    pub message: String,
}

impl UpstreamError {
    /// Engine code for a table that does not exist.
    pub const RESOURCE_NOT_FOUND: &'static str = "ResourceNotFoundException";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_resource_not_found(&self) -> bool {
        self.code == Self::RESOURCE_NOT_FOUND
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_missing_message_names_table() {
        let err = AssertionFailure::TableMissing {
            table: "orders".into(),
        };
        assert_eq!(
            err.to_string(),
            "DynamoDBSQLLibraryError: Table 'orders' does not exist in the requested DynamoDB session"
        );
    }

    #[test]
    fn not_equal_message_has_no_prefix() {
        let err = AssertionFailure::NotEqual {
            actual: "1".into(),
            expected: "0".into(),
        };
        assert_eq!(err.to_string(), "1 != 0");
    }

    #[test]
    fn upstream_not_found_detection() {
        assert!(UpstreamError::new("ResourceNotFoundException", "").is_resource_not_found());
        assert!(!UpstreamError::new("ValidationException", "bad").is_resource_not_found());
    }
}
