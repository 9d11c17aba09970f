//! Query keywords.

use crate::error::LibraryError;
use dynasql_session::{QueryHandle, SessionRegistry};
use dynasql_types::Value;

/// Runs engine commands against a labelled session.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryKeywords;

impl QueryKeywords {
    /// Execute `command` on the session under `label`.
    ///
    /// Lazy result sets are fully materialized into a list before returning.
    pub fn query<H: QueryHandle>(
        &self,
        registry: &mut SessionRegistry<H>,
        label: &str,
        command: &str,
    ) -> Result<Value, LibraryError> {
        let session = registry.switch(label)?;
        let response = session.execute(command)?.materialize()?;
        tracing::debug!("'{}' response:\n{}", command, response);
        Ok(response)
    }
}
