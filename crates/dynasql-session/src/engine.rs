//! Traits at the seam to the external query engine.

use crate::config::SessionConfig;
use dynasql_types::{UpstreamError, Value};
use std::fmt;

/// A lazily-enumerated result set. Each row may fail while paging.
pub type Rows = Box<dyn Iterator<Item = Result<Value, UpstreamError>>>;

/// What the engine returns for one command.
pub enum QueryResponse {
    /// A scalar or structured result, e.g. a schema dump.
    Value(Value),
    /// Rows from a scan or query, fetched on demand.
    Rows(Rows),
}

impl QueryResponse {
    /// Fully enumerate a result set into a list. Structured values pass through.
    pub fn materialize(self) -> Result<Value, UpstreamError> {
        match self {
            QueryResponse::Value(value) => Ok(value),
            QueryResponse::Rows(rows) => rows.collect::<Result<Vec<_>, _>>().map(Value::List),
        }
    }
}

impl fmt::Debug for QueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResponse::Value(value) => f.debug_tuple("Value").field(value).finish(),
            QueryResponse::Rows(_) => f.write_str("Rows(..)"),
        }
    }
}

/// A connected engine session.
pub trait QueryHandle {
    /// The region the session resolved to. Used as the default label.
    fn region(&self) -> &str;

    /// Execute one command in the engine's query language.
    fn execute(&mut self, command: &str) -> Result<QueryResponse, UpstreamError>;
}

/// Opens engine sessions from a [`SessionConfig`].
pub trait Connector {
    /// A pre-built engine session that replaces credential resolution.
    type Session;
    type Handle: QueryHandle;

    fn connect(
        &self,
        config: &SessionConfig,
        session: Option<Self::Session>,
    ) -> Result<Self::Handle, UpstreamError>;
}
