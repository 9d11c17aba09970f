//! DynamoDB SQL keyword library.
//!
//! [`DynamoSqlLibrary`] bundles the session, query and assertion keywords
//! behind one façade. The query engine itself is pluggable through the
//! [`Connector`] and [`QueryHandle`](dynasql_session::QueryHandle) traits.
//!
//! ```ignore
//! let config = LibraryConfig::load(CliOverrides::default())?;
//! let mut library = DynamoSqlLibrary::new(connector, &config);
//! library.create_session(SessionConfig::for_region("us-east-1"), None, Some("first"))?;
//! let rows = library.query("first", "SCAN users")?;
//! library.list_and_json_should_be_equal(&rows, fixture, Some("id"))?;
//! ```

pub mod assertion;
pub mod error;
pub mod query;
pub mod session;
pub mod sink;

pub use assertion::AssertionKeywords;
pub use error::LibraryError;
pub use query::QueryKeywords;
pub use session::SessionKeywords;
pub use sink::{AssertionSink, BuiltinAssertions};

use dynasql_config::LibraryConfig;
use dynasql_session::{Connector, SessionConfig};
use dynasql_types::Value;

/// All keywords over a single session registry.
pub struct DynamoSqlLibrary<C: Connector> {
    sessions: SessionKeywords<C>,
    queries: QueryKeywords,
    assertions: AssertionKeywords,
}

impl<C: Connector> DynamoSqlLibrary<C> {
    pub fn new(connector: C, config: &LibraryConfig) -> Self {
        Self {
            sessions: SessionKeywords::new(connector, config),
            queries: QueryKeywords,
            assertions: AssertionKeywords::new(config.order_by.clone()),
        }
    }

    pub fn with_assertion_sink(mut self, sink: Box<dyn AssertionSink>) -> Self {
        self.assertions = self.assertions.with_sink(sink);
        self
    }

    pub fn sessions(&self) -> &SessionKeywords<C> {
        &self.sessions
    }

    pub fn create_session(
        &mut self,
        config: SessionConfig,
        session: Option<C::Session>,
        label: Option<&str>,
    ) -> Result<String, LibraryError> {
        self.sessions.create_session(config, session, label)
    }

    pub fn delete_session(&mut self, label: &str, info_on_fail: bool) -> Result<(), LibraryError> {
        self.sessions.delete_session(label, info_on_fail)
    }

    pub fn delete_all_sessions(&mut self) {
        self.sessions.delete_all_sessions();
    }

    pub fn query(&mut self, label: &str, command: &str) -> Result<Value, LibraryError> {
        self.queries
            .query(self.sessions.registry_mut(), label, command)
    }

    pub fn table_should_exist(&mut self, label: &str, table: &str) -> Result<(), LibraryError> {
        self.assertions
            .table_should_exist(self.sessions.registry_mut(), label, table)
    }

    pub fn table_should_not_exist(&mut self, label: &str, table: &str) -> Result<(), LibraryError> {
        self.assertions
            .table_should_not_exist(self.sessions.registry_mut(), label, table)
    }

    pub fn dumps_should_be_equal(&self, dump1: &str, dump2: &str) -> Result<(), LibraryError> {
        self.assertions.dumps_should_be_equal(dump1, dump2)
    }

    pub fn json_loads(&self, text: &str) -> Result<Value, LibraryError> {
        self.assertions.json_loads(text)
    }

    pub fn deep_compare(&self, list1: &Value, list2: &Value, order_by: Option<&str>) -> i32 {
        self.assertions.deep_compare(list1, list2, order_by)
    }

    pub fn deep_compare_should_be_equal(
        &self,
        list1: &Value,
        list2: &Value,
        order_by: Option<&str>,
    ) -> Result<(), LibraryError> {
        self.assertions
            .deep_compare_should_be_equal(list1, list2, order_by)
    }

    pub fn list_and_json_should_be_equal(
        &self,
        actual: &Value,
        expected_text: &str,
        order_by: Option<&str>,
    ) -> Result<(), LibraryError> {
        self.assertions
            .list_and_json_should_be_equal(actual, expected_text, order_by)
    }
}
