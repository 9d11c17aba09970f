//! Integration test for the keyword façade against an in-memory engine.
//!
//! The mock engine understands two commands: `DUMP SCHEMA <table>` and
//! `SCAN <table>`. A table named `broken` fails with a non-lookup error so
//! that error passthrough can be observed.

use dynasql_config::LibraryConfig;
use dynasql_keywords::{AssertionSink, DynamoSqlLibrary, LibraryError};
use dynasql_session::{
    Connector, DuplicatePolicy, QueryHandle, QueryResponse, RegistryError, SessionConfig,
};
use dynasql_types::{AssertionFailure, UpstreamError, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

const USERS_DUMP: &str = "CREATE TABLE users (id NUMBER HASH KEY, THROUGHPUT (5, 5))";

struct MockSession {
    region: String,
}

#[derive(Default)]
struct MockConnector {
    seen: RefCell<Vec<SessionConfig>>,
}

struct MockHandle {
    region: String,
    schemas: HashMap<String, String>,
    rows: HashMap<String, Vec<Value>>,
}

impl Connector for MockConnector {
    type Session = MockSession;
    type Handle = MockHandle;

    fn connect(
        &self,
        config: &SessionConfig,
        session: Option<MockSession>,
    ) -> Result<MockHandle, UpstreamError> {
        self.seen.borrow_mut().push(config.clone());
        if config.host.as_deref() == Some("unreachable") {
            return Err(UpstreamError::new(
                "EndpointConnectionError",
                "Could not connect to the endpoint URL",
            ));
        }
        let region = session
            .map(|s| s.region)
            .or_else(|| config.region.clone())
            .unwrap_or_else(|| "us-east-1".to_string());

        let users = dynasql_compare::json_loads(
            r#"[{"id": 2, "name": "bob", "score": 7.25}, {"id": 1, "name": "alice", "score": 9.5}]"#,
        )
        .unwrap();
        Ok(MockHandle {
            region,
            schemas: HashMap::from([("users".to_string(), USERS_DUMP.to_string())]),
            rows: HashMap::from([("users".to_string(), users.elements().unwrap().to_vec())]),
        })
    }
}

impl QueryHandle for MockHandle {
    fn region(&self) -> &str {
        &self.region
    }

    fn execute(&mut self, command: &str) -> Result<QueryResponse, UpstreamError> {
        if let Some(table) = command.strip_prefix("DUMP SCHEMA ") {
            if table == "broken" {
                return Err(UpstreamError::new("AccessDeniedException", "not authorized"));
            }
            return match self.schemas.get(table) {
                Some(dump) => Ok(QueryResponse::Value(Value::from(dump.as_str()))),
                None => Err(UpstreamError::new(
                    UpstreamError::RESOURCE_NOT_FOUND,
                    "Requested resource not found",
                )),
            };
        }
        if let Some(table) = command.strip_prefix("SCAN ") {
            let rows = self.rows.get(table).cloned().unwrap_or_default();
            return Ok(QueryResponse::Rows(Box::new(rows.into_iter().map(Ok))));
        }
        Err(UpstreamError::new("ValidationException", "unsupported command"))
    }
}

fn library() -> DynamoSqlLibrary<MockConnector> {
    DynamoSqlLibrary::new(MockConnector::default(), &LibraryConfig::default())
}

fn library_with(config: LibraryConfig) -> DynamoSqlLibrary<MockConnector> {
    DynamoSqlLibrary::new(MockConnector::default(), &config)
}

#[test]
fn create_session_returns_explicit_label() {
    let mut lib = library();
    let label = lib
        .create_session(SessionConfig::for_region("us-west-2"), None, Some("first"))
        .unwrap();
    assert_eq!(label, "first");
    assert_eq!(lib.sessions().registry().len(), 1);
}

#[test]
fn label_defaults_to_requested_region() {
    let mut lib = library();
    let label = lib
        .create_session(SessionConfig::for_region("us-west-2"), None, None)
        .unwrap();
    assert_eq!(label, "us-west-2");
}

#[test]
fn label_defaults_to_resolved_region() {
    let mut lib = library();
    let session = MockSession {
        region: "ap-south-1".to_string(),
    };
    let label = lib
        .create_session(SessionConfig::default(), Some(session), None)
        .unwrap();
    assert_eq!(label, "ap-south-1");
}

#[test]
fn configured_default_region_is_applied() {
    let mut lib = library_with(LibraryConfig {
        default_region: Some("eu-west-1".to_string()),
        ..LibraryConfig::default()
    });
    let label = lib
        .create_session(SessionConfig::default(), None, None)
        .unwrap();
    assert_eq!(label, "eu-west-1");

    let seen = lib.sessions().connector().seen.borrow();
    assert_eq!(seen[0].region.as_deref(), Some("eu-west-1"));
}

#[test]
fn duplicate_label_is_rejected_by_default() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("Oregon"))
        .unwrap();
    let err = lib
        .create_session(SessionConfig::default(), None, Some("oregon "))
        .unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Registry(RegistryError::DuplicateLabel { .. })
    ));
}

#[test]
fn duplicate_label_replaces_under_replace_policy() {
    let mut lib = library_with(LibraryConfig {
        duplicate_labels: DuplicatePolicy::Replace,
        ..LibraryConfig::default()
    });
    lib.create_session(SessionConfig::for_region("us-west-2"), None, Some("main"))
        .unwrap();
    lib.create_session(SessionConfig::for_region("eu-west-1"), None, Some("main"))
        .unwrap();

    let registry = lib.sessions().registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("main").unwrap().region(), "eu-west-1");
}

#[test]
fn connection_failure_is_passed_through() {
    let mut lib = library();
    let config = SessionConfig {
        host: Some("unreachable".to_string()),
        ..SessionConfig::default()
    };
    let err = lib.create_session(config, None, Some("x")).unwrap_err();
    assert!(matches!(err, LibraryError::Upstream(ref e) if e.code == "EndpointConnectionError"));
    assert!(lib.sessions().registry().is_empty());
}

#[test]
fn deleted_session_cannot_be_queried() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("first"))
        .unwrap();
    lib.delete_session("first", false).unwrap();

    let err = lib.query("first", "SCAN users").unwrap_err();
    assert_eq!(err.to_string(), "Non-existing index or alias 'first'.");
}

#[test]
fn deleting_missing_session_honours_info_on_fail() {
    let mut lib = library();
    assert!(lib.delete_session("nope", true).is_ok());
    assert!(matches!(
        lib.delete_session("nope", false),
        Err(LibraryError::Registry(RegistryError::NotFound { .. }))
    ));
}

#[test]
fn delete_all_sessions_clears_indices() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("a"))
        .unwrap();
    lib.create_session(SessionConfig::default(), None, Some("b"))
        .unwrap();
    assert!(lib.query("1", "SCAN users").is_ok());

    lib.delete_all_sessions();
    assert!(lib.query("1", "SCAN users").is_err());
    assert!(lib.sessions().registry().list().is_empty());
}

#[test]
fn query_materializes_rows_and_matches_fixture() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("db"))
        .unwrap();
    let rows = lib.query("db", "SCAN users").unwrap();
    assert_eq!(rows.elements().map(<[Value]>::len), Some(2));

    lib.list_and_json_should_be_equal(
        &rows,
        r#"[
            {"id": 1, "name": "alice", "score": 9.5},
            {"id": 2, "name": "bob", "score": 7.25}
        ]"#,
        None,
    )
    .unwrap();
}

#[test]
fn query_error_is_passed_through() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("db"))
        .unwrap();
    let err = lib.query("db", "DROP EVERYTHING").unwrap_err();
    assert_eq!(err.to_string(), "ValidationException: unsupported command");
}

#[test]
fn table_existence_checks() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("db"))
        .unwrap();

    lib.table_should_exist("db", "users").unwrap();
    lib.table_should_not_exist("db", "orders").unwrap();

    let err = lib.table_should_exist("db", "orders").unwrap_err();
    assert_eq!(
        err.to_string(),
        "DynamoDBSQLLibraryError: Table 'orders' does not exist in the requested DynamoDB session"
    );
    assert!(matches!(
        lib.table_should_not_exist("db", "users"),
        Err(LibraryError::Assertion(AssertionFailure::TableExists { .. }))
    ));
}

#[test]
fn table_check_passes_other_engine_errors_through() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("db"))
        .unwrap();

    for result in [
        lib.table_should_exist("db", "broken"),
        lib.table_should_not_exist("db", "broken"),
    ] {
        assert!(matches!(
            result,
            Err(LibraryError::Upstream(ref e)) if e.code == "AccessDeniedException"
        ));
    }
}

#[test]
fn schema_dump_from_engine_compares_to_reordered_dump() {
    let mut lib = library();
    lib.create_session(SessionConfig::default(), None, Some("db"))
        .unwrap();
    let dump = lib.query("db", "DUMP SCHEMA users").unwrap();

    lib.dumps_should_be_equal(
        dump.as_str().unwrap(),
        "CREATE TABLE users (THROUGHPUT (5, 5), id NUMBER HASH KEY)",
    )
    .unwrap();
    assert!(matches!(
        lib.dumps_should_be_equal(dump.as_str().unwrap(), "CREATE TABLE users (id STRING HASH KEY)"),
        Err(LibraryError::Assertion(AssertionFailure::SchemaMismatch))
    ));
}

#[test]
fn deep_compare_uses_configured_order_key() {
    let lib = library_with(LibraryConfig {
        order_by: "key".to_string(),
        ..LibraryConfig::default()
    });
    let a = lib.json_loads(r#"[{"key": 5.5}, {"key": 5.4}]"#).unwrap();
    let b = lib.json_loads(r#"[{"key": 5.4}, {"key": 5.5}]"#).unwrap();
    let longer = lib
        .json_loads(r#"[{"key": 5.4}, {"key": 5.5}, {"key": 5.6}]"#)
        .unwrap();

    assert_eq!(lib.deep_compare(&a, &b, None), 0);
    assert_eq!(lib.deep_compare(&a, &longer, None), -1);
    assert_eq!(lib.deep_compare(&longer, &a, None), 1);
    lib.deep_compare_should_be_equal(&a, &b, None).unwrap();
}

struct RecordingSink {
    calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl AssertionSink for RecordingSink {
    fn should_be_equal(&self, actual: &Value, expected: &Value) -> Result<(), AssertionFailure> {
        self.calls
            .borrow_mut()
            .push((actual.to_string(), expected.to_string()));
        Err(AssertionFailure::NotEqual {
            actual: "custom".to_string(),
            expected: "sink".to_string(),
        })
    }
}

#[test]
fn custom_sink_receives_comparison_result() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let lib = library().with_assertion_sink(Box::new(RecordingSink {
        calls: Rc::clone(&calls),
    }));
    let rows = Value::List(vec![Value::map([("id", Value::from(1))])]);

    let err = lib
        .list_and_json_should_be_equal(&rows, r#"[{"id": 1}]"#, None)
        .unwrap_err();
    assert_eq!(err.to_string(), "custom != sink");
    assert_eq!(*calls.borrow(), vec![("0".to_string(), "0".to_string())]);
}

/// Collects formatted log lines for assertions.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn creation_is_logged_even_when_registration_fails() {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut lib = library();
        lib.create_session(SessionConfig::default(), None, Some("dup"))
            .unwrap();
        assert!(lib
            .create_session(SessionConfig::default(), None, Some("dup"))
            .is_err());
    });

    let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert_eq!(logs.matches("Creating DynamoDB session: dup").count(), 2);
}
