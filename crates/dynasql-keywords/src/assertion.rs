//! Assertion keywords for schema dumps, table existence and result sets.

use crate::error::LibraryError;
use crate::sink::{AssertionSink, BuiltinAssertions};
use dynasql_compare::{compare, dumps_equal, json_loads};
use dynasql_session::{QueryHandle, SessionRegistry};
use dynasql_types::{AssertionFailure, Value};

/// Validates engine state and query results.
pub struct AssertionKeywords {
    sink: Box<dyn AssertionSink>,
    order_by: String,
}

impl AssertionKeywords {
    /// `order_by` is the row key used when a keyword call gives none.
    pub fn new(order_by: impl Into<String>) -> Self {
        Self {
            sink: Box::new(BuiltinAssertions),
            order_by: order_by.into(),
        }
    }

    /// Route equality checks through a different assertion sink.
    pub fn with_sink(mut self, sink: Box<dyn AssertionSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    /// Fail unless both schema dumps declare the same pieces in any order.
    pub fn dumps_should_be_equal(&self, dump1: &str, dump2: &str) -> Result<(), LibraryError> {
        if dumps_equal(dump1, dump2) {
            Ok(())
        } else {
            Err(AssertionFailure::SchemaMismatch.into())
        }
    }

    pub fn table_should_exist<H: QueryHandle>(
        &self,
        registry: &mut SessionRegistry<H>,
        label: &str,
        table: &str,
    ) -> Result<(), LibraryError> {
        let session = registry.switch(label)?;
        match session.execute(&format!("DUMP SCHEMA {table}")) {
            Ok(_) => Ok(()),
            Err(err) if err.is_resource_not_found() => Err(AssertionFailure::TableMissing {
                table: table.to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn table_should_not_exist<H: QueryHandle>(
        &self,
        registry: &mut SessionRegistry<H>,
        label: &str,
        table: &str,
    ) -> Result<(), LibraryError> {
        let session = registry.switch(label)?;
        match session.execute(&format!("DUMP SCHEMA {table}")) {
            Ok(_) => Err(AssertionFailure::TableExists {
                table: table.to_string(),
            }
            .into()),
            Err(err) if err.is_resource_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Parse JSON text with exact decimals and tagged envelopes restored.
    pub fn json_loads(&self, text: &str) -> Result<Value, LibraryError> {
        Ok(json_loads(text)?)
    }

    /// Deep compare two lists: -1, 0 or 1.
    pub fn deep_compare(&self, list1: &Value, list2: &Value, order_by: Option<&str>) -> i32 {
        compare(list1, list2, order_by.unwrap_or(&self.order_by)).as_i32()
    }

    pub fn deep_compare_should_be_equal(
        &self,
        list1: &Value,
        list2: &Value,
        order_by: Option<&str>,
    ) -> Result<(), LibraryError> {
        let result = self.deep_compare(list1, list2, order_by);
        self.sink
            .should_be_equal(&Value::from(result), &Value::from(0))?;
        Ok(())
    }

    pub fn list_and_json_should_be_equal(
        &self,
        actual: &Value,
        expected_text: &str,
        order_by: Option<&str>,
    ) -> Result<(), LibraryError> {
        let expected = self.json_loads(expected_text)?;
        self.deep_compare_should_be_equal(actual, &expected, order_by)
    }
}
