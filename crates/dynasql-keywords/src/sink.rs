//! Assertion sink used by the comparison keywords.

use dynasql_types::{AssertionFailure, Value};

/// Receives "should be equal" checks. Test frameworks plug their own
/// assertion primitive in here.
pub trait AssertionSink {
    fn should_be_equal(&self, actual: &Value, expected: &Value) -> Result<(), AssertionFailure>;
}

/// Default sink: plain [`Value`] equality.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinAssertions;

impl AssertionSink for BuiltinAssertions {
    fn should_be_equal(&self, actual: &Value, expected: &Value) -> Result<(), AssertionFailure> {
        if actual == expected {
            Ok(())
        } else {
            Err(AssertionFailure::NotEqual {
                actual: actual.to_string(),
                expected: expected.to_string(),
            })
        }
    }
}
