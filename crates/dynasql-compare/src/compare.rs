//! Deep, order-independent comparison of query results against fixtures.

use crate::canonical::{Canonical, Unorderable, sort_by_try};
use dynasql_types::Value;
use std::cmp::Ordering;

/// Outcome of [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    /// The values were not mutually orderable and their canonical
    /// serializations differ. Carries no ordering.
    Unequal,
}

impl Comparison {
    pub fn is_equal(self) -> bool {
        self == Comparison::Equal
    }

    /// Keyword-style result: -1, 0 or 1. `Unequal` reports 1.
    pub fn as_i32(self) -> i32 {
        match self {
            Comparison::Less => -1,
            Comparison::Equal => 0,
            Comparison::Greater | Comparison::Unequal => 1,
        }
    }
}

impl From<Ordering> for Comparison {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Comparison::Less,
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::Greater,
        }
    }
}

/// Compare two values ignoring element order at every depth.
///
/// Top-level sequences are sorted by each element's `order_key` field first,
/// then by natural canonical order. When the elements have no common order
/// the comparison drops to unordered-equality mode and can only answer
/// [`Comparison::Equal`] or [`Comparison::Unequal`].
pub fn compare(a: &Value, b: &Value, order_key: &str) -> Comparison {
    if let (Ok(x), Ok(y)) = (top_level(a, order_key), top_level(b, order_key)) {
        if let Some(ordering) = x.try_cmp(&y) {
            return ordering.into();
        }
    }

    tracing::debug!("values are not mutually orderable, comparing loose canonical forms");
    if Canonical::loose(a).total_cmp(&Canonical::loose(b)).is_eq() {
        Comparison::Equal
    } else {
        Comparison::Unequal
    }
}

/// True iff [`compare`] finds the values equal.
pub fn deep_equal(a: &Value, b: &Value, order_key: &str) -> bool {
    compare(a, b, order_key).is_equal()
}

fn top_level(value: &Value, order_key: &str) -> Result<Canonical, Unorderable> {
    let items = match value {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => items,
        other => return Canonical::of(other),
    };

    let keyed = items
        .iter()
        .map(|item| {
            let key = item.get(order_key).map(Canonical::of).transpose()?;
            Ok((key, Canonical::of(item)?))
        })
        .collect::<Result<Vec<_>, Unorderable>>()?;

    let sorted = sort_by_try(
        keyed,
        |(key_a, a), (key_b, b)| {
            let by_key = match (key_a, key_b) {
                (Some(x), Some(y)) => x.total_cmp(y),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            };
            by_key.then_with(|| a.total_cmp(b))
        },
        |(key_a, a), (key_b, b)| {
            let by_key = match (key_a, key_b) {
                (Some(x), Some(y)) => x.try_cmp(y)?,
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            };
            match by_key {
                Ordering::Equal => a.try_cmp(b),
                unequal => Some(unequal),
            }
        },
    )?;

    Ok(Canonical::Seq(sorted.into_iter().map(|(_, c)| c).collect()))
}
