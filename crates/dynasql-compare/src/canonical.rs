//! Canonical forms used for order-independent comparison.

use bigdecimal::BigDecimal;
use dynasql_types::Value;
use std::cmp::Ordering;

/// The fully sorted, type-normalized form of a [`Value`].
///
/// Mappings become key-sorted pairs, every sequence-like value becomes a
/// sorted sequence. [`Canonical::try_cmp`] is partial: values of different
/// shapes (a number and a string, a sequence and a mapping) are not
/// comparable. [`Canonical::total_cmp`] ranks shapes instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    Null,
    Bool(bool),
    Number(BigDecimal),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<Canonical>),
    Pairs(Vec<(String, Canonical)>),
}

/// Raised when a sequence holds elements with no common order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unorderable;

impl Canonical {
    /// Canonicalize a value, sorting every nested sequence and mapping.
    pub fn of(value: &Value) -> Result<Self, Unorderable> {
        Ok(match value {
            Value::Null => Canonical::Null,
            Value::Bool(b) => Canonical::Bool(*b),
            Value::Number(n) => Canonical::Number(n.clone()),
            Value::String(s) => Canonical::String(s.clone()),
            Value::Bytes(b) => Canonical::Bytes(b.clone()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                Canonical::Seq(sort(canonicalize_all(items)?)?)
            }
            Value::Record(record) => Canonical::Seq(sort(canonicalize_all(&record.values)?)?),
            Value::Map(map) => Canonical::Pairs(pairs(map.iter())?),
            Value::OrderedMap(entries) => {
                Canonical::Pairs(pairs(entries.iter().map(|(k, v)| (k, v)))?)
            }
        })
    }

    /// Canonicalize without needing a common order. Sequences are sorted by
    /// [`Canonical::total_cmp`], so mixed content still has a single form.
    pub fn loose(value: &Value) -> Self {
        match value {
            Value::Null => Canonical::Null,
            Value::Bool(b) => Canonical::Bool(*b),
            Value::Number(n) => Canonical::Number(n.clone()),
            Value::String(s) => Canonical::String(s.clone()),
            Value::Bytes(b) => Canonical::Bytes(b.clone()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                Canonical::Seq(loose_sorted(items))
            }
            Value::Record(record) => Canonical::Seq(loose_sorted(&record.values)),
            Value::Map(map) => Canonical::Pairs(loose_pairs(map.iter())),
            Value::OrderedMap(entries) => {
                Canonical::Pairs(loose_pairs(entries.iter().map(|(k, v)| (k, v))))
            }
        }
    }

    /// Total order over every shape. Agrees with [`Canonical::try_cmp`]
    /// wherever that is defined; otherwise null < bool < number < string <
    /// bytes < sequence < mapping.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Canonical::Seq(a), Canonical::Seq(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.total_cmp(y))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Canonical::Pairs(a), Canonical::Pairs(b)) => a
                .iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.total_cmp(vb)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self
                .try_cmp(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Canonical::Null => 0,
            Canonical::Bool(_) => 1,
            Canonical::Number(_) => 2,
            Canonical::String(_) => 3,
            Canonical::Bytes(_) => 4,
            Canonical::Seq(_) => 5,
            Canonical::Pairs(_) => 6,
        }
    }

    /// Three-way comparison, `None` when the two forms are not comparable.
    ///
    /// Sequences and pair lists compare lexicographically; a proper prefix
    /// sorts first.
    pub fn try_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Canonical::Null, Canonical::Null) => Some(Ordering::Equal),
            (Canonical::Bool(a), Canonical::Bool(b)) => Some(a.cmp(b)),
            (Canonical::Number(a), Canonical::Number(b)) => Some(a.cmp(b)),
            (Canonical::String(a), Canonical::String(b)) => Some(a.cmp(b)),
            (Canonical::Bytes(a), Canonical::Bytes(b)) => Some(a.cmp(b)),
            (Canonical::Seq(a), Canonical::Seq(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.try_cmp(y)? {
                        Ordering::Equal => continue,
                        unequal => return Some(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (Canonical::Pairs(a), Canonical::Pairs(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    match ka.cmp(kb) {
                        Ordering::Equal => {}
                        unequal => return Some(unequal),
                    }
                    match va.try_cmp(vb)? {
                        Ordering::Equal => continue,
                        unequal => return Some(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }
}

fn canonicalize_all(items: &[Value]) -> Result<Vec<Canonical>, Unorderable> {
    items.iter().map(Canonical::of).collect()
}

fn pairs<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Result<Vec<(String, Canonical)>, Unorderable> {
    let mut out = entries
        .map(|(k, v)| Ok((k.clone(), Canonical::of(v)?)))
        .collect::<Result<Vec<_>, Unorderable>>()?;
    // Keys are unique, so this is a total order.
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

fn loose_sorted(items: &[Value]) -> Vec<Canonical> {
    let mut out: Vec<Canonical> = items.iter().map(Canonical::loose).collect();
    out.sort_by(Canonical::total_cmp);
    out
}

fn loose_pairs<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Vec<(String, Canonical)> {
    let mut out: Vec<(String, Canonical)> = entries
        .map(|(k, v)| (k.clone(), Canonical::loose(v)))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Sort by `total`, then fail unless every neighbouring pair is comparable
/// under `partial`.
///
/// `partial` must agree with `total` wherever it is defined. Both orders are
/// lexicographic over ranked shapes, so an incomparable pair anywhere in the
/// list leaves an incomparable neighbour pair after sorting.
pub(crate) fn sort_by_try<T>(
    mut items: Vec<T>,
    total: impl Fn(&T, &T) -> Ordering,
    partial: impl Fn(&T, &T) -> Option<Ordering>,
) -> Result<Vec<T>, Unorderable> {
    items.sort_by(&total);
    if items
        .windows(2)
        .all(|pair| partial(&pair[0], &pair[1]).is_some())
    {
        Ok(items)
    } else {
        Err(Unorderable)
    }
}

fn sort(items: Vec<Canonical>) -> Result<Vec<Canonical>, Unorderable> {
    sort_by_try(items, Canonical::total_cmp, Canonical::try_cmp)
}
