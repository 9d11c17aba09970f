//! Values returned by queries and restored from JSON fixtures.
//!
//! A [`Value`] is what keywords hand to the tester and what the comparator
//! walks. Numbers are arbitrary-precision decimals so a fixture written as
//! `5.5` never picks up binary floating point noise, and 38-digit engine
//! numbers survive intact.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Envelope tag keys, in the order the restorer checks them.
pub mod tags {
    pub const BYTES: &str = "py/bytes";
    pub const DICT: &str = "py/dict";
    pub const TUPLE: &str = "py/tuple";
    pub const SET: &str = "py/set";
    pub const RECORD: &str = "py/collections.namedtuple";
    pub const ORDERED_DICT: &str = "py/collections.OrderedDict";

    pub const PRIORITY: [&str; 6] = [BYTES, DICT, TUPLE, SET, RECORD, ORDERED_DICT];

    pub fn is_tag(key: &str) -> bool {
        PRIORITY.contains(&key)
    }
}

/// A recursively-defined comparable value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(BigDecimal),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Unique elements; construct through [`Value::set`].
    Set(Vec<Value>),
    Record(Record),
    Map(BTreeMap<String, Value>),
    /// Insertion-ordered mapping with unique keys; construct through [`Value::ordered_map`].
    OrderedMap(Vec<(String, Value)>),
}

/// A named record with positional values, one per field.
#[derive(Debug, Clone)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<String>,
    pub values: Vec<Value>,
}

impl Record {
    /// Build a record. Returns `None` when field and value counts differ.
    pub fn new(type_name: impl Into<String>, fields: Vec<String>, values: Vec<Value>) -> Option<Self> {
        if fields.len() != values.len() {
            return None;
        }
        Some(Self {
            type_name: type_name.into(),
            fields,
            values,
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .position(|f| f == field)
            .map(|i| &self.values[i])
    }
}

impl Value {
    /// Build a set, dropping duplicates while keeping first-seen order.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    /// Build an ordered mapping. A repeated key keeps its first position and
    /// takes the last value.
    pub fn ordered_map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut entries: Vec<(String, Value)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Value::OrderedMap(entries)
    }

    /// Build a plain mapping.
    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a field of a mapping or record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::OrderedMap(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Value::Record(record) => record.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Elements of any sequence-like value (list, tuple, set, record).
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            Value::Record(record) => Some(&record.values),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Record(_) => "record",
            Value::Map(_) => "mapping",
            Value::OrderedMap(_) => "ordered mapping",
        }
    }

    /// Tuples and records compare by their positional values.
    fn positional(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            Value::Record(record) => Some(&record.values),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // Decimal equality is numeric: 5.0 == 5
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::OrderedMap(a), Value::OrderedMap(b)) => a == b,
            (Value::Map(map), Value::OrderedMap(pairs))
            | (Value::OrderedMap(pairs), Value::Map(map)) => {
                pairs.len() == map.len() && pairs.iter().all(|(k, v)| map.get(k) == Some(v))
            }
            _ => match (self.positional(), other.positional()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serialize_decimal(n, serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    S::Error::custom(format_args!("bytes are not valid UTF-8 text: {e}"))
                })?;
                tagged(serializer, tags::BYTES, text)
            }
            Value::List(items) => items.serialize(serializer),
            Value::Tuple(items) => tagged(serializer, tags::TUPLE, items),
            Value::Set(items) => tagged(serializer, tags::SET, items),
            Value::Record(record) => tagged(serializer, tags::RECORD, &RecordPayload(record)),
            // A plain object holding a tag key would be misread on restore.
            Value::Map(map) if map.keys().any(|k| tags::is_tag(k)) => {
                let pairs: Vec<(&String, &Value)> = map.iter().collect();
                tagged(serializer, tags::DICT, &pairs)
            }
            Value::Map(map) => map.serialize(serializer),
            Value::OrderedMap(pairs) => tagged(serializer, tags::ORDERED_DICT, pairs),
        }
    }
}

/// Integral decimals serialize as integers, everything else as exact
/// decimal text.
fn serialize_decimal<S: Serializer>(n: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_integer() {
        if let Some(i) = n.to_i64() {
            return serializer.serialize_i64(i);
        }
        if let Some(i) = n.to_i128() {
            return serializer.serialize_i128(i);
        }
    }
    let number: serde_json::Number = n.to_string().parse().map_err(S::Error::custom)?;
    number.serialize(serializer)
}

fn tagged<S, T>(serializer: S, tag: &str, payload: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, payload)?;
    map.end()
}

struct RecordPayload<'a>(&'a Record);

impl Serialize for RecordPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", &self.0.type_name)?;
        map.serialize_entry("fields", &self.0.fields)?;
        map.serialize_entry("values", &self.0.values)?;
        map.end()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            // Only non-text bytes fail to serialize.
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}
