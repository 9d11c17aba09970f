//! Restoration of tagged JSON envelopes into rich values.

use crate::error::RestoreError;
use bigdecimal::BigDecimal;
use dynasql_types::{Record, Value, tags};
use std::str::FromStr;

/// A JSON object classified by the first tag key it carries.
///
/// Payloads are already restored when an envelope is built, so nested
/// envelopes resolve before their container does.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Bytes(Value),
    Dict(Value),
    Tuple(Value),
    Set(Value),
    Record(Value),
    OrderedDict(Value),
    /// No recognised tag; the object stays a plain mapping.
    Plain(Vec<(String, Value)>),
}

impl Envelope {
    /// Classify an object's entries. Only the highest-priority tag is honored;
    /// any other keys next to it are ignored.
    pub fn classify(mut entries: Vec<(String, Value)>) -> Self {
        if let Some(payload) = take(&mut entries, tags::BYTES) {
            return Envelope::Bytes(payload);
        }
        if let Some(payload) = take(&mut entries, tags::DICT) {
            return Envelope::Dict(payload);
        }
        if let Some(payload) = take(&mut entries, tags::TUPLE) {
            return Envelope::Tuple(payload);
        }
        if let Some(payload) = take(&mut entries, tags::SET) {
            return Envelope::Set(payload);
        }
        if let Some(payload) = take(&mut entries, tags::RECORD) {
            return Envelope::Record(payload);
        }
        if let Some(payload) = take(&mut entries, tags::ORDERED_DICT) {
            return Envelope::OrderedDict(payload);
        }
        Envelope::Plain(entries)
    }

    /// Reconstruct the value this envelope describes.
    pub fn restore(self) -> Result<Value, RestoreError> {
        match self {
            Envelope::Bytes(Value::String(text)) => Ok(Value::Bytes(text.into_bytes())),
            Envelope::Bytes(other) => Err(RestoreError::envelope(
                tags::BYTES,
                format!("expected text, found {}", other.kind()),
            )),
            Envelope::Dict(payload) => Ok(Value::Map(
                pairs(tags::DICT, payload)?.into_iter().collect(),
            )),
            Envelope::Tuple(payload) => Ok(Value::Tuple(sequence(tags::TUPLE, payload)?)),
            Envelope::Set(payload) => Ok(Value::set(sequence(tags::SET, payload)?)),
            Envelope::Record(payload) => record(payload),
            Envelope::OrderedDict(payload) => {
                Ok(Value::ordered_map(pairs(tags::ORDERED_DICT, payload)?))
            }
            Envelope::Plain(entries) => Ok(Value::map(entries)),
        }
    }
}

fn take(entries: &mut Vec<(String, Value)>, tag: &str) -> Option<Value> {
    let pos = entries.iter().position(|(key, _)| key == tag)?;
    Some(entries.swap_remove(pos).1)
}

fn sequence(tag: &'static str, payload: Value) -> Result<Vec<Value>, RestoreError> {
    match payload {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items),
        other => Err(RestoreError::envelope(
            tag,
            format!("expected an array, found {}", other.kind()),
        )),
    }
}

/// Accepts an object or an array of `[key, value]` pairs.
fn pairs(tag: &'static str, payload: Value) -> Result<Vec<(String, Value)>, RestoreError> {
    match payload {
        Value::Map(map) => Ok(map.into_iter().collect()),
        Value::OrderedMap(entries) => Ok(entries),
        Value::List(items) | Value::Tuple(items) => {
            items.into_iter().map(|item| pair(tag, item)).collect()
        }
        other => Err(RestoreError::envelope(
            tag,
            format!("expected pairs, found {}", other.kind()),
        )),
    }
}

fn pair(tag: &'static str, item: Value) -> Result<(String, Value), RestoreError> {
    let entry = match item {
        Value::List(entry) | Value::Tuple(entry) => entry,
        other => {
            return Err(RestoreError::envelope(
                tag,
                format!("expected a [key, value] pair, found {}", other.kind()),
            ));
        }
    };
    let mut entry = entry.into_iter();
    match (entry.next(), entry.next(), entry.next()) {
        (Some(Value::String(key)), Some(value), None) => Ok((key, value)),
        _ => Err(RestoreError::envelope(
            tag,
            "expected a [key, value] pair with a text key",
        )),
    }
}

fn record(payload: Value) -> Result<Value, RestoreError> {
    let tag = tags::RECORD;
    let type_name = payload
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RestoreError::envelope(tag, "missing text 'type'"))?
        .to_string();

    // Field names come as "a b c", "a, b, c" or ["a", "b", "c"].
    let fields: Vec<String> = match payload.get("fields") {
        Some(Value::String(spec)) => spec
            .replace(',', " ")
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        Some(other) => other
            .elements()
            .ok_or_else(|| RestoreError::envelope(tag, "'fields' must be text or an array"))?
            .iter()
            .map(|field| {
                field
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| RestoreError::envelope(tag, "field names must be text"))
            })
            .collect::<Result<_, _>>()?,
        None => return Err(RestoreError::envelope(tag, "missing 'fields'")),
    };

    let values = payload
        .get("values")
        .and_then(Value::elements)
        .ok_or_else(|| RestoreError::envelope(tag, "missing array 'values'"))?
        .to_vec();

    let (field_count, value_count) = (fields.len(), values.len());
    Record::new(type_name, fields, values)
        .map(Value::Record)
        .ok_or_else(|| {
            RestoreError::envelope(
                tag,
                format!("{field_count} fields but {value_count} values"),
            )
        })
}

/// Parse JSON number text exactly, at any precision.
fn parse_decimal(text: &str) -> Result<BigDecimal, RestoreError> {
    BigDecimal::from_str(text).map_err(|_| RestoreError::Number {
        text: text.to_string(),
    })
}

/// Convert a parsed JSON tree into a [`Value`], restoring envelopes bottom-up.
pub fn restore_json(json: serde_json::Value) -> Result<Value, RestoreError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()).map(Value::Number),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(restore_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        serde_json::Value::Object(map) => {
            let entries = map
                .into_iter()
                .map(|(key, value)| Ok((key, restore_json(value)?)))
                .collect::<Result<Vec<_>, RestoreError>>()?;
            Envelope::classify(entries).restore()
        }
    }
}

/// Parse JSON text, reading every number as an exact decimal and restoring
/// tagged envelopes at any depth.
pub fn json_loads(text: &str) -> Result<Value, RestoreError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    restore_json(json)
}

/// Serialize a value back into its tagged JSON form.
pub fn to_json(value: &Value) -> Result<serde_json::Value, RestoreError> {
    Ok(serde_json::to_value(value)?)
}
