//! Data models for review metrics.
//!
//! This module contains the store-agnostic record representation that
//! flows out of the scanners, and the count structures produced by the
//! aggregator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single field value of a scanned record.
///
/// Mirrors the value kinds a key-value table can hold, without tying the
/// rest of the crate to a particular client library.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Number, kept as its decimal text so no precision is lost.
    Number(String),
    /// Text value.
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Ordered list of values.
    List(Vec<FieldValue>),
    /// Nested map of values.
    Map(BTreeMap<String, FieldValue>),
    /// Set of text values.
    TextSet(Vec<String>),
    /// Set of numbers.
    NumberSet(Vec<String>),
    /// Set of byte strings.
    BinarySet(Vec<Vec<u8>>),
}

impl FieldValue {
    /// Returns true for values that count as "nothing there" before any
    /// string coercion: null, empty text, `false`, numeric zero and empty
    /// collections.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => n.trim().parse::<f64>().map(|v| v == 0.0).unwrap_or(false),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Binary(b) => b.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(map) => map.is_empty(),
            FieldValue::TextSet(items) => items.is_empty(),
            FieldValue::NumberSet(items) => items.is_empty(),
            FieldValue::BinarySet(items) => items.is_empty(),
        }
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "0x")?;
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

fn write_joined<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], mut each: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        each(f, item)?;
    }
    write!(f, "]")
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Binary(b) => write_bytes(f, b),
            FieldValue::List(items) => write_joined(f, items, |f, v| write!(f, "{}", v)),
            FieldValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            FieldValue::TextSet(items) | FieldValue::NumberSet(items) => {
                write_joined(f, items, |f, v| write!(f, "{}", v))
            }
            FieldValue::BinarySet(items) => write_joined(f, items, |f, v| write_bytes(f, v)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n.to_string()),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// One entry from a source collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

#[allow(dead_code)] // Builders and accessors used when assembling records by hand
impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drops every field whose name is not listed.
    pub fn retain_fields(&mut self, names: &[String]) {
        self.fields.retain(|name, _| names.iter().any(|n| n == name));
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Review-completion counts for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Number of records scanned.
    pub total: usize,
    /// Records with review content.
    pub reviewed: usize,
    /// Records still awaiting review.
    pub pending: usize,
}

impl MetricsResult {
    /// Share of reviewed records as a whole percentage, rounded to nearest.
    ///
    /// An empty collection reports 0.
    pub fn reviewed_percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.reviewed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Metrics for both collections from a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMetrics {
    /// Chat log collection counts.
    pub chat_logs: MetricsResult,
    /// Feedback log collection counts.
    pub feedback_logs: MetricsResult,
}
