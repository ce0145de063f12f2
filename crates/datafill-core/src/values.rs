//! Value representations produced by generators and consumed by connectors.
//!
//! [`FillValue`] is the type-agnostic value a generator emits for one column,
//! and [`Row`] is an insertion-ordered record of column values. Connectors
//! translate both into their native parameter types.

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::fmt;

/// Format used when a date/time value is rendered as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single generated (or fetched) column value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Text value
    Text(String),

    /// Date/time without timezone
    DateTime(NaiveDateTime),
}

impl FillValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a date/time.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl Serialize for FillValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
        }
    }
}

impl From<bool> for FillValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FillValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for FillValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for FillValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FillValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDateTime> for FillValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// Convert a YAML literal (from a value pool) to a `FillValue`.
///
/// Sequences and mappings have no column representation and are kept as
/// their JSON text.
pub fn yaml_to_fill_value(yaml: &YamlValue) -> FillValue {
    match yaml {
        YamlValue::Null => FillValue::Null,
        YamlValue::Bool(b) => FillValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FillValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                FillValue::Float(f)
            } else {
                FillValue::Text(n.to_string())
            }
        }
        YamlValue::String(s) => FillValue::Text(s.clone()),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            let json = serde_json::to_string(yaml).unwrap_or_default();
            FillValue::Text(json)
        }
        YamlValue::Tagged(tagged) => yaml_to_fill_value(&tagged.value),
    }
}

/// Convert a JSON value (as returned by a connector) to a `FillValue`.
pub fn json_to_fill_value(json: &JsonValue) -> FillValue {
    match json {
        JsonValue::Null => FillValue::Null,
        JsonValue::Bool(b) => FillValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FillValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                FillValue::Float(f)
            } else {
                FillValue::Text(n.to_string())
            }
        }
        JsonValue::String(s) => FillValue::Text(s.clone()),
        other => FillValue::Text(other.to_string()),
    }
}

/// A generated row: column values in generation order.
///
/// Generators may read the values already produced for earlier columns of
/// the same row but never modify them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, FillValue)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Set a column value, replacing any previous value for that column.
    pub fn set(&mut self, column: impl Into<String>, value: FillValue) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((column, value)),
        }
    }

    /// Get a column value by name.
    pub fn get(&self, column: &str) -> Option<&FillValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in generation order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FillValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
