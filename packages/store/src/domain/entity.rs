//! Core domain models for record storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the unique identifier field every persisted record carries
pub const ID_FIELD: &str = "id";

/// Name of the creation timestamp field
pub const CREATED_AT_FIELD: &str = "created_at";

/// Name of the last-modification timestamp field
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Name of the soft-delete timestamp field (null while the record is live)
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// A scalar or temporal value stored in a record field or bound to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (SQL NULL)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Timestamp in UTC
    Timestamp(DateTime<Utc>),
    /// UTF-8 text
    Text(String),
}

impl Value {
    /// Whether this value is the SQL NULL marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the inner text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Copy the inner timestamp, if this is a temporal value.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(instant) => Some(*instant),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// One entity instance: a mapping from field name to value.
///
/// Fields are kept in lexicographic order, which keeps generated query text
/// deterministic. Once persisted, a record carries an `id` field plus the
/// `created_at`/`updated_at` stamps; `deleted_at` stays null until the record
/// is soft-deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The record's identifier, if present and non-null.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Creation stamp, if present.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field(CREATED_AT_FIELD)
    }

    /// Last-modification stamp, if present.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field(UPDATED_AT_FIELD)
    }

    /// Soft-delete stamp; `None` while the record is live.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_field(DELETED_AT_FIELD)
    }

    fn timestamp_field(&self, name: &str) -> Option<DateTime<Utc>> {
        self.fields.get(name).and_then(Value::as_timestamp)
    }
}
