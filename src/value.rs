//! Native value representations
//!
//! Default values are opaque to the descriptor model except for their
//! representation, which the compatibility predicate inspects.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::kind::Representation;

/// A concrete value, as a default for an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Record(BTreeMap<String, Value>),
    Array(Vec<Value>),
    String(String),
    Bytes(Vec<u8>),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Calendar date without a time zone
    Date(NaiveDate),
    /// Instant on the UTC timeline
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// The native representation of this value, `None` for `Null`
    pub fn representation(&self) -> Option<Representation> {
        let repr = match self {
            Value::Null => return None,
            Value::Record(_) => Representation::Record,
            Value::Array(_) => Representation::Array,
            Value::String(_) => Representation::String,
            Value::Bytes(_) => Representation::Bytes,
            Value::Int(_) => Representation::Int,
            Value::Long(_) => Representation::Long,
            Value::Float(_) => Representation::Float,
            Value::Double(_) => Representation::Double,
            Value::Boolean(_) => Representation::Boolean,
            Value::Date(_) => Representation::Date,
            Value::Timestamp(_) => Representation::Timestamp,
        };
        Some(repr)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}L", v),
            Value::Float(v) => write!(f, "{}f", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Array(items) => write!(f, "[{} items]", items.len()),
            Value::Record(fields) => write!(f, "{{{} fields}}", fields.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
