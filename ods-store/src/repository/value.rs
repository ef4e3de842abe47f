//! SQL-bindable value model
//!
//! Every argument that reaches a positional placeholder is carried as a
//! [`SqlValue`], so the builder can hand the engine a homogeneous argument
//! vector regardless of the column types involved.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A single value bound to a `$n` placeholder.
///
/// Composite values (maps, sequences, nested records) are stored in a single
/// JSONB column and travel as [`SqlValue::Json`]; build one with
/// [`SqlValue::json`].
///
/// # Example
///
/// ```rust
/// use ods_store::repository::SqlValue;
///
/// let text: SqlValue = "active".into();
/// let count: SqlValue = 42_i64.into();
/// assert_eq!(text, SqlValue::Text("active".to_string()));
/// assert_eq!(count, SqlValue::Int(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Text value
    Text(String),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// UUID value
    Uuid(Uuid),
    /// Timestamp with time zone, passed through verbatim
    Timestamp(DateTime<Utc>),
    /// JSON document, bound as JSONB
    Json(serde_json::Value),
    /// Explicit NULL
    Null,
}

impl SqlValue {
    /// Serialize a composite value into a [`SqlValue::Json`].
    ///
    /// Serialization failures are surfaced to the caller rather than being
    /// swallowed into a NULL.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i16> for SqlValue {
    fn from(n: i16) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for SqlValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Uuid> for SqlValue {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
