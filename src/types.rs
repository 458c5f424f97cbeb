use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Scalar values that can be bound to a placeholder or read back from a row.
///
/// ```rust
/// use sqlbind::prelude::*;
///
/// let values = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, always treated as one opaque scalar
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(value) => Some(*value),
            SqlValue::Int(1) => Some(true),
            SqlValue::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            SqlValue::Timestamp(value) => Some(*value),
            SqlValue::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// Raw rendering, without any SQL quoting. Used for map keys and pragma values.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Bool(b) => write!(f, "{}", i64::from(*b)),
            SqlValue::Timestamp(dt) => write!(f, "{}", dt.format("%F %T%.f")),
            SqlValue::Null => Ok(()),
            SqlValue::JSON(json) => write!(f, "{json}"),
            SqlValue::Blob(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Converts a JSON scalar to the closest `SqlValue`. Arrays and objects stay opaque.
impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SqlValue::Null,
            JsonValue::Bool(b) => SqlValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n.as_f64().map_or(SqlValue::JSON(JsonValue::Number(n)), SqlValue::Float),
            },
            JsonValue::String(s) => SqlValue::Text(s),
            other => SqlValue::JSON(other),
        }
    }
}

/// A value in the bind store: either one scalar or a sequence of scalars.
///
/// Sequences are rendered inline as a quoted, comma-separated list; scalars are
/// left to the driver's own parameter binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BindValue {
    Scalar(SqlValue),
    Sequence(Vec<SqlValue>),
}

impl BindValue {
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, BindValue::Sequence(_))
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&SqlValue> {
        if let BindValue::Scalar(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[SqlValue]> {
        if let BindValue::Sequence(values) = self {
            Some(values)
        } else {
            None
        }
    }
}

impl From<SqlValue> for BindValue {
    fn from(value: SqlValue) -> Self {
        BindValue::Scalar(value)
    }
}

macro_rules! scalar_bind_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for BindValue {
                fn from(value: $ty) -> Self {
                    BindValue::Scalar(SqlValue::from(value))
                }
            }
        )*
    };
}

scalar_bind_from!(i64, i32, f64, bool, &str, String, NaiveDateTime);

impl<T: Into<SqlValue>> From<Vec<T>> for BindValue {
    fn from(values: Vec<T>) -> Self {
        BindValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SqlValue> + Clone> From<&[T]> for BindValue {
    fn from(values: &[T]) -> Self {
        BindValue::Sequence(values.iter().cloned().map(Into::into).collect())
    }
}

/// A top-level JSON array becomes a sequence; its elements are converted one level
/// deep only, so a nested array is kept as a single opaque `JSON` scalar.
impl From<JsonValue> for BindValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => {
                BindValue::Sequence(items.into_iter().map(SqlValue::from).collect())
            }
            other => BindValue::Scalar(SqlValue::from(other)),
        }
    }
}

/// Target dialect; decides the default identifier quote pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// ANSI double-quoted identifiers
    #[default]
    Ansi,
    /// MySQL backticks
    Mysql,
    /// SQL Server brackets
    Sqlsrv,
    /// `SQLite` (ANSI style)
    Sqlite,
    /// `PostgreSQL` (ANSI style)
    Postgres,
}

impl Dialect {
    /// Identifier quote prefix and suffix for this dialect.
    #[must_use]
    pub fn identifier_quotes(self) -> (&'static str, &'static str) {
        match self {
            Dialect::Ansi | Dialect::Sqlite | Dialect::Postgres => ("\"", "\""),
            Dialect::Mysql => ("`", "`"),
            Dialect::Sqlsrv => ("[", "]"),
        }
    }
}
