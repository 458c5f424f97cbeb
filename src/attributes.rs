use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SqlBindError;
use crate::quoting::{QuoteSide, validate_quote_chars};

/// How loudly the driver reports its own errors. Errors are always returned either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Return errors without logging.
    Silent,
    /// Return errors and log each one at `warn`.
    Warning,
    /// Return errors.
    #[default]
    Exception,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorMode::Silent => "silent",
            ErrorMode::Warning => "warning",
            ErrorMode::Exception => "exception",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    ErrorMode,
    /// Handled by the connection layer; never sent to the driver.
    QuoteNamePrefix,
    /// Handled by the connection layer; never sent to the driver.
    QuoteNameSuffix,
    /// Busy timeout in milliseconds.
    BusyTimeout,
    /// Read-only.
    DriverName,
    /// Read-only.
    ServerVersion,
    /// Driver-specific named setting (an SQLite `PRAGMA`).
    Pragma(String),
}

impl AttributeKey {
    #[must_use]
    pub fn is_identifier_quote(&self) -> bool {
        matches!(self, AttributeKey::QuoteNamePrefix | AttributeKey::QuoteNameSuffix)
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, AttributeKey::DriverName | AttributeKey::ServerVersion)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::ErrorMode => f.write_str("error_mode"),
            AttributeKey::QuoteNamePrefix => f.write_str("quote_name_prefix"),
            AttributeKey::QuoteNameSuffix => f.write_str("quote_name_suffix"),
            AttributeKey::BusyTimeout => f.write_str("busy_timeout"),
            AttributeKey::DriverName => f.write_str("driver_name"),
            AttributeKey::ServerVersion => f.write_str("server_version"),
            AttributeKey::Pragma(name) => write!(f, "pragma {name}"),
        }
    }
}

/// Untagged, so every JSON string lands in `Text`; `as_error_mode` reads a mode back out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Text(String),
    ErrorMode(ErrorMode),
}

impl AttributeValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let AttributeValue::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }

    /// The mode itself, or text naming one in any case.
    #[must_use]
    pub fn as_error_mode(&self) -> Option<ErrorMode> {
        match self {
            AttributeValue::ErrorMode(mode) => Some(*mode),
            AttributeValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "silent" => Some(ErrorMode::Silent),
                "warning" => Some(ErrorMode::Warning),
                "exception" => Some(ErrorMode::Exception),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let AttributeValue::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::ErrorMode(mode) => write!(f, "{mode}"),
            AttributeValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<ErrorMode> for AttributeValue {
    fn from(mode: ErrorMode) -> Self {
        AttributeValue::ErrorMode(mode)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// A connection setting, staged until a handle exists and then applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionAttribute {
    pub key: AttributeKey,
    pub value: AttributeValue,
}

impl ConnectionAttribute {
    #[must_use]
    pub fn new(key: AttributeKey, value: impl Into<AttributeValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Check the value against its key before it is staged or applied.
    ///
    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` for blank identifier quotes, a
    /// non-mode value for `ErrorMode`, or a negative `BusyTimeout`.
    pub fn validate(&self) -> Result<(), SqlBindError> {
        let invalid = |expected: &str| {
            Err(SqlBindError::AttributeValidationError(format!(
                "{} expects {expected}, got {:?}",
                self.key, self.value
            )))
        };
        match (&self.key, &self.value) {
            (AttributeKey::QuoteNamePrefix, AttributeValue::Text(text)) => {
                validate_quote_chars(QuoteSide::Prefix, text)
            }
            (AttributeKey::QuoteNameSuffix, AttributeValue::Text(text)) => {
                validate_quote_chars(QuoteSide::Suffix, text)
            }
            (AttributeKey::QuoteNamePrefix | AttributeKey::QuoteNameSuffix, _) => {
                invalid("a non-blank string")
            }
            (AttributeKey::ErrorMode, value) if value.as_error_mode().is_some() => Ok(()),
            (AttributeKey::ErrorMode, _) => invalid("silent, warning or exception"),
            (AttributeKey::BusyTimeout, AttributeValue::Int(ms)) if *ms >= 0 => Ok(()),
            (AttributeKey::BusyTimeout, _) => invalid("a non-negative millisecond count"),
            _ => Ok(()),
        }
    }
}

/// Attributes recorded before a handle exists. Restaging a key overwrites it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedAttributes {
    entries: Vec<ConnectionAttribute>,
}

impl StagedAttributes {
    pub fn stage(&mut self, attribute: ConnectionAttribute) {
        match self.entries.iter_mut().find(|e| e.key == attribute.key) {
            Some(existing) => existing.value = attribute.value,
            None => self.entries.push(attribute),
        }
    }

    #[must_use]
    pub fn get(&self, key: &AttributeKey) -> Option<&AttributeValue> {
        self.entries.iter().find(|e| &e.key == key).map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionAttribute> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
