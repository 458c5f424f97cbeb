use std::collections::BTreeMap;

use serde::Deserialize;

use crate::attributes::{AttributeKey, AttributeValue, ConnectionAttribute};
use crate::error::SqlBindError;

/// Everything needed to open a driver handle later, plus attributes to apply once it exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub dsn: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Driver-specific options (for SQLite: `mode`).
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: Vec<ConnectionAttribute>,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(dsn: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(dsn)
    }

    /// Parse a config from JSON.
    ///
    /// ```rust
    /// use sqlbind::prelude::*;
    ///
    /// let config = ConnectionConfig::from_json(r#"{
    ///     "dsn": "sqlite::memory:",
    ///     "options": {"mode": "rwc"},
    ///     "attributes": [{"key": "busy_timeout", "value": 500}]
    /// }"#)?;
    /// assert_eq!(config.option("mode"), Some("rwc"));
    /// # Ok::<(), SqlBindError>(())
    /// ```
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` on malformed JSON or an empty DSN.
    pub fn from_json(json: &str) -> Result<Self, SqlBindError> {
        let config: ConnectionConfig = serde_json::from_str(json)?;
        if config.dsn.trim().is_empty() {
            return Err(SqlBindError::ConfigError("dsn must not be empty".into()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

/// Fluent builder for [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            config: ConnectionConfig::new(dsn),
        }
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.options.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: AttributeKey, value: impl Into<AttributeValue>) -> Self {
        self.config
            .attributes
            .push(ConnectionAttribute::new(key, value));
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ErrorMode;

    #[test]
    fn builder_collects_everything() {
        let config = ConnectionConfig::builder("sqlite:/tmp/x.db")
            .credentials("user", "secret")
            .option("mode", "ro")
            .attribute(AttributeKey::ErrorMode, ErrorMode::Warning)
            .finish();
        assert_eq!(config.dsn, "sqlite:/tmp/x.db");
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.option("mode"), Some("ro"));
        assert_eq!(config.attributes.len(), 1);
    }

    #[test]
    fn from_json_rejects_empty_dsn_and_bad_json() {
        assert!(matches!(
            ConnectionConfig::from_json(r#"{"dsn": " "}"#),
            Err(SqlBindError::ConfigError(_))
        ));
        assert!(matches!(
            ConnectionConfig::from_json("{"),
            Err(SqlBindError::ConfigError(_))
        ));
    }

    #[test]
    fn from_json_defaults() {
        let config = ConnectionConfig::from_json(r#"{"dsn": ":memory:"}"#).unwrap();
        assert!(config.username.is_none());
        assert!(config.options.is_empty());
        assert!(config.attributes.is_empty());
    }
}
