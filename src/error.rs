use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlBindError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Attribute validation error: {0}")]
    AttributeValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),
}

impl SqlBindError {
    /// Handle creation failed; never retried by this layer.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }

    #[must_use]
    pub fn is_attribute_validation_error(&self) -> bool {
        matches!(self, Self::AttributeValidationError(_))
    }

    /// Errors reported by the underlying driver during prepare/execute/fetch.
    #[must_use]
    pub fn is_driver_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::SqliteError(_) => true,
            Self::DriverError(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SqlBindError {
    fn from(err: serde_json::Error) -> Self {
        SqlBindError::ConfigError(format!("invalid JSON: {err}"))
    }
}
