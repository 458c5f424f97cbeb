use tracing::{debug, info};

use crate::attributes::{AttributeKey, AttributeValue, ConnectionAttribute, StagedAttributes};
use crate::config::ConnectionConfig;
use crate::driver::{Driver, DriverHandle, ErrorInfo};
use crate::error::SqlBindError;
use crate::quoting::IdentifierQuoter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Defers handle creation until an operation needs one.
///
/// Attributes set while disconnected are staged and replayed, in the order they were first
/// staged, right after the handle is created. Identifier quote attributes live on this layer
/// and are never forwarded to the driver. There is no reconnect: once connected the handle is
/// kept for the lifetime of the value.
pub struct LazyConnection<D: Driver> {
    driver: D,
    config: ConnectionConfig,
    handle: Option<D::Handle>,
    staged: StagedAttributes,
    quoter: IdentifierQuoter,
}

impl<D: Driver> LazyConnection<D> {
    /// Stage the config's attributes without connecting.
    ///
    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` if a configured attribute is invalid.
    pub fn new(driver: D, config: ConnectionConfig) -> Result<Self, SqlBindError> {
        let quoter = IdentifierQuoter::for_dialect(driver.dialect());
        let attributes = config.attributes.clone();
        let mut conn = Self {
            driver,
            config,
            handle: None,
            staged: StagedAttributes::default(),
            quoter,
        };
        for attribute in attributes {
            conn.set_attribute(attribute)?;
        }
        Ok(conn)
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.handle.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    #[must_use]
    pub fn staged_attributes(&self) -> &StagedAttributes {
        &self.staged
    }

    #[must_use]
    pub fn quoter(&self) -> &IdentifierQuoter {
        &self.quoter
    }

    /// Return the live handle, creating it and applying staged attributes on first use.
    ///
    /// # Errors
    /// Returns the driver's connection error, or the error from applying a staged attribute.
    /// In both cases the connection stays disconnected.
    pub fn connect(&mut self) -> Result<&mut D::Handle, SqlBindError> {
        if self.handle.is_none() {
            let mut handle = self.driver.connect(&self.config)?;
            for attribute in self.staged.iter() {
                handle.set_attribute(attribute)?;
            }
            info!(
                dsn = %self.config.dsn,
                attributes = self.staged.len(),
                "connected"
            );
            self.staged.clear();
            self.handle = Some(handle);
        }
        self.handle.as_mut().ok_or_else(|| {
            SqlBindError::ConnectionError("handle missing after connect".to_string())
        })
    }

    /// Apply an attribute now if connected, otherwise stage it.
    ///
    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` before anything is staged or sent to
    /// the driver; driver errors when applying to a live handle.
    pub fn set_attribute(&mut self, attribute: ConnectionAttribute) -> Result<(), SqlBindError> {
        attribute.validate()?;

        if attribute.key.is_identifier_quote() {
            let text = attribute.value.as_text().unwrap_or_default();
            match attribute.key {
                AttributeKey::QuoteNamePrefix => self.quoter.set_prefix(text)?,
                _ => self.quoter.set_suffix(text)?,
            }
            debug!(key = %attribute.key, value = text, "identifier quote updated");
            return Ok(());
        }

        match self.handle.as_mut() {
            Some(handle) => {
                debug!(key = %attribute.key, "applying attribute");
                handle.set_attribute(&attribute)
            }
            None => {
                debug!(key = %attribute.key, "staging attribute");
                self.staged.stage(attribute);
                Ok(())
            }
        }
    }

    /// Read an attribute, connecting first.
    ///
    /// # Errors
    /// Returns connection or driver errors.
    pub fn get_attribute(
        &mut self,
        key: &AttributeKey,
    ) -> Result<Option<AttributeValue>, SqlBindError> {
        if !key.is_identifier_quote() {
            return self.connect()?.get_attribute(key);
        }
        self.connect()?;
        let text = match key {
            AttributeKey::QuoteNamePrefix => self.quoter.prefix(),
            _ => self.quoter.suffix(),
        };
        Ok(Some(AttributeValue::Text(text.to_string())))
    }

    /// # Errors
    /// Returns connection errors.
    pub fn error_code(&mut self) -> Result<String, SqlBindError> {
        Ok(self.connect()?.error_code())
    }

    /// # Errors
    /// Returns connection errors.
    pub fn error_info(&mut self) -> Result<ErrorInfo, SqlBindError> {
        Ok(self.connect()?.error_info())
    }
}

impl<D: Driver> std::fmt::Debug for LazyConnection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyConnection")
            .field("dsn", &self.config.dsn)
            .field("state", &self.state())
            .field("staged", &self.staged)
            .field("quoter", &self.quoter)
            .finish_non_exhaustive()
    }
}
