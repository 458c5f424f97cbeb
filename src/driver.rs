//! The narrow capability interface the connection layer needs from a database driver.
//!
//! A driver opens handles; a handle prepares statements, quotes literals and carries
//! attributes and transaction state; a statement binds scalars and executes.

use serde::Serialize;

use crate::attributes::{AttributeKey, AttributeValue, ConnectionAttribute};
use crate::config::ConnectionConfig;
use crate::error::SqlBindError;
use crate::quoting::LiteralQuoter;
use crate::results::ResultSet;
use crate::types::{Dialect, SqlValue};

/// SQLSTATE reported when no error is pending.
pub const SQLSTATE_OK: &str = "00000";

/// Last error reported by a handle: SQLSTATE, driver-specific code, message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub sqlstate: String,
    pub driver_code: Option<i32>,
    pub message: Option<String>,
}

impl Default for ErrorInfo {
    fn default() -> Self {
        Self {
            sqlstate: SQLSTATE_OK.to_string(),
            driver_code: None,
            message: None,
        }
    }
}

impl ErrorInfo {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.sqlstate == SQLSTATE_OK
    }
}

/// Opens handles from a stored configuration.
pub trait Driver {
    type Handle: DriverHandle;

    /// Create a live handle.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConnectionError` if the handle cannot be created.
    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Handle, SqlBindError>;

    /// Dialect used for the default identifier quotes.
    fn dialect(&self) -> Dialect {
        Dialect::Ansi
    }
}

pub trait DriverHandle: LiteralQuoter {
    type Statement<'h>: DriverStatement
    where
        Self: 'h;

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>, SqlBindError>;

    /// Run one or more statements without parameters.
    fn execute_batch(&self, sql: &str) -> Result<(), SqlBindError>;

    fn set_attribute(&mut self, attribute: &ConnectionAttribute) -> Result<(), SqlBindError>;

    fn get_attribute(&self, key: &AttributeKey) -> Result<Option<AttributeValue>, SqlBindError>;

    /// SQLSTATE of the last operation, [`SQLSTATE_OK`] when it succeeded.
    fn error_code(&self) -> String;

    fn error_info(&self) -> ErrorInfo;

    fn begin_transaction(&mut self) -> Result<(), SqlBindError>;

    fn commit(&mut self) -> Result<(), SqlBindError>;

    fn rollback(&mut self) -> Result<(), SqlBindError>;

    fn in_transaction(&self) -> bool;

    fn last_insert_id(&self, sequence: Option<&str>) -> Result<String, SqlBindError>;
}

pub trait DriverStatement {
    /// SQL text the statement was prepared from.
    fn sql(&self) -> &str;

    /// Bind a scalar to the `:name` placeholder.
    fn bind_scalar(&mut self, name: &str, value: &SqlValue) -> Result<(), SqlBindError>;

    /// Execute and return the number of rows affected.
    fn execute(&mut self) -> Result<usize, SqlBindError>;

    /// Execute and collect every row.
    fn query(&mut self) -> Result<ResultSet, SqlBindError>;

    /// Rows affected by the last execution.
    fn rows_affected(&self) -> usize;
}
