use std::cell::RefCell;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Statement};
use tracing::{debug, warn};

use super::params::{SqliteLiteralQuoter, to_sqlite_value};
use super::query::build_result_set;
use crate::attributes::{AttributeKey, AttributeValue, ConnectionAttribute, ErrorMode};
use crate::driver::{DriverHandle, DriverStatement, ErrorInfo};
use crate::error::SqlBindError;
use crate::quoting::LiteralQuoter;
use crate::results::ResultSet;
use crate::types::SqlValue;

const SQLSTATE_GENERAL: &str = "HY000";
const SQLSTATE_CONSTRAINT: &str = "23000";

/// A live `SQLite` connection.
///
/// Keeps the last error for [`DriverHandle::error_info`]; every driver call resets it.
pub struct SqliteHandle {
    conn: Connection,
    error_mode: ErrorMode,
    last_error: RefCell<ErrorInfo>,
}

impl SqliteHandle {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            error_mode: ErrorMode::default(),
            last_error: RefCell::new(ErrorInfo::default()),
        }
    }

    /// The underlying `rusqlite` connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn track<T>(&self, result: rusqlite::Result<T>) -> Result<T, SqlBindError> {
        match result {
            Ok(value) => {
                *self.last_error.borrow_mut() = ErrorInfo::default();
                Ok(value)
            }
            Err(err) => {
                let info = error_info_for(&err);
                match self.error_mode {
                    ErrorMode::Silent => {}
                    ErrorMode::Warning => {
                        warn!(sqlstate = %info.sqlstate, code = ?info.driver_code, "sqlite error: {err}");
                    }
                    ErrorMode::Exception => debug!("sqlite error: {err}"),
                }
                *self.last_error.borrow_mut() = info;
                Err(SqlBindError::SqliteError(err))
            }
        }
    }

    fn set_pragma(&self, name: &str, value: &AttributeValue) -> Result<(), SqlBindError> {
        check_pragma_name(name)?;
        let result = match value {
            AttributeValue::Int(i) => self.conn.pragma_update(None, name, i),
            AttributeValue::Bool(b) => self.conn.pragma_update(None, name, b),
            AttributeValue::Text(s) => self.conn.pragma_update(None, name, s),
            AttributeValue::ErrorMode(_) => {
                return Err(SqlBindError::AttributeValidationError(format!(
                    "pragma {name} takes an integer, boolean or text value"
                )));
            }
        };
        self.track(result)
    }

    fn read_pragma(&self, name: &str) -> Result<Option<AttributeValue>, SqlBindError> {
        check_pragma_name(name)?;
        let value = self.track(
            self.conn
                .pragma_query_value(None, name, |row| row.get::<_, Value>(0))
                .optional(),
        )?;
        Ok(value.and_then(|v| match v {
            Value::Null => None,
            Value::Integer(i) => Some(AttributeValue::Int(i)),
            Value::Real(f) => Some(AttributeValue::Text(f.to_string())),
            Value::Text(s) => Some(AttributeValue::Text(s)),
            Value::Blob(b) => Some(AttributeValue::Text(String::from_utf8_lossy(&b).into_owned())),
        }))
    }
}

impl std::fmt::Debug for SqliteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHandle")
            .field("error_mode", &self.error_mode)
            .field("last_error", &self.last_error.borrow())
            .finish_non_exhaustive()
    }
}

impl LiteralQuoter for SqliteHandle {
    fn quote_literal(&self, value: &SqlValue) -> String {
        SqliteLiteralQuoter.quote_literal(value)
    }
}

impl DriverHandle for SqliteHandle {
    type Statement<'h> = SqliteStatement<'h>;

    fn prepare(&self, sql: &str) -> Result<SqliteStatement<'_>, SqlBindError> {
        let stmt = self.track(self.conn.prepare(sql))?;
        Ok(SqliteStatement {
            stmt,
            sql: sql.to_string(),
            handle: self,
            rows_affected: 0,
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), SqlBindError> {
        self.track(self.conn.execute_batch(sql))
    }

    fn set_attribute(&mut self, attribute: &ConnectionAttribute) -> Result<(), SqlBindError> {
        match (&attribute.key, &attribute.value) {
            (AttributeKey::ErrorMode, value) => match value.as_error_mode() {
                Some(mode) => {
                    self.error_mode = mode;
                    Ok(())
                }
                None => Err(SqlBindError::AttributeValidationError(format!(
                    "error_mode expects silent, warning or exception, got {value}"
                ))),
            },
            (AttributeKey::BusyTimeout, AttributeValue::Int(ms)) => {
                let ms = u64::try_from(*ms).map_err(|_| {
                    SqlBindError::AttributeValidationError(format!("busy timeout {ms} is negative"))
                })?;
                self.track(self.conn.busy_timeout(Duration::from_millis(ms)))
            }
            (AttributeKey::Pragma(name), value) => self.set_pragma(name, value),
            (key, _) if key.is_read_only() => Err(SqlBindError::ConfigError(format!(
                "attribute {key} is read-only"
            ))),
            (key, value) => Err(SqlBindError::AttributeValidationError(format!(
                "sqlite does not accept {key} = {value}"
            ))),
        }
    }

    fn get_attribute(&self, key: &AttributeKey) -> Result<Option<AttributeValue>, SqlBindError> {
        match key {
            AttributeKey::ErrorMode => Ok(Some(AttributeValue::ErrorMode(self.error_mode))),
            AttributeKey::BusyTimeout => self.read_pragma("busy_timeout"),
            AttributeKey::Pragma(name) => self.read_pragma(name),
            AttributeKey::DriverName => Ok(Some(AttributeValue::Text("sqlite".to_string()))),
            AttributeKey::ServerVersion => {
                Ok(Some(AttributeValue::Text(rusqlite::version().to_string())))
            }
            AttributeKey::QuoteNamePrefix | AttributeKey::QuoteNameSuffix => Ok(None),
        }
    }

    fn error_code(&self) -> String {
        self.last_error.borrow().sqlstate.clone()
    }

    fn error_info(&self) -> ErrorInfo {
        self.last_error.borrow().clone()
    }

    fn begin_transaction(&mut self) -> Result<(), SqlBindError> {
        self.track(self.conn.execute_batch("BEGIN"))
    }

    fn commit(&mut self) -> Result<(), SqlBindError> {
        self.track(self.conn.execute_batch("COMMIT"))
    }

    fn rollback(&mut self) -> Result<(), SqlBindError> {
        self.track(self.conn.execute_batch("ROLLBACK"))
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn last_insert_id(&self, sequence: Option<&str>) -> Result<String, SqlBindError> {
        if let Some(sequence) = sequence {
            debug!(sequence, "sqlite has no sequences; returning last rowid");
        }
        Ok(self.conn.last_insert_rowid().to_string())
    }
}

/// A prepared `SQLite` statement bound to its handle.
pub struct SqliteStatement<'h> {
    stmt: Statement<'h>,
    sql: String,
    handle: &'h SqliteHandle,
    rows_affected: usize,
}

impl std::fmt::Debug for SqliteStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("sql", &self.sql)
            .field("rows_affected", &self.rows_affected)
            .finish_non_exhaustive()
    }
}

impl DriverStatement for SqliteStatement<'_> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn bind_scalar(&mut self, name: &str, value: &SqlValue) -> Result<(), SqlBindError> {
        let placeholder = format!(":{name}");
        let Some(idx) = self.handle.track(self.stmt.parameter_index(&placeholder))? else {
            return Err(SqlBindError::ParameterError(format!(
                "statement has no parameter {placeholder}"
            )));
        };
        self.handle
            .track(self.stmt.raw_bind_parameter(idx, to_sqlite_value(value)))
    }

    fn execute(&mut self) -> Result<usize, SqlBindError> {
        let affected = self.handle.track(self.stmt.raw_execute())?;
        self.rows_affected = affected;
        Ok(affected)
    }

    fn query(&mut self) -> Result<ResultSet, SqlBindError> {
        let rows = self.handle.track(build_result_set(&mut self.stmt))?;
        self.rows_affected = 0;
        Ok(rows)
    }

    fn rows_affected(&self) -> usize {
        self.rows_affected
    }
}

fn error_info_for(err: &rusqlite::Error) -> ErrorInfo {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => ErrorInfo {
            sqlstate: if failure.code == ErrorCode::ConstraintViolation {
                SQLSTATE_CONSTRAINT
            } else {
                SQLSTATE_GENERAL
            }
            .to_string(),
            driver_code: Some(failure.extended_code),
            message: Some(message.clone().unwrap_or_else(|| failure.to_string())),
        },
        other => ErrorInfo {
            sqlstate: SQLSTATE_GENERAL.to_string(),
            driver_code: None,
            message: Some(other.to_string()),
        },
    }
}

fn check_pragma_name(name: &str) -> Result<(), SqlBindError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SqlBindError::AttributeValidationError(format!(
            "'{name}' is not a pragma name"
        )))
    }
}
