// SQLite module - reference driver for the extended connection
//
// This module is split into several sub-modules:
// - config: DSN parsing and open flags
// - params: Value conversion and literal quoting
// - query: Result extraction and building
// - handle: The live handle and its prepared statements

pub mod config;
pub mod handle;
pub mod params;
pub mod query;

use rusqlite::Connection;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::driver::Driver;
use crate::error::SqlBindError;
use crate::types::Dialect;

pub use config::{OpenMode, SqliteOptions, SqliteTarget};
pub use handle::{SqliteHandle, SqliteStatement};
pub use params::{SqliteLiteralQuoter, to_sqlite_value};
pub use query::build_result_set;

/// Opens `rusqlite` connections from a [`ConnectionConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    type Handle = SqliteHandle;

    fn connect(&self, config: &ConnectionConfig) -> Result<SqliteHandle, SqlBindError> {
        let options = SqliteOptions::from_config(config)?;
        if config.username.is_some() || config.password.is_some() {
            debug!("sqlite ignores connection credentials");
        }

        let flags = options.mode.flags();
        let conn = match &options.target {
            SqliteTarget::Memory => Connection::open_in_memory_with_flags(flags),
            SqliteTarget::File(path) => Connection::open_with_flags(path, flags),
        }
        .map_err(|e| SqlBindError::ConnectionError(format!("failed to open {}: {e}", config.dsn)))?;

        Ok(SqliteHandle::new(conn))
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}
