use std::path::PathBuf;

use rusqlite::OpenFlags;

use crate::config::ConnectionConfig;
use crate::error::SqlBindError;

/// How the database file is opened, from the `mode` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
    #[default]
    ReadWriteCreate,
}

impl OpenMode {
    /// Parse `ro`, `rw` or `rwc`.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` for any other value.
    pub fn parse(mode: &str) -> Result<Self, SqlBindError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "ro" => Ok(Self::ReadOnly),
            "rw" => Ok(Self::ReadWrite),
            "rwc" => Ok(Self::ReadWriteCreate),
            other => Err(SqlBindError::ConfigError(format!(
                "unknown sqlite mode '{other}', expected ro, rw or rwc"
            ))),
        }
    }

    #[must_use]
    pub fn flags(self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            Self::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            Self::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
            Self::ReadWriteCreate => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

/// Options for opening a `SQLite` handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub target: SqliteTarget,
    pub mode: OpenMode,
}

impl SqliteOptions {
    /// Read the target from the DSN and the open mode from the `mode` option.
    ///
    /// Accepted DSNs: `sqlite::memory:`, `:memory:`, `sqlite:<path>` and a bare `<path>`.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` for an empty path or an unknown mode.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, SqlBindError> {
        let dsn = config.dsn.trim();
        let path = dsn.strip_prefix("sqlite:").unwrap_or(dsn);
        let target = match path {
            "" => {
                return Err(SqlBindError::ConfigError(format!(
                    "sqlite dsn '{}' names no database",
                    config.dsn
                )));
            }
            ":memory:" => SqliteTarget::Memory,
            file => SqliteTarget::File(PathBuf::from(file)),
        };
        let mode = config
            .option("mode")
            .map(OpenMode::parse)
            .transpose()?
            .unwrap_or_default();

        Ok(Self { target, mode })
    }
}
