//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::attributes::{
    AttributeKey, AttributeValue, ConnectionAttribute, ErrorMode, StagedAttributes,
};
pub use crate::bind_store::{BindMap, BindStore};
pub use crate::config::{ConnectionConfig, ConnectionConfigBuilder};
pub use crate::connection::{ConnectionState, LazyConnection};
pub use crate::driver::{Driver, DriverHandle, DriverStatement, ErrorInfo, SQLSTATE_OK};
pub use crate::error::SqlBindError;
pub use crate::extended::{ExtendedConnection, NO_VALUES};
pub use crate::profiler::{MemoryProfiler, ProfileEntry, Profiler};
pub use crate::quoting::{AnsiLiteralQuoter, IdentifierQuoter, LiteralQuoter, quote, quote_list};
pub use crate::results::{DbRow, ResultSet};
pub use crate::translation::{Rewritten, SpanKind, StatementSpan, rewrite, split_spans};
pub use crate::types::{BindValue, Dialect, SqlValue};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteDriver, SqliteHandle, SqliteLiteralQuoter};
