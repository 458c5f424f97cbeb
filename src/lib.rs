//! Named-placeholder preprocessing and bind-value management for SQL connections.
//!
//! Statements use `:name` placeholders. Sequence values are expanded inline as quoted,
//! comma-separated literals; scalar values stay as placeholders and are bound by the driver.
//! Text inside quoted literals is never rewritten.
//!
//! ```rust
//! use sqlbind::prelude::*;
//!
//! let mut binds = BindStore::new();
//! binds.bind("ids", vec![1, 2]);
//! binds.bind("name", "o'brien");
//!
//! let out = rewrite("SELECT * FROM t WHERE id IN (:ids) AND name = :name", &binds, &AnsiLiteralQuoter);
//! assert_eq!(out.statement, "SELECT * FROM t WHERE id IN (1, 2) AND name = :name");
//! ```

pub mod attributes;
pub mod bind_store;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod extended;
pub mod prelude;
pub mod profiler;
pub mod quoting;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod translation;
pub mod types;

pub use error::SqlBindError;
pub use extended::ExtendedConnection;
pub use translation::rewrite;
