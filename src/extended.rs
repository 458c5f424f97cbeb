use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use crate::attributes::{AttributeKey, AttributeValue, ConnectionAttribute};
use crate::bind_store::{BindMap, BindStore};
use crate::config::ConnectionConfig;
use crate::connection::LazyConnection;
use crate::driver::{Driver, DriverHandle, DriverStatement, ErrorInfo};
use crate::error::SqlBindError;
use crate::profiler::{ProfileEntry, Profiler};
use crate::quoting;
use crate::results::{DbRow, ResultSet};
use crate::translation::{Rewritten, rewrite};
use crate::types::{BindValue, SqlValue};

/// Prepared statement type of driver `D`.
pub type StatementOf<'a, D> = <<D as Driver>::Handle as DriverHandle>::Statement<'a>;

/// Pass to the fetch helpers when a statement takes no extra values.
pub const NO_VALUES: [(&str, SqlValue); 0] = [];

struct ProfileSpan {
    function: &'static str,
    started: Instant,
    bind_values: BindMap,
}

/// Connection facade: lazy handle, accumulated bind values, statement rewriting.
///
/// Sequence-valued binds are inlined into the statement text; scalar binds go through the
/// driver's own parameter binding. Bind values are cleared after `exec`, `query`, `perform`
/// or any fetch helper succeeds, but not after a plain `prepare`.
///
/// ```rust
/// # #[cfg(feature = "sqlite")]
/// # fn demo() -> Result<(), sqlbind::SqlBindError> {
/// use sqlbind::prelude::*;
///
/// let mut db = ExtendedConnection::new(SqliteDriver, ConnectionConfig::new("sqlite::memory:"))?;
/// db.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2), (3);")?;
///
/// db.bind_values([("ids", BindValue::from(vec![1, 3])), ("min", BindValue::from(0))]);
/// let ids = db.fetch_col("SELECT id FROM t WHERE id IN (:ids) AND id > :min", NO_VALUES)?;
/// assert_eq!(ids, vec![SqlValue::Int(1), SqlValue::Int(3)]);
/// # Ok(())
/// # }
/// # #[cfg(feature = "sqlite")]
/// # demo().unwrap();
/// ```
pub struct ExtendedConnection<D: Driver> {
    conn: LazyConnection<D>,
    binds: BindStore,
    profiler: Option<Box<dyn Profiler>>,
}

impl<D: Driver> ExtendedConnection<D> {
    /// Create the facade without connecting.
    ///
    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` if a configured attribute is invalid.
    pub fn new(driver: D, config: ConnectionConfig) -> Result<Self, SqlBindError> {
        Ok(Self {
            conn: LazyConnection::new(driver, config)?,
            binds: BindStore::new(),
            profiler: None,
        })
    }

    pub fn set_profiler(&mut self, profiler: impl Profiler + 'static) {
        self.profiler = Some(Box::new(profiler));
    }

    pub fn take_profiler(&mut self) -> Option<Box<dyn Profiler>> {
        self.profiler.take()
    }

    #[must_use]
    pub fn lazy_connection(&self) -> &LazyConnection<D> {
        &self.conn
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Connect now instead of on first use.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConnectionError` or a staged attribute's error.
    pub fn connect(&mut self) -> Result<(), SqlBindError> {
        if self.conn.is_connected() {
            return Ok(());
        }
        self.profiled("connect", |conn| conn.connect().map(|_| ()))
    }

    // ----- bind values -----

    pub fn bind_value(&mut self, name: impl Into<String>, value: impl Into<BindValue>) {
        self.binds.bind(name, value);
    }

    /// Merge values into the store; a later value for the same name wins.
    pub fn bind_values<K, V>(&mut self, values: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
    }

    #[must_use]
    pub fn bind_values_map(&self) -> &BindMap {
        self.binds.values()
    }

    pub fn clear_bind_values(&mut self) {
        self.binds.clear();
    }

    /// Rewrite `sql` against the current bind values without preparing it.
    ///
    /// # Errors
    /// Returns connection errors; literal quoting needs the driver.
    pub fn rewrite<'s>(&mut self, sql: &'s str) -> Result<Rewritten<'s>, SqlBindError> {
        let handle: &D::Handle = self.conn.connect()?;
        Ok(rewrite(sql, &self.binds, handle))
    }

    // ----- statements -----

    /// Rewrite, prepare and bind scalar values. Bind values are kept.
    ///
    /// # Errors
    /// Returns connection errors and driver prepare/bind errors.
    pub fn prepare(&mut self, sql: &str) -> Result<StatementOf<'_, D>, SqlBindError> {
        let span = self.begin_profile("prepare");
        let handle: &D::Handle = match self.conn.connect() {
            Ok(handle) => handle,
            Err(err) => {
                Self::end_profile(&mut self.profiler, span, None);
                return Err(err);
            }
        };

        let rewritten = rewrite(sql, &self.binds, handle);
        let prepared = handle.prepare(&rewritten.statement).and_then(|mut stmt| {
            bind_scalars(&mut stmt, &rewritten.placeholders, &self.binds)?;
            Ok(stmt)
        });
        Self::end_profile(
            &mut self.profiler,
            span,
            Some(rewritten.statement.into_owned()),
        );
        prepared
    }

    /// Merge `values` into the store, then [`prepare`](Self::prepare).
    ///
    /// # Errors
    /// See [`prepare`](Self::prepare).
    pub fn prepare_with_values<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<StatementOf<'_, D>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        self.prepare(sql)
    }

    /// Execute a statement with the current bind values and return rows affected.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn exec(&mut self, sql: &str) -> Result<usize, SqlBindError> {
        self.execute_as("exec", sql)
    }

    /// Merge `values`, then execute and return rows affected.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn perform<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<usize, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        self.execute_as("perform", sql)
    }

    /// Run a query with the current bind values and collect its rows.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn query(&mut self, sql: &str) -> Result<ResultSet, SqlBindError> {
        self.query_as("query", sql)
    }

    /// Run statements without bind values.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlBindError> {
        let span = self.begin_profile("execute_batch");
        let result = self
            .conn
            .connect()
            .and_then(|handle| handle.execute_batch(sql));
        Self::end_profile(&mut self.profiler, span, Some(sql.to_string()));
        result
    }

    fn execute_as(&mut self, function: &'static str, sql: &str) -> Result<usize, SqlBindError> {
        let span = self.begin_profile(function);
        let mut rendered = None;
        let result = self.run_execute(sql, span.is_some(), &mut rendered);
        Self::end_profile(&mut self.profiler, span, rendered);
        result
    }

    fn run_execute(
        &mut self,
        sql: &str,
        capture: bool,
        rendered: &mut Option<String>,
    ) -> Result<usize, SqlBindError> {
        let handle: &D::Handle = self.conn.connect()?;
        let rewritten = rewrite(sql, &self.binds, handle);
        if capture {
            *rendered = Some(rewritten.statement.to_string());
        }
        let mut stmt = handle.prepare(&rewritten.statement)?;
        bind_scalars(&mut stmt, &rewritten.placeholders, &self.binds)?;
        let affected = stmt.execute()?;
        drop(stmt);
        self.binds.clear();
        Ok(affected)
    }

    fn query_as(&mut self, function: &'static str, sql: &str) -> Result<ResultSet, SqlBindError> {
        let span = self.begin_profile(function);
        let mut rendered = None;
        let result = self.run_query(sql, span.is_some(), &mut rendered);
        Self::end_profile(&mut self.profiler, span, rendered);
        result
    }

    fn run_query(
        &mut self,
        sql: &str,
        capture: bool,
        rendered: &mut Option<String>,
    ) -> Result<ResultSet, SqlBindError> {
        let handle: &D::Handle = self.conn.connect()?;
        let rewritten = rewrite(sql, &self.binds, handle);
        if capture {
            *rendered = Some(rewritten.statement.to_string());
        }
        let mut stmt = handle.prepare(&rewritten.statement)?;
        bind_scalars(&mut stmt, &rewritten.placeholders, &self.binds)?;
        let rows = stmt.query()?;
        drop(stmt);
        self.binds.clear();
        Ok(rows)
    }

    // ----- fetch helpers -----

    /// All rows.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_all<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Vec<DbRow>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.fetch_all_with(sql, values, |row| row)
    }

    /// All rows, each passed through `transform`.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_all_with<K, V, T>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
        transform: impl FnMut(DbRow) -> T,
    ) -> Result<Vec<T>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_all", sql)?;
        Ok(rows.into_iter().map(transform).collect())
    }

    /// Rows keyed by the text of their first column; a later duplicate key wins.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_assoc<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<BTreeMap<String, DbRow>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.fetch_assoc_with(sql, values, |row| row)
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_assoc_with<K, V, T>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
        mut transform: impl FnMut(DbRow) -> T,
    ) -> Result<BTreeMap<String, T>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_assoc", sql)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let key = row.get_by_index(0).map(ToString::to_string).unwrap_or_default();
                (key, transform(row))
            })
            .collect())
    }

    /// First column of every row.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_col<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Vec<SqlValue>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.fetch_col_with(sql, values, |value| value)
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_col_with<K, V, T>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
        mut transform: impl FnMut(SqlValue) -> T,
    ) -> Result<Vec<T>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_col", sql)?;
        Ok(rows
            .into_iter()
            .map(|row| transform(first_value(row)))
            .collect())
    }

    /// The first row, if any.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_one<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Option<DbRow>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_one", sql)?;
        Ok(rows.into_iter().next())
    }

    /// First column mapped to second column; a later duplicate key wins.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_pairs<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<BTreeMap<String, SqlValue>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.fetch_pairs_with(sql, values, |value| value)
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_pairs_with<K, V, T>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
        mut transform: impl FnMut(SqlValue) -> T,
    ) -> Result<BTreeMap<String, T>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_pairs", sql)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut values = row.into_values().into_iter();
                let key = values.next().map(|v| v.to_string()).unwrap_or_default();
                let value = values.next().unwrap_or(SqlValue::Null);
                (key, transform(value))
            })
            .collect())
    }

    /// First column of the first row.
    ///
    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn fetch_value<K, V>(
        &mut self,
        sql: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Option<SqlValue>, SqlBindError>
    where
        K: Into<String>,
        V: Into<BindValue>,
    {
        self.binds.bind_values(values);
        let rows = self.query_as("fetch_value", sql)?;
        Ok(rows.into_iter().next().map(first_value))
    }

    // ----- quoting -----

    /// Quote a value with the driver's literal rules; sequences become `a, b, c`.
    ///
    /// # Errors
    /// Returns connection errors.
    pub fn quote(&mut self, value: &BindValue) -> Result<String, SqlBindError> {
        self.with_handle("quote", |handle| Ok(quoting::quote(&*handle, value)))
    }

    #[must_use]
    pub fn quote_name(&self, name: &str) -> String {
        self.conn.quoter().quote_name(name)
    }

    #[must_use]
    pub fn quote_names_in(&self, text: &str) -> String {
        self.conn.quoter().quote_names_in(text)
    }

    // ----- attributes and errors -----

    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError`, or driver errors when connected.
    pub fn set_attribute(
        &mut self,
        key: AttributeKey,
        value: impl Into<AttributeValue>,
    ) -> Result<(), SqlBindError> {
        let attribute = ConnectionAttribute::new(key, value);
        self.profiled("set_attribute", |conn| conn.set_attribute(attribute))
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn get_attribute(
        &mut self,
        key: &AttributeKey,
    ) -> Result<Option<AttributeValue>, SqlBindError> {
        self.profiled("get_attribute", |conn| conn.get_attribute(key))
    }

    /// # Errors
    /// Returns connection errors.
    pub fn error_code(&mut self) -> Result<String, SqlBindError> {
        self.profiled("error_code", LazyConnection::error_code)
    }

    /// # Errors
    /// Returns connection errors.
    pub fn error_info(&mut self) -> Result<ErrorInfo, SqlBindError> {
        self.profiled("error_info", LazyConnection::error_info)
    }

    // ----- transactions -----

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn begin_transaction(&mut self) -> Result<(), SqlBindError> {
        self.with_handle("begin_transaction", <D::Handle as DriverHandle>::begin_transaction)
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn commit(&mut self) -> Result<(), SqlBindError> {
        self.with_handle("commit", <D::Handle as DriverHandle>::commit)
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn rollback(&mut self) -> Result<(), SqlBindError> {
        self.with_handle("rollback", <D::Handle as DriverHandle>::rollback)
    }

    /// # Errors
    /// Returns connection errors.
    pub fn in_transaction(&mut self) -> Result<bool, SqlBindError> {
        self.with_handle("in_transaction", |handle| Ok(handle.in_transaction()))
    }

    /// # Errors
    /// Returns connection errors and driver errors.
    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<String, SqlBindError> {
        self.with_handle("last_insert_id", |handle| handle.last_insert_id(sequence))
    }

    // ----- profiling -----

    fn with_handle<T>(
        &mut self,
        function: &'static str,
        op: impl FnOnce(&mut D::Handle) -> Result<T, SqlBindError>,
    ) -> Result<T, SqlBindError> {
        self.profiled(function, |conn| conn.connect().and_then(op))
    }

    fn profiled<T>(
        &mut self,
        function: &'static str,
        op: impl FnOnce(&mut LazyConnection<D>) -> Result<T, SqlBindError>,
    ) -> Result<T, SqlBindError> {
        let span = self.begin_profile(function);
        let result = op(&mut self.conn);
        Self::end_profile(&mut self.profiler, span, None);
        result
    }

    fn begin_profile(&self, function: &'static str) -> Option<ProfileSpan> {
        let active = self.profiler.as_ref().is_some_and(|p| p.is_active());
        active.then(|| ProfileSpan {
            function,
            started: Instant::now(),
            bind_values: self.binds.values().clone(),
        })
    }

    fn end_profile(
        profiler: &mut Option<Box<dyn Profiler>>,
        span: Option<ProfileSpan>,
        statement: Option<String>,
    ) {
        if let (Some(span), Some(profiler)) = (span, profiler.as_mut()) {
            profiler.record(ProfileEntry {
                duration: span.started.elapsed(),
                function: span.function.to_string(),
                statement,
                bind_values: span.bind_values,
            });
        }
    }
}

impl<D: Driver> std::fmt::Debug for ExtendedConnection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedConnection")
            .field("conn", &self.conn)
            .field("binds", &self.binds)
            .field("profiling", &self.profiler.is_some())
            .finish()
    }
}

/// Bind each remaining scalar placeholder that has a value. Unbound names are left to the
/// driver, which may reject the statement when it runs.
fn bind_scalars<S: DriverStatement>(
    stmt: &mut S,
    placeholders: &[String],
    binds: &BindStore,
) -> Result<(), SqlBindError> {
    for name in placeholders {
        let Some(BindValue::Scalar(value)) = binds.get(name) else {
            debug!(placeholder = %name, "no bind value for placeholder");
            continue;
        };
        stmt.bind_scalar(name, value)?;
    }
    Ok(())
}

fn first_value(row: DbRow) -> SqlValue {
    row.into_values().into_iter().next().unwrap_or(SqlValue::Null)
}
