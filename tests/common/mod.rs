#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use sqlbind::prelude::*;

/// Everything the mock driver saw, shared with the test through an `Rc`.
#[derive(Debug, Default)]
pub struct MockLog {
    pub connects: Cell<usize>,
    pub fail_connect: Cell<bool>,
    pub applied: RefCell<Vec<ConnectionAttribute>>,
    pub prepared: RefCell<Vec<String>>,
    pub bound: RefCell<Vec<(String, SqlValue)>>,
    pub executed: Cell<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    pub log: Rc<MockLog>,
}

impl MockDriver {
    pub fn new() -> (Self, Rc<MockLog>) {
        let driver = Self::default();
        let log = Rc::clone(&driver.log);
        (driver, log)
    }
}

impl Driver for MockDriver {
    type Handle = MockHandle;

    fn connect(&self, config: &ConnectionConfig) -> Result<MockHandle, SqlBindError> {
        if self.log.fail_connect.get() {
            return Err(SqlBindError::ConnectionError(format!(
                "refused {}",
                config.dsn
            )));
        }
        self.log.connects.set(self.log.connects.get() + 1);
        Ok(MockHandle {
            log: Rc::clone(&self.log),
            attributes: HashMap::new(),
            in_transaction: false,
        })
    }
}

#[derive(Debug)]
pub struct MockHandle {
    log: Rc<MockLog>,
    attributes: HashMap<AttributeKey, AttributeValue>,
    in_transaction: bool,
}

impl LiteralQuoter for MockHandle {
    fn quote_literal(&self, value: &SqlValue) -> String {
        AnsiLiteralQuoter.quote_literal(value)
    }
}

impl DriverHandle for MockHandle {
    type Statement<'h> = MockStatement<'h>;

    fn prepare(&self, sql: &str) -> Result<MockStatement<'_>, SqlBindError> {
        if sql.contains("FAIL") {
            return Err(SqlBindError::DriverError(format!("cannot prepare {sql}")));
        }
        self.log.prepared.borrow_mut().push(sql.to_string());
        Ok(MockStatement {
            sql: sql.to_string(),
            handle: self,
            bound: Vec::new(),
            rows_affected: 0,
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), SqlBindError> {
        self.log.prepared.borrow_mut().push(sql.to_string());
        Ok(())
    }

    fn set_attribute(&mut self, attribute: &ConnectionAttribute) -> Result<(), SqlBindError> {
        self.log.applied.borrow_mut().push(attribute.clone());
        self.attributes
            .insert(attribute.key.clone(), attribute.value.clone());
        Ok(())
    }

    fn get_attribute(&self, key: &AttributeKey) -> Result<Option<AttributeValue>, SqlBindError> {
        Ok(self.attributes.get(key).cloned())
    }

    fn error_code(&self) -> String {
        SQLSTATE_OK.to_string()
    }

    fn error_info(&self) -> ErrorInfo {
        ErrorInfo::default()
    }

    fn begin_transaction(&mut self) -> Result<(), SqlBindError> {
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlBindError> {
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlBindError> {
        self.in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn last_insert_id(&self, _sequence: Option<&str>) -> Result<String, SqlBindError> {
        Ok(self.log.executed.get().to_string())
    }
}

/// Returns one row whose columns are the bound placeholders, in bind order.
pub struct MockStatement<'h> {
    sql: String,
    handle: &'h MockHandle,
    bound: Vec<(String, SqlValue)>,
    rows_affected: usize,
}

impl DriverStatement for MockStatement<'_> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn bind_scalar(&mut self, name: &str, value: &SqlValue) -> Result<(), SqlBindError> {
        self.handle
            .log
            .bound
            .borrow_mut()
            .push((name.to_string(), value.clone()));
        self.bound.push((name.to_string(), value.clone()));
        Ok(())
    }

    fn execute(&mut self) -> Result<usize, SqlBindError> {
        let log = &self.handle.log;
        log.executed.set(log.executed.get() + 1);
        self.rows_affected = 1;
        Ok(1)
    }

    fn query(&mut self) -> Result<ResultSet, SqlBindError> {
        let (names, values): (Vec<String>, Vec<SqlValue>) = self.bound.iter().cloned().unzip();
        let mut rows = ResultSet::with_capacity(1);
        rows.set_column_names(Arc::new(names));
        rows.add_row_values(values);
        Ok(rows)
    }

    fn rows_affected(&self) -> usize {
        self.rows_affected
    }
}

pub fn mock_connection() -> (ExtendedConnection<MockDriver>, Rc<MockLog>) {
    let (driver, log) = MockDriver::new();
    let conn = ExtendedConnection::new(driver, ConnectionConfig::new("mock://db"))
        .expect("mock config is valid");
    (conn, log)
}
