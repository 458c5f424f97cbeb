use std::collections::HashMap;

use tracing::debug;

use crate::types::BindValue;

/// Named values accumulated for the next statement.
pub type BindMap = HashMap<String, BindValue>;

/// Accumulates named bind values across calls; cleared once a statement has run.
///
/// ```rust
/// use sqlbind::prelude::*;
///
/// let mut store = BindStore::new();
/// store.bind_values([("a", 1)]);
/// store.bind_values([("b", 2)]);
/// store.bind_values([("a", 3)]);
/// assert_eq!(store.get("a"), Some(&BindValue::from(3)));
/// assert_eq!(store.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindStore {
    values: BindMap,
}

impl BindStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single value; a later bind for the same name wins.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<BindValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Merge many values into the store.
    pub fn bind_values<K, V, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<BindValue>,
    {
        for (name, value) in values {
            self.bind(name, value);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn values(&self) -> &BindMap {
        &self.values
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            debug!(count = self.values.len(), "clearing bind values");
        }
        self.values.clear();
    }
}
