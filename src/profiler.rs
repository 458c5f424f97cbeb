use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use crate::bind_store::BindMap;

/// Timing and statement metadata for one facade call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub duration: Duration,
    pub function: String,
    /// Rendered statement, or `None` if the call failed before preparing one.
    pub statement: Option<String>,
    /// Bind values as they were when the call began.
    pub bind_values: BindMap,
}

impl ProfileEntry {
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Receives a [`ProfileEntry`] at the end of each call while active.
pub trait Profiler {
    fn is_active(&self) -> bool;

    fn record(&mut self, entry: ProfileEntry);
}

/// Share a profiler with the connection while keeping a handle to read it back.
impl<P: Profiler + ?Sized> Profiler for Rc<RefCell<P>> {
    fn is_active(&self) -> bool {
        self.borrow().is_active()
    }

    fn record(&mut self, entry: ProfileEntry) {
        self.borrow_mut().record(entry);
    }
}

/// Keeps every entry in memory.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use sqlbind::prelude::*;
///
/// let profiler = Rc::new(RefCell::new(MemoryProfiler::new()));
/// profiler.borrow_mut().set_active(true);
/// assert!(profiler.is_active());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProfiler {
    active: bool,
    profiles: Vec<ProfileEntry>,
}

impl MemoryProfiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[must_use]
    pub fn profiles(&self) -> &[ProfileEntry] {
        &self.profiles
    }

    pub fn reset(&mut self) {
        self.profiles.clear();
    }
}

impl Profiler for MemoryProfiler {
    fn is_active(&self) -> bool {
        self.active
    }

    fn record(&mut self, entry: ProfileEntry) {
        trace!(
            function = %entry.function,
            duration_us = entry.duration.as_micros(),
            statement = entry.statement.as_deref().unwrap_or(""),
            "profile"
        );
        self.profiles.push(entry);
    }
}
