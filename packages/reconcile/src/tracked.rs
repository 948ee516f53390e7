//! Caller-owned memo cell built on [`reconcile`]

use structshare_value::Value;
use tracing::trace;

use crate::reconcile;

/// Outcome of [`Tracked::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The stored value kept its identity; dependent work can be skipped
    Unchanged,
    Changed,
}

impl Change {
    pub fn is_changed(self) -> bool {
        self == Change::Changed
    }
}

/// Holds the last reconciled value of some derived state.
///
/// Each [`update`](Tracked::update) reconciles the freshly computed value
/// against the stored one, so the stored value only changes identity when
/// its content changed.
#[derive(Debug, Clone)]
pub struct Tracked {
    current: Value,
    revision: u64,
}

impl Tracked {
    pub fn new(initial: Value) -> Self {
        Self {
            current: initial,
            revision: 0,
        }
    }

    pub fn get(&self) -> &Value {
        &self.current
    }

    /// Number of updates that reported [`Change::Changed`]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update(&mut self, next: Value) -> Change {
        let reconciled = reconcile(&self.current, &next);
        if Value::ptr_eq(&reconciled, &self.current) {
            return Change::Unchanged;
        }

        self.current = reconciled;
        self.revision += 1;
        trace!(revision = self.revision, "Tracked value changed");
        Change::Changed
    }

    pub fn into_inner(self) -> Value {
        self.current
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(Value::Undefined)
    }
}
