//! Live parameter sources for late binding.
//!
//! A statement bound with `bind_param` does not capture a value; it keeps a
//! [`ParamSource`] and reads it when the statement executes.

use crate::value::Value;
use std::sync::{Arc, RwLock};

/// A value read at execution time.
pub trait ParamSource: Send {
    fn current(&self) -> Value;
}

impl<F> ParamSource for F
where
    F: Fn() -> Value + Send,
{
    fn current(&self) -> Value {
        self()
    }
}

/// A shared, mutable cell that can be bound by reference.
///
/// Clones share the same cell, so the caller keeps one clone to update and
/// hands another to `bind_param`.
#[derive(Debug, Clone, Default)]
pub struct Variable {
    cell: Arc<RwLock<Value>>,
}

impl Variable {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            cell: Arc::new(RwLock::new(value.into())),
        }
    }

    /// Replace the held value.
    pub fn set(&self, value: impl Into<Value>) {
        let mut guard = self.cell.write().unwrap_or_else(|e| e.into_inner());
        *guard = value.into();
    }

    /// Snapshot the held value.
    pub fn get(&self) -> Value {
        self.cell.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ParamSource for Variable {
    fn current(&self) -> Value {
        self.get()
    }
}
