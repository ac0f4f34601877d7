//! Single-slot result holder
//!
//! A `ResultCell` lets a boolean-returning attempt hand back the value it
//! produced. It lives for one attempt on one call stack and is not shared
//! across threads.

use std::fmt;

/// A mutable slot holding at most one value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultCell<T> {
    slot: Option<T>,
}

impl<T> ResultCell<T> {
    /// Creates an empty cell
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Creates a cell already holding `value`
    pub fn with(value: T) -> Self {
        Self { slot: Some(value) }
    }

    /// Stores `value`, replacing any previous content
    pub fn set(&mut self, value: T) {
        self.slot = Some(value);
    }

    /// Returns the stored value, `None` if the cell was never set
    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    /// Moves the stored value out, leaving the cell empty
    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.slot
    }
}

impl<T> Default for ResultCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display> fmt::Display for ResultCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(value) => write!(f, "ResultCell {{target = {}}}", value),
            None => f.write_str("ResultCell {target = null}"),
        }
    }
}
