//! Write-once upstream slots.
//!
//! A slot is captured at most once and read lock-free afterwards. The first
//! capture wins; later captures are ignored and reported to the caller.

use std::fmt;
use std::sync::OnceLock;

pub struct UpstreamSlot<T: Copy> {
    cell: OnceLock<T>,
}

impl<T: Copy> UpstreamSlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Store `value` unless the slot is already captured. Returns whether
    /// `value` was stored.
    pub fn capture(&self, value: T) -> bool {
        self.cell.set(value).is_ok()
    }

    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.cell.get().copied()
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Captured value.
    ///
    /// # Panics
    ///
    /// Panics when the slot was never captured. Generated code only calls this
    /// inside a containment barrier.
    #[track_caller]
    #[must_use]
    pub fn expect_captured(&self, command: &str) -> T {
        match self.cell.get() {
            Some(value) => *value,
            None => panic!("upstream {command} was never resolved"),
        }
    }
}

impl<T: Copy> Default for UpstreamSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> fmt::Debug for UpstreamSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSlot")
            .field("captured", &self.is_captured())
            .finish()
    }
}
