//! Process-wide active layer.
//!
//! OpenXR entry points carry no context argument a layer could use to find
//! itself, so trampolines dispatch through a single global slot. The slot is
//! filled once the creation hook succeeded, read on every intercepted call and
//! cleared after a successful instance destruction.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    #[error("a layer instance is already active; destroy it before creating another")]
    AlreadyActive,
}

pub struct ActiveLayer<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> ActiveLayer<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: parking_lot::const_rwlock(None),
        }
    }

    /// Make `layer` the active instance.
    pub fn install(&self, layer: Arc<T>) -> Result<(), ActivationError> {
        let mut slot = self.slot.write();
        if slot.is_some() {
            return Err(ActivationError::AlreadyActive);
        }
        *slot = Some(layer);
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// The active instance.
    ///
    /// # Panics
    ///
    /// Panics when no layer is active. Trampolines call this inside their
    /// containment barrier, which reports the generic failure status.
    #[track_caller]
    #[must_use]
    pub fn expect_current(&self, command: &str) -> Arc<T> {
        match self.current() {
            Some(layer) => layer,
            None => panic!("{command} called with no active layer instance"),
        }
    }

    /// Clear the slot, returning the instance that was active.
    pub fn retire(&self) -> Option<Arc<T>> {
        self.slot.write().take()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<T: ?Sized> Default for ActiveLayer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ActiveLayer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveLayer")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Layer(&'static str);

    impl Named for Layer {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn install_current_retire_cycle() {
        let active: ActiveLayer<dyn Named> = ActiveLayer::new();
        assert!(!active.is_active());
        assert!(active.current().is_none());

        active.install(Arc::new(Layer("first"))).unwrap();
        assert!(active.is_active());
        assert_eq!(active.expect_current("xrTest").name(), "first");

        assert_eq!(
            active.install(Arc::new(Layer("second"))),
            Err(ActivationError::AlreadyActive)
        );
        assert_eq!(active.expect_current("xrTest").name(), "first");

        let retired = active.retire().unwrap();
        assert_eq!(retired.name(), "first");
        assert!(!active.is_active());

        active.install(Arc::new(Layer("second"))).unwrap();
        assert_eq!(active.expect_current("xrTest").name(), "second");
    }

    #[test]
    #[should_panic(expected = "xrEndFrame called with no active layer instance")]
    fn expect_current_panics_when_empty() {
        let active: ActiveLayer<dyn Named> = ActiveLayer::new();
        let _ = active.expect_current("xrEndFrame");
    }

    #[test]
    fn static_slot_is_const_constructible() {
        static ACTIVE: ActiveLayer<dyn Named> = ActiveLayer::new();
        ACTIVE.install(Arc::new(Layer("static"))).unwrap();
        assert_eq!(ACTIVE.current().map(|l| l.name().to_string()).as_deref(), Some("static"));
        ACTIVE.retire();
    }

    #[test]
    fn concurrent_readers_see_the_installed_layer() {
        let active: Arc<ActiveLayer<dyn Named>> = Arc::new(ActiveLayer::new());
        active.install(Arc::new(Layer("shared"))).unwrap();
        let readers: Vec<_> = (0..8)
            .map(|_| {
                let active = Arc::clone(&active);
                std::thread::spawn(move || {
                    (0..1_000).all(|_| active.expect_current("xrTest").name() == "shared")
                })
            })
            .collect();
        for reader in readers {
            assert!(reader.join().unwrap());
        }
    }
}
