//! Containment barriers for `extern "system"` entry points.
//!
//! The loader and the application cannot observe a Rust panic, and unwinding
//! out of an `extern "system"` function aborts the process. Every trampoline
//! therefore runs the layer inside one of these barriers.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::status::StatusCode;

/// Run `f`, mapping a panic to [`StatusCode::GENERIC_FAILURE`].
pub fn contain_status<S, F>(namespace: &str, command: &str, f: F) -> S
where
    S: StatusCode,
    F: FnOnce() -> S,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(payload) => {
            crate::log!(namespace, "{command} failed: {}", panic_message(&*payload));
            S::GENERIC_FAILURE
        }
    }
}

/// Run `f`, logging and suppressing a panic.
pub fn contain_void<F>(namespace: &str, command: &str, f: F)
where
    F: FnOnce(),
{
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        crate::log!(namespace, "{command} failed: {}", panic_message(&*payload));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
