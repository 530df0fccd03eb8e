//! Best-effort diagnostics side channel.
//!
//! Messages are tagged with the layer namespace and written to a replaceable
//! sink (stderr by default). Writers never block: if the sink is busy or the
//! write fails the message is dropped and counted. Diagnostics never take part
//! in control flow.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::{Verbosity, verbosity};

type Sink = Box<dyn Write + Send>;

static SINK: Mutex<Option<Sink>> = parking_lot::const_mutex(None);
static DROPPED: AtomicU64 = AtomicU64::new(0);

/// Route diagnostics to `sink`, returning the previous custom sink.
pub fn set_sink(sink: Sink) -> Option<Sink> {
    SINK.lock().replace(sink)
}

/// Route diagnostics back to stderr.
pub fn reset_sink() -> Option<Sink> {
    SINK.lock().take()
}

/// Messages dropped because the sink was busy or failed.
#[must_use]
pub fn dropped_messages() -> u64 {
    DROPPED.load(Ordering::Relaxed)
}

/// Write one message if `level` is enabled. Used by [`log!`](crate::log) and
/// [`debug_log!`](crate::debug_log).
#[doc(hidden)]
pub fn emit(level: Verbosity, namespace: &str, args: fmt::Arguments<'_>) {
    if !verbosity().allows(level) {
        return;
    }
    let Some(mut sink) = SINK.try_lock() else {
        DROPPED.fetch_add(1, Ordering::Relaxed);
        return;
    };
    let written = match sink.as_mut() {
        Some(custom) => writeln!(custom, "[{namespace}] {args}").and_then(|()| custom.flush()),
        None => writeln!(std::io::stderr().lock(), "[{namespace}] {args}"),
    };
    if written.is_err() {
        DROPPED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Log a failure. Written unless diagnostics are off.
#[macro_export]
macro_rules! log {
    ($namespace:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit(
            $crate::config::Verbosity::Errors,
            $namespace,
            ::std::format_args!($($arg)+),
        )
    };
}

/// Log a trace message. Written only at `debug` verbosity.
#[macro_export]
macro_rules! debug_log {
    ($namespace:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit(
            $crate::config::Verbosity::Debug,
            $namespace,
            ::std::format_args!($($arg)+),
        )
    };
}

/// In-memory sink; clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

impl Write for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::set_verbosity;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // One test owns the global sink; splitting it would race.
    #[test]
    fn sink_routing_levels_and_drops() {
        set_verbosity(Verbosity::Debug);
        let sink = MemorySink::new();
        set_sink(Box::new(sink.clone()));

        crate::log!("novendor", "xrEndFrame failed: {}", "boom");
        crate::debug_log!("novendor", "--> xrEndFrame");
        let contents = sink.contents();
        assert!(contents.contains("[novendor] xrEndFrame failed: boom\n"));
        assert!(contents.contains("[novendor] --> xrEndFrame\n"));

        set_verbosity(Verbosity::Errors);
        crate::debug_log!("novendor", "hidden trace");
        assert!(!sink.contents().contains("hidden trace"));

        let before = dropped_messages();
        {
            let _busy = SINK.lock();
            crate::log!("novendor", "dropped while busy");
        }
        assert!(dropped_messages() > before);
        assert!(!sink.contents().contains("dropped while busy"));

        set_sink(Box::new(FailingSink));
        let before = dropped_messages();
        crate::log!("novendor", "write fails");
        assert!(dropped_messages() > before);

        reset_sink();
        set_verbosity(Verbosity::build_default());
    }
}
