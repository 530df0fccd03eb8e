//! Diagnostics verbosity.
//!
//! Set via the `XRSHIM_DIAGNOSTICS` environment variable:
//! - `off`: nothing is written.
//! - `errors`: contained failures and resolution errors only.
//! - `debug`: additionally entry/exit of every trampoline and every resolved
//!   address.
//!
//! Unset or unrecognized values fall back to `debug` in debug builds and
//! `errors` otherwise. The value is read once and cached for the process.

use std::sync::atomic::{AtomicU8, Ordering};

pub const ENV_VAR: &str = "XRSHIM_DIAGNOSTICS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    Off,
    Errors,
    Debug,
}

impl Verbosity {
    /// Parse from string (case-insensitive). Unknown values yield `None`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" | "quiet" => Some(Self::Off),
            "errors" | "error" | "1" => Some(Self::Errors),
            "debug" | "all" | "2" | "verbose" => Some(Self::Debug),
            _ => None,
        }
    }

    #[must_use]
    pub const fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Errors
        }
    }

    /// Whether a message at `level` is written under this setting.
    #[must_use]
    pub fn allows(self, level: Self) -> bool {
        level != Self::Off && level <= self
    }
}

// 0 = unresolved, 1..=3 = Verbosity + 1.
static CACHED: AtomicU8 = AtomicU8::new(0);

const UNRESOLVED: u8 = 0;

fn encode(v: Verbosity) -> u8 {
    match v {
        Verbosity::Off => 1,
        Verbosity::Errors => 2,
        Verbosity::Debug => 3,
    }
}

fn decode(raw: u8) -> Option<Verbosity> {
    match raw {
        1 => Some(Verbosity::Off),
        2 => Some(Verbosity::Errors),
        3 => Some(Verbosity::Debug),
        _ => None,
    }
}

/// Configured verbosity (reads the environment on first call).
#[must_use]
pub fn verbosity() -> Verbosity {
    if let Some(v) = decode(CACHED.load(Ordering::Relaxed)) {
        return v;
    }
    let resolved = std::env::var(ENV_VAR)
        .ok()
        .and_then(|raw| Verbosity::from_str_loose(&raw))
        .unwrap_or_else(Verbosity::build_default);
    // A concurrent first call may have won; keep whichever value landed first.
    match CACHED.compare_exchange(
        UNRESOLVED,
        encode(resolved),
        Ordering::SeqCst,
        Ordering::Relaxed,
    ) {
        Ok(_) => resolved,
        Err(existing) => decode(existing).unwrap_or(resolved),
    }
}

/// Replace the configured verbosity for the rest of the process.
pub fn set_verbosity(v: Verbosity) {
    CACHED.store(encode(v), Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_spellings() {
        assert_eq!(Verbosity::from_str_loose("OFF"), Some(Verbosity::Off));
        assert_eq!(Verbosity::from_str_loose(" errors "), Some(Verbosity::Errors));
        assert_eq!(Verbosity::from_str_loose("Debug"), Some(Verbosity::Debug));
        assert_eq!(Verbosity::from_str_loose("chatty"), None);
    }

    #[test]
    fn allows_is_monotone() {
        assert!(Verbosity::Debug.allows(Verbosity::Errors));
        assert!(Verbosity::Debug.allows(Verbosity::Debug));
        assert!(Verbosity::Errors.allows(Verbosity::Errors));
        assert!(!Verbosity::Errors.allows(Verbosity::Debug));
        assert!(!Verbosity::Off.allows(Verbosity::Errors));
        assert!(!Verbosity::Debug.allows(Verbosity::Off));
    }

    #[test]
    fn encoding_round_trips() {
        for v in [Verbosity::Off, Verbosity::Errors, Verbosity::Debug] {
            assert_eq!(decode(encode(v)), Some(v));
        }
        assert_eq!(decode(UNRESOLVED), None);
    }
}
