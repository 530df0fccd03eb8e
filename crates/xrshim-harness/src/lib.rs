//! Host tooling around `xrshim-core`.
//!
//! This crate provides:
//! - Loading: registry and layer configuration files
//! - Code writer: both generated units, written all-or-nothing
//! - Structured logging: JSONL run records and an artifact index
//! - Determinism gate: repeated generation compared by SHA-256
//! - Selection report: which fragments each selected command receives
//! - Build-script helper for layer crates
//!
//! The `xrshim` binary exposes the same operations on the command line.

#![forbid(unsafe_code)]

pub mod build;
pub mod determinism;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod selection_report;
pub mod structured_log;
pub mod writer;

pub use determinism::DeterminismReport;
pub use error::HarnessError;
pub use loader::{load_config, load_registry};
pub use pipeline::{GenerateRequest, GenerateOutcome, run_generate};
pub use selection_report::SelectionReport;
pub use writer::{DECLARATIONS_FILE, DEFINITIONS_FILE, WrittenUnits, write_units};
