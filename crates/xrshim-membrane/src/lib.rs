//! Runtime membrane between the OpenXR loader and a generated layer.
//!
//! Generated trampolines, the substitution table and the creation hook link
//! against this crate for:
//! - Status codes and handle types shared with the loader ABI
//! - Write-once upstream slots and the process-wide active layer
//! - Containment barriers that keep panics from crossing `extern "system"`
//! - Address resolution through the next resolver in the chain
//! - A best-effort diagnostics side channel

pub mod active;
pub mod barrier;
pub mod config;
pub mod diagnostics;
pub mod resolve;
pub mod slot;
pub mod status;

pub use active::{ActivationError, ActiveLayer};
pub use barrier::{contain_status, contain_void};
pub use config::{Verbosity, verbosity};
pub use resolve::{ResolveError, resolve};
pub use slot::UpstreamSlot;
pub use status::{GetInstanceProcAddr, StatusCode, VoidFunction, XrInstance, XrResult};
