//! Build-time generator for API-layer interception shims.
//!
//! This crate provides:
//! - Registry model: the ordered command list a layer can intercept
//! - Configuration sets: per-target override / requested lists
//! - Command selection: validation against the registry and the bootstrap rules
//! - Shim emission: the declarations and definitions units a layer crate includes
//!
//! Everything here is a pure transformation over in-memory values. File loading,
//! writing and build-script plumbing live in `xrshim-harness`.

#![forbid(unsafe_code)]

pub mod config;
pub mod emit;
pub mod error;
pub mod model;
pub mod profile;
pub mod registry;
pub mod select;

pub use config::{ConfigurationSet, LayerConfig, ListKind};
pub use emit::{GeneratedUnits, generate};
pub use error::{ConfigError, GenerateError, RegistryError};
pub use model::{Command, Parameter, Registry, ReturnKind};
pub use profile::{ApiProfile, BootstrapNames};
pub use registry::{parse_registry, validate_registry};
pub use select::{Role, SelectedCommand, select};
