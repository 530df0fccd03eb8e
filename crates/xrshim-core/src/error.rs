//! Error types for registry loading, configuration validation and generation.
//!
//! Every variant is fatal and is raised before any text is emitted.

use thiserror::Error;

use crate::config::ListKind;

/// A registry that cannot back a layer.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("command `{0}` is declared more than once")]
    DuplicateCommand(String),
    #[error("command `{command}`: `{identifier}` is not a valid identifier")]
    InvalidIdentifier { command: String, identifier: String },
    #[error("command `{command}`: parameter `{parameter}` is declared more than once")]
    DuplicateParameter { command: String, parameter: String },
    #[error("command `{command}`: parameter `{parameter}` has an empty type")]
    EmptyType { command: String, parameter: String },
    #[error("command `{command}` belongs to undeclared extension `{extension}`")]
    UndeclaredExtension { command: String, extension: String },
    #[error("bootstrap command `{0}` is missing from the registry")]
    MissingBootstrap(String),
    #[error("bootstrap command `{command}` has an unusable signature: {reason}")]
    BootstrapShape {
        command: String,
        reason: &'static str,
    },
}

/// A configuration set that does not fit the registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown target `{target}` (available: {available})")]
    UnknownTarget { target: String, available: String },
    #[error("bootstrap command `{command}` may not appear in the {list} list")]
    BootstrapListed { list: ListKind, command: String },
    #[error("{list} list names `{command}`, which is not in the registry")]
    UnknownCommand { list: ListKind, command: String },
    #[error("{list} list names `{command}`, but its extension `{extension}` is not enabled")]
    ExtensionNotEnabled {
        list: ListKind,
        command: String,
        extension: String,
    },
    #[error("extension `{0}` is not declared by the registry")]
    UnknownExtension(String),
}

/// Failure of a whole generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
