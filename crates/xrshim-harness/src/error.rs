//! Error type for host tooling.

use std::path::PathBuf;

use thiserror::Error;
use xrshim_core::{ConfigError, GenerateError, RegistryError};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("registry {}: {source}", path.display())]
    Registry {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
    #[error("configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("OUT_DIR is not set; the build helper must run from a build script")]
    MissingOutDir,
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
