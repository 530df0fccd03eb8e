//! Loading registry and configuration files.

use std::path::Path;

use xrshim_core::{ApiProfile, LayerConfig, Registry, parse_registry};

use crate::error::HarnessError;

/// Read and validate a registry file.
pub fn load_registry(path: &Path, profile: &ApiProfile) -> Result<Registry, HarnessError> {
    let text = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    parse_registry(&text, profile).map_err(|source| HarnessError::Registry {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a layer configuration file holding one or more targets.
pub fn load_config(path: &Path) -> Result<LayerConfig, HarnessError> {
    let text = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    LayerConfig::from_json_str(&text).map_err(|source| HarnessError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(Path::parent)
            .unwrap()
            .to_path_buf()
    }

    #[test]
    fn loads_workspace_fixtures() {
        let root = workspace_root();
        let registry =
            load_registry(&root.join("registry/openxr_core.json"), &ApiProfile::openxr()).unwrap();
        assert!(registry.command("xrCreateSession").is_some());
        let config = load_config(&root.join("layer_apis.json")).unwrap();
        assert!(config.target("novendor").is_ok());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_config(Path::new("/nonexistent/layer_apis.json")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }));
        assert!(err.to_string().starts_with("/nonexistent/layer_apis.json: "));
    }
}
