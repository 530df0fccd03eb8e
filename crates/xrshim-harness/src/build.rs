//! Build-script helper for layer crates.
//!
//! ```ignore
//! // build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     xrshim_harness::build::LayerBuild::new("registry.json", "layer_apis.json", "minimal")
//!         .with_namespace("demo")
//!         .run()?;
//!     Ok(())
//! }
//! ```
//!
//! The layer then includes both units from `OUT_DIR`:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/dispatch_decl.gen.rs"));
//! include!(concat!(env!("OUT_DIR"), "/dispatch_defs.gen.rs"));
//! ```

use std::path::{Path, PathBuf};

use xrshim_core::{ApiProfile, generate as generate_units};

use crate::error::HarnessError;
use crate::loader::{load_config, load_registry};
use crate::writer::{WrittenUnits, write_units};

#[derive(Debug, Clone)]
pub struct LayerBuild {
    registry: PathBuf,
    config: PathBuf,
    target: String,
    namespace: Option<String>,
    profile: ApiProfile,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub written: WrittenUnits,
    /// `cargo:` lines for the build script to print.
    pub directives: Vec<String>,
}

impl LayerBuild {
    #[must_use]
    pub fn new(registry: impl Into<PathBuf>, config: impl Into<PathBuf>, target: &str) -> Self {
        Self {
            registry: registry.into(),
            config: config.into(),
            target: target.to_string(),
            namespace: None,
            profile: ApiProfile::openxr(),
        }
    }

    /// Tag for diagnostics. Defaults to the target name.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ApiProfile) -> Self {
        self.profile = profile;
        self
    }

    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.target)
    }

    fn directives(&self) -> Vec<String> {
        vec![
            format!("cargo:rerun-if-changed={}", self.registry.display()),
            format!("cargo:rerun-if-changed={}", self.config.display()),
            format!(
                "cargo:rustc-env={}={}",
                self.profile.namespace_token,
                self.namespace()
            ),
        ]
    }

    /// Generate into `out_dir` without printing anything.
    pub fn generate_into(&self, out_dir: &Path) -> Result<BuildOutput, HarnessError> {
        let registry = load_registry(&self.registry, &self.profile)?;
        let config = load_config(&self.config)?;
        let set = config
            .target(&self.target)
            .map_err(|source| HarnessError::Config {
                path: self.config.clone(),
                source,
            })?;
        let units = generate_units(&registry, set, &self.profile)?;
        let written = write_units(out_dir, &units)?;
        Ok(BuildOutput {
            written,
            directives: self.directives(),
        })
    }

    /// Generate into `OUT_DIR` and print the cargo directives.
    pub fn run(&self) -> Result<BuildOutput, HarnessError> {
        let out_dir = std::env::var_os("OUT_DIR").ok_or(HarnessError::MissingOutDir)?;
        let output = self.generate_into(Path::new(&out_dir))?;
        for line in &output.directives {
            println!("{line}");
        }
        Ok(output)
    }
}

/// [`LayerBuild::run`] with the default profile and namespace.
pub fn generate(
    registry: impl Into<PathBuf>,
    config: impl Into<PathBuf>,
    target: &str,
) -> Result<BuildOutput, HarnessError> {
    LayerBuild::new(registry, config, target).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_name_inputs_and_namespace() {
        let build = LayerBuild::new("reg.json", "apis.json", "minimal");
        assert_eq!(
            build.directives(),
            [
                "cargo:rerun-if-changed=reg.json",
                "cargo:rerun-if-changed=apis.json",
                "cargo:rustc-env=XR_LAYER_NAMESPACE=minimal",
            ]
        );
        let named = build.with_namespace("demo");
        assert_eq!(named.directives()[2], "cargo:rustc-env=XR_LAYER_NAMESPACE=demo");
    }

    #[test]
    fn namespace_token_follows_the_profile() {
        let build = LayerBuild::new("r", "c", "t")
            .with_profile(ApiProfile::openxr().with_namespace_token("MY_LAYER_NS"));
        assert_eq!(build.directives()[2], "cargo:rustc-env=MY_LAYER_NS=t");
    }
}
