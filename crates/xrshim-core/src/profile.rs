//! API profile: bootstrap names and the vocabulary of emitted code.

use serde::Serialize;

/// The three structurally special entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapNames {
    pub create_instance: String,
    pub destroy_instance: String,
    pub get_instance_proc_addr: String,
}

impl BootstrapNames {
    /// All three names, in create / destroy / resolve order.
    #[must_use]
    pub fn all(&self) -> [&str; 3] {
        [
            &self.create_instance,
            &self.destroy_instance,
            &self.get_instance_proc_addr,
        ]
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.all().contains(&name)
    }
}

/// Names used by the emitter. Defaults target OpenXR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiProfile {
    pub bootstrap: BootstrapNames,
    /// Type of the status enumeration returned by `status` commands.
    pub status_type: String,
    /// Name of the emitted base trait.
    pub trait_name: String,
    /// Path of the runtime support crate, as written in emitted code.
    pub runtime_crate: String,
    /// Environment variable the including build must define.
    pub namespace_token: String,
}

impl ApiProfile {
    #[must_use]
    pub fn openxr() -> Self {
        Self {
            bootstrap: BootstrapNames {
                create_instance: "xrCreateInstance".to_string(),
                destroy_instance: "xrDestroyInstance".to_string(),
                get_instance_proc_addr: "xrGetInstanceProcAddr".to_string(),
            },
            status_type: "XrResult".to_string(),
            trait_name: "OpenXrApi".to_string(),
            runtime_crate: "::xrshim_membrane".to_string(),
            namespace_token: "XR_LAYER_NAMESPACE".to_string(),
        }
    }

    /// Override the base trait name.
    #[must_use]
    pub fn with_trait_name(mut self, name: impl Into<String>) -> Self {
        self.trait_name = name.into();
        self
    }

    /// Override the runtime crate path.
    #[must_use]
    pub fn with_runtime_crate(mut self, path: impl Into<String>) -> Self {
        self.runtime_crate = path.into();
        self
    }

    /// Override the namespace token name.
    #[must_use]
    pub fn with_namespace_token(mut self, token: impl Into<String>) -> Self {
        self.namespace_token = token.into();
        self
    }

    #[must_use]
    pub fn is_bootstrap(&self, name: &str) -> bool {
        self.bootstrap.contains(name)
    }
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self::openxr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openxr_bootstrap_names() {
        let profile = ApiProfile::default();
        assert!(profile.is_bootstrap("xrCreateInstance"));
        assert!(profile.is_bootstrap("xrDestroyInstance"));
        assert!(profile.is_bootstrap("xrGetInstanceProcAddr"));
        assert!(!profile.is_bootstrap("xrCreateSession"));
        assert_eq!(profile.status_type, "XrResult");
    }

    #[test]
    fn builders_replace_vocabulary() {
        let profile = ApiProfile::openxr()
            .with_trait_name("LayerApi")
            .with_runtime_crate("crate::runtime")
            .with_namespace_token("MY_LAYER");
        assert_eq!(profile.trait_name, "LayerApi");
        assert_eq!(profile.runtime_crate, "crate::runtime");
        assert_eq!(profile.namespace_token, "MY_LAYER");
    }
}
