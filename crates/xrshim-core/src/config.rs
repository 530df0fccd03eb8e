//! Per-target configuration sets.
//!
//! A layer configuration file holds several named targets, each with an
//! `override` list (commands the layer replaces), a `requested` list (commands
//! whose upstream address the layer needs) and the extensions it enables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which configuration list a name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Override,
    Requested,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Override => "override",
            Self::Requested => "requested",
        })
    }
}

/// Override and requested lists for one build target.
///
/// Duplicates inside a list are tolerated; both lists behave as sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSet {
    #[serde(rename = "override", default)]
    pub override_functions: Vec<String>,
    #[serde(rename = "requested", default)]
    pub requested_functions: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ConfigurationSet {
    #[must_use]
    pub fn new<O, R>(override_functions: O, requested_functions: R) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            override_functions: override_functions.into_iter().map(Into::into).collect(),
            requested_functions: requested_functions.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
        }
    }

    /// Enable extensions for this target.
    #[must_use]
    pub fn with_extensions<E>(mut self, extensions: E) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// The names of one list.
    #[must_use]
    pub fn list(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Override => &self.override_functions,
            ListKind::Requested => &self.requested_functions,
        }
    }

    #[must_use]
    pub fn overrides(&self, name: &str) -> bool {
        self.override_functions.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn requests(&self, name: &str) -> bool {
        self.requested_functions.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn enables(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// A configuration file: named targets in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub targets: BTreeMap<String, ConfigurationSet>,
}

impl LayerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Result<&ConfigurationSet, ConfigError> {
        self.targets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownTarget {
                target: name.to_string(),
                available: self.target_names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets_with_optional_lists() {
        let config = LayerConfig::from_json_str(
            r#"{
                "targets": {
                    "minimal": { "override": ["xrCreateSession"], "requested": ["xrGetSystem"] },
                    "passthrough": {}
                }
            }"#,
        )
        .unwrap();
        let minimal = config.target("minimal").unwrap();
        assert!(minimal.overrides("xrCreateSession"));
        assert!(minimal.requests("xrGetSystem"));
        assert!(minimal.extensions.is_empty());

        let passthrough = config.target("passthrough").unwrap();
        assert!(passthrough.override_functions.is_empty());
        assert!(passthrough.requested_functions.is_empty());
    }

    #[test]
    fn unknown_target_lists_available() {
        let config = LayerConfig::from_json_str(r#"{"targets": {"b": {}, "a": {}}}"#).unwrap();
        let err = config.target("c").unwrap_err();
        assert_eq!(err.to_string(), "unknown target `c` (available: a, b)");
    }

    #[test]
    fn list_accessor_and_extensions() {
        let set = ConfigurationSet::new(["xrA"], ["xrB", "xrB"]).with_extensions(["XR_EXT_x"]);
        assert_eq!(set.list(ListKind::Override), ["xrA".to_string()]);
        assert_eq!(set.list(ListKind::Requested).len(), 2);
        assert!(set.enables("XR_EXT_x"));
        assert!(!set.enables("XR_EXT_y"));
    }

    #[test]
    fn list_kind_display() {
        assert_eq!(ListKind::Override.to_string(), "override");
        assert_eq!(ListKind::Requested.to_string(), "requested");
    }
}
