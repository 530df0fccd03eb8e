//! Command selection.
//!
//! Validates a [`ConfigurationSet`] against the registry and computes the
//! commands that receive generated artifacts: one entry per distinct name in
//! `override ∪ requested ∪ {destroy}`, in registry order.

use serde::Serialize;

use crate::config::{ConfigurationSet, ListKind};
use crate::error::ConfigError;
use crate::model::{Command, Registry};
use crate::profile::ApiProfile;

/// How a selected command is shimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Replaced by the layer: trampoline and substitution entry.
    Override,
    /// Upstream address needed: eager resolution at creation.
    Requested,
    /// In both lists: trampoline, substitution entry and eager resolution.
    Both,
    /// Instance destruction, always intercepted.
    BootstrapDestroy,
}

impl Role {
    /// Gets a trampoline and a substitution-table entry.
    #[must_use]
    pub const fn has_trampoline(self) -> bool {
        matches!(self, Self::Override | Self::Both | Self::BootstrapDestroy)
    }

    /// Gets an eager-resolution entry in the creation hook.
    #[must_use]
    pub const fn resolves_eagerly(self) -> bool {
        matches!(self, Self::Requested | Self::Both)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Requested => "requested",
            Self::Both => "both",
            Self::BootstrapDestroy => "bootstrap_destroy",
        }
    }
}

/// A registry command together with its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedCommand<'r> {
    pub command: &'r Command,
    pub role: Role,
}

impl SelectedCommand<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.command.name
    }
}

/// Validate `config` and select the commands to shim.
///
/// Fails when a bootstrap name is listed, when a name is not in the registry,
/// when a name belongs to an extension the target does not enable, or when an
/// enabled extension is unknown to the registry.
pub fn select<'r>(
    registry: &'r Registry,
    config: &ConfigurationSet,
    profile: &ApiProfile,
) -> Result<Vec<SelectedCommand<'r>>, ConfigError> {
    for list in [ListKind::Override, ListKind::Requested] {
        if let Some(name) = config.list(list).iter().find(|n| profile.is_bootstrap(n)) {
            return Err(ConfigError::BootstrapListed {
                list,
                command: name.clone(),
            });
        }
    }

    if let Some(extension) = config
        .extensions
        .iter()
        .find(|e| !registry.declares_extension(e))
    {
        return Err(ConfigError::UnknownExtension(extension.clone()));
    }

    for list in [ListKind::Override, ListKind::Requested] {
        for name in config.list(list) {
            let command = registry
                .command(name)
                .ok_or_else(|| ConfigError::UnknownCommand {
                    list,
                    command: name.clone(),
                })?;
            if let Some(extension) = &command.extension
                && !config.enables(extension)
            {
                return Err(ConfigError::ExtensionNotEnabled {
                    list,
                    command: name.clone(),
                    extension: extension.clone(),
                });
            }
        }
    }

    let destroy = profile.bootstrap.destroy_instance.as_str();
    let selected = registry
        .commands
        .iter()
        .filter_map(|command| {
            let name = command.name.as_str();
            let role = if name == destroy {
                Role::BootstrapDestroy
            } else {
                match (config.overrides(name), config.requests(name)) {
                    (true, true) => Role::Both,
                    (true, false) => Role::Override,
                    (false, true) => Role::Requested,
                    (false, false) => return None,
                }
            };
            Some(SelectedCommand { command, role })
        })
        .collect();
    Ok(selected)
}
