//! Selection report: which generated fragments each selected command gets.

use std::fmt::Write as _;

use serde::Serialize;
use xrshim_core::{ApiProfile, ConfigurationSet, GenerateError, Registry, Role, select, validate_registry};

use crate::error::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fragments {
    /// `PFN_` alias, upstream slot, forwarding method and trait method.
    pub dispatch: bool,
    pub trampoline: bool,
    pub substitution_entry: bool,
    pub eager_resolution: bool,
}

impl Fragments {
    fn for_role(role: Role) -> Self {
        Self {
            dispatch: true,
            trampoline: role.has_trampoline(),
            substitution_entry: role.has_trampoline(),
            eager_resolution: role.resolves_eagerly(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRow {
    pub command: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub returns: &'static str,
    pub fragments: Fragments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
    pub target: String,
    pub api: String,
    pub version: String,
    pub rows: Vec<SelectionRow>,
}

impl SelectionReport {
    /// Validate `config` and describe its selection.
    pub fn build(
        registry: &Registry,
        target: &str,
        config: &ConfigurationSet,
        profile: &ApiProfile,
    ) -> Result<Self, HarnessError> {
        validate_registry(registry, profile).map_err(GenerateError::from)?;
        let selected = select(registry, config, profile).map_err(GenerateError::from)?;
        let rows = selected
            .iter()
            .map(|s| SelectionRow {
                command: s.name().to_string(),
                role: s.role,
                extension: s.command.extension.clone(),
                returns: s.command.return_kind.as_str(),
                fragments: Fragments::for_role(s.role),
            })
            .collect();
        Ok(Self {
            target: target.to_string(),
            api: registry.api.clone(),
            version: registry.version.clone(),
            rows,
        })
    }

    /// Plain-text table, one row per command in registry order.
    #[must_use]
    pub fn render_plain(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.command.len())
            .max()
            .unwrap_or(0)
            .max("command".len());
        let mut out = String::new();
        let _ = writeln!(
            out,
            "target {} ({} {}): {} commands",
            self.target,
            self.api,
            self.version,
            self.rows.len()
        );
        let _ = writeln!(
            out,
            "{:<width$}  {:<17}  {:<10}  {:<12}  {:<5}",
            "command", "role", "trampoline", "substitution", "eager"
        );
        let mark = |b: bool| if b { "yes" } else { "-" };
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<width$}  {:<17}  {:<10}  {:<12}  {:<5}",
                row.command,
                row.role.as_str(),
                mark(row.fragments.trampoline),
                mark(row.fragments.substitution_entry),
                mark(row.fragments.eager_resolution),
            );
        }
        out
    }
}
