//! Registry data model.
//!
//! A [`Registry`] is the ordered command list of one API version. Order is
//! significant: every generated artifact follows it so regenerated output diffs
//! cleanly across registry revisions.

use serde::{Deserialize, Serialize};

/// What a command hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    /// No return value.
    None,
    /// The API's status enumeration.
    Status,
}

impl ReturnKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Status => "status",
        }
    }
}

/// One parameter of a command.
///
/// `type_descriptor` is a Rust type expression copied verbatim into every
/// emitted signature. It is never parsed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_descriptor: String,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, type_descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_descriptor: type_descriptor.into(),
        }
    }
}

/// One entry point of the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(rename = "return")]
    pub return_kind: ReturnKind,
    #[serde(rename = "params", default)]
    pub parameters: Vec<Parameter>,
    /// Extension introducing the command; `None` for core commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Command {
    /// Create a core command with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, return_kind: ReturnKind) -> Self {
        Self {
            name: name.into(),
            return_kind,
            parameters: Vec::new(),
            extension: None,
        }
    }

    /// Append a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, type_descriptor: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, type_descriptor));
        self
    }

    /// Mark the command as belonging to an extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    #[must_use]
    pub fn returns_status(&self) -> bool {
        self.return_kind == ReturnKind::Status
    }
}

/// Declarative description of an API version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub api: String,
    pub version: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    pub commands: Vec<Command>,
}

impl Registry {
    #[must_use]
    pub fn new(api: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            version: version.into(),
            extensions: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Append a command (registry order is insertion order).
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Declare an extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Look up a command by name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn declares_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}
