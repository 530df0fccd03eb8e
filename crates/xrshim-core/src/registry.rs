//! Registry loading and validation.
//!
//! A registry is accepted only when every name can be spelled as a Rust
//! identifier, every type descriptor is non-empty, and the three bootstrap
//! commands exist with the shape the emitted layer relies on.

use std::collections::HashSet;

use crate::error::RegistryError;
use crate::model::{Command, Registry};
use crate::profile::ApiProfile;

/// Words that must be spelled `r#word` when used as identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers either.
const RESERVED_PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Parse a registry from JSON and validate it against `profile`.
pub fn parse_registry(json: &str, profile: &ApiProfile) -> Result<Registry, RegistryError> {
    let registry: Registry = serde_json::from_str(json)?;
    validate_registry(&registry, profile)?;
    Ok(registry)
}

/// Check identifiers, types, extensions and bootstrap commands.
pub fn validate_registry(registry: &Registry, profile: &ApiProfile) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for command in &registry.commands {
        if !seen.insert(command.name.as_str()) {
            return Err(RegistryError::DuplicateCommand(command.name.clone()));
        }
        validate_command(registry, command)?;
    }
    bootstrap_commands(registry, profile)?;
    Ok(())
}

fn validate_command(registry: &Registry, command: &Command) -> Result<(), RegistryError> {
    if !is_identifier(&command.name) || is_rust_keyword(&command.name) {
        return Err(RegistryError::InvalidIdentifier {
            command: command.name.clone(),
            identifier: command.name.clone(),
        });
    }
    if let Some(extension) = &command.extension
        && !registry.declares_extension(extension)
    {
        return Err(RegistryError::UndeclaredExtension {
            command: command.name.clone(),
            extension: extension.clone(),
        });
    }

    let mut params = HashSet::new();
    for param in &command.parameters {
        if !is_identifier(&param.name) {
            return Err(RegistryError::InvalidIdentifier {
                command: command.name.clone(),
                identifier: param.name.clone(),
            });
        }
        if !params.insert(param.name.as_str()) {
            return Err(RegistryError::DuplicateParameter {
                command: command.name.clone(),
                parameter: param.name.clone(),
            });
        }
        if param.type_descriptor.trim().is_empty() {
            return Err(RegistryError::EmptyType {
                command: command.name.clone(),
                parameter: param.name.clone(),
            });
        }
    }
    Ok(())
}

/// The bootstrap commands of a registry.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapCommands<'r> {
    pub create_instance: &'r Command,
    pub destroy_instance: &'r Command,
    pub get_instance_proc_addr: &'r Command,
}

/// Find the bootstrap commands and check their signatures.
///
/// The resolver must take `(instance, name, function)`, destroy must take
/// exactly the resolver's instance handle, creation must take at least the
/// creation info. All three return the status type.
pub fn bootstrap_commands<'r>(
    registry: &'r Registry,
    profile: &ApiProfile,
) -> Result<BootstrapCommands<'r>, RegistryError> {
    let lookup = |name: &str| {
        registry
            .command(name)
            .ok_or_else(|| RegistryError::MissingBootstrap(name.to_string()))
    };
    let create_instance = lookup(&profile.bootstrap.create_instance)?;
    let destroy_instance = lookup(&profile.bootstrap.destroy_instance)?;
    let get_instance_proc_addr = lookup(&profile.bootstrap.get_instance_proc_addr)?;

    for command in [create_instance, destroy_instance, get_instance_proc_addr] {
        if !command.returns_status() {
            return Err(shape(command, "bootstrap commands must return the status type"));
        }
    }
    if get_instance_proc_addr.parameters.len() != 3 {
        return Err(shape(
            get_instance_proc_addr,
            "the address resolver takes exactly (instance, name, function)",
        ));
    }
    if destroy_instance.parameters.len() != 1 {
        return Err(shape(
            destroy_instance,
            "instance destruction takes exactly the instance handle",
        ));
    }
    if destroy_instance.parameters[0].type_descriptor
        != get_instance_proc_addr.parameters[0].type_descriptor
    {
        return Err(shape(
            destroy_instance,
            "instance destruction must take the resolver's instance handle type",
        ));
    }
    if create_instance.parameters.is_empty() {
        return Err(shape(
            create_instance,
            "instance creation takes the creation info first",
        ));
    }

    Ok(BootstrapCommands {
        create_instance,
        destroy_instance,
        get_instance_proc_addr,
    })
}

fn shape(command: &Command, reason: &'static str) -> RegistryError {
    RegistryError::BootstrapShape {
        command: command.name.clone(),
        reason,
    }
}

/// ASCII identifier that can be written in Rust, possibly as a raw identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_PATH_KEYWORDS.contains(&name)
}

#[must_use]
pub fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReturnKind;

    fn bootstrap_registry() -> Registry {
        Registry::new("OpenXR", "1.0")
            .with_command(
                Command::new("xrGetInstanceProcAddr", ReturnKind::Status)
                    .with_param("instance", "XrInstance")
                    .with_param("name", "*const ::std::ffi::c_char")
                    .with_param("function", "*mut Option<::xrshim_membrane::VoidFunction>"),
            )
            .with_command(
                Command::new("xrCreateInstance", ReturnKind::Status)
                    .with_param("createInfo", "*const XrInstanceCreateInfo")
                    .with_param("instance", "*mut XrInstance"),
            )
            .with_command(
                Command::new("xrDestroyInstance", ReturnKind::Status)
                    .with_param("instance", "XrInstance"),
            )
    }

    #[test]
    fn accepts_minimal_bootstrap_registry() {
        let registry = bootstrap_registry();
        validate_registry(&registry, &ApiProfile::default()).unwrap();
        let boot = bootstrap_commands(&registry, &ApiProfile::default()).unwrap();
        assert_eq!(boot.get_instance_proc_addr.parameters.len(), 3);
    }

    #[test]
    fn rejects_duplicate_command() {
        let registry = bootstrap_registry()
            .with_command(Command::new("xrPollEvent", ReturnKind::Status))
            .with_command(Command::new("xrPollEvent", ReturnKind::Status));
        let err = validate_registry(&registry, &ApiProfile::default()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand(name) if name == "xrPollEvent"));
    }

    #[test]
    fn rejects_missing_bootstrap() {
        let mut registry = bootstrap_registry();
        registry.commands.retain(|c| c.name != "xrDestroyInstance");
        let err = validate_registry(&registry, &ApiProfile::default()).unwrap_err();
        assert!(
            matches!(err, RegistryError::MissingBootstrap(name) if name == "xrDestroyInstance")
        );
    }

    #[test]
    fn rejects_resolver_with_wrong_arity() {
        let mut registry = bootstrap_registry();
        registry.commands[0].parameters.pop();
        let err = validate_registry(&registry, &ApiProfile::default()).unwrap_err();
        assert!(matches!(err, RegistryError::BootstrapShape { command, .. } if command == "xrGetInstanceProcAddr"));
    }

    #[test]
    fn rejects_void_bootstrap() {
        let mut registry = bootstrap_registry();
        registry.commands[2].return_kind = ReturnKind::None;
        let err = validate_registry(&registry, &ApiProfile::default()).unwrap_err();
        assert!(matches!(err, RegistryError::BootstrapShape { command, .. } if command == "xrDestroyInstance"));
    }

    #[test]
    fn rejects_destroy_with_foreign_handle_type() {
        let mut registry = bootstrap_registry();
        registry.commands[2].parameters[0].type_descriptor = "u64".to_string();
        assert!(validate_registry(&registry, &ApiProfile::default()).is_err());
    }

    #[test]
    fn rejects_empty_type_and_bad_names() {
        let empty_type = bootstrap_registry()
            .with_command(Command::new("xrFoo", ReturnKind::Status).with_param("a", "  "));
        assert!(matches!(
            validate_registry(&empty_type, &ApiProfile::default()),
            Err(RegistryError::EmptyType { .. })
        ));

        let bad_param = bootstrap_registry()
            .with_command(Command::new("xrFoo", ReturnKind::Status).with_param("2d", "u32"));
        assert!(matches!(
            validate_registry(&bad_param, &ApiProfile::default()),
            Err(RegistryError::InvalidIdentifier { identifier, .. }) if identifier == "2d"
        ));

        let self_param = bootstrap_registry()
            .with_command(Command::new("xrFoo", ReturnKind::Status).with_param("self", "u32"));
        assert!(validate_registry(&self_param, &ApiProfile::default()).is_err());

        let keyword_command =
            bootstrap_registry().with_command(Command::new("match", ReturnKind::Status));
        assert!(validate_registry(&keyword_command, &ApiProfile::default()).is_err());
    }

    #[test]
    fn rejects_duplicate_parameter() {
        let registry = bootstrap_registry().with_command(
            Command::new("xrFoo", ReturnKind::Status)
                .with_param("a", "u32")
                .with_param("a", "u64"),
        );
        assert!(matches!(
            validate_registry(&registry, &ApiProfile::default()),
            Err(RegistryError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn keyword_parameters_are_accepted() {
        let registry = bootstrap_registry()
            .with_command(Command::new("xrFoo", ReturnKind::Status).with_param("type", "u32"));
        validate_registry(&registry, &ApiProfile::default()).unwrap();
    }

    #[test]
    fn extension_commands_need_declared_extension() {
        let registry = bootstrap_registry()
            .with_command(Command::new("xrFooEXT", ReturnKind::Status).with_extension("XR_EXT_foo"));
        assert!(matches!(
            validate_registry(&registry, &ApiProfile::default()),
            Err(RegistryError::UndeclaredExtension { extension, .. }) if extension == "XR_EXT_foo"
        ));
        validate_registry(&registry.with_extension("XR_EXT_foo"), &ApiProfile::default()).unwrap();
    }

    #[test]
    fn parse_reports_json_errors() {
        assert!(matches!(
            parse_registry("{not json", &ApiProfile::default()),
            Err(RegistryError::Parse(_))
        ));
    }
}
