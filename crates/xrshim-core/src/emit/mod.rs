//! Shim emission.
//!
//! [`generate`] is a pure function of (registry, configuration set, profile):
//! identical inputs always yield byte-identical units. Both units are Rust item
//! lists meant to be `include!`d side by side into one module of a layer crate
//! that has the runtime crate, the status type and the registry's parameter
//! types in scope.

mod declarations;
mod definitions;
pub mod signature;
pub mod writer;

use crate::config::ConfigurationSet;
use crate::error::GenerateError;
use crate::model::Registry;
use crate::profile::ApiProfile;
use crate::registry::{BootstrapCommands, bootstrap_commands, validate_registry};
use crate::select::{SelectedCommand, select};

use writer::SourceWriter;

/// The two generated source units of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnits {
    /// Function-pointer aliases, the upstream table and the base trait.
    pub declarations: String,
    /// Trampolines, the substitution table and the creation hook.
    pub definitions: String,
    /// BLAKE3 over the inputs, as stamped into both banners.
    pub fingerprint: String,
}

/// Validate the inputs and emit both units.
///
/// Nothing is emitted when the registry or the configuration is rejected.
pub fn generate(
    registry: &Registry,
    config: &ConfigurationSet,
    profile: &ApiProfile,
) -> Result<GeneratedUnits, GenerateError> {
    validate_registry(registry, profile)?;
    let boot = bootstrap_commands(registry, profile)?;
    let selected = select(registry, config, profile)?;
    let fingerprint = input_fingerprint(registry, config, profile);

    let ctx = EmitContext {
        registry,
        profile,
        boot,
        selected: &selected,
        fingerprint: &fingerprint,
    };
    let declarations = declarations::emit(&ctx);
    let definitions = definitions::emit(&ctx);
    Ok(GeneratedUnits {
        declarations,
        definitions,
        fingerprint,
    })
}

/// Hex BLAKE3 digest over every input that influences emitted text.
#[must_use]
pub fn input_fingerprint(
    registry: &Registry,
    config: &ConfigurationSet,
    profile: &ApiProfile,
) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut field = |bytes: &[u8]| {
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };

    field(registry.api.as_bytes());
    field(registry.version.as_bytes());
    for command in &registry.commands {
        field(command.name.as_bytes());
        field(command.return_kind.as_str().as_bytes());
        field(command.extension.as_deref().unwrap_or("").as_bytes());
        for param in &command.parameters {
            field(param.name.as_bytes());
            field(param.type_descriptor.as_bytes());
        }
        field(b";");
    }
    for list in [
        &config.override_functions,
        &config.requested_functions,
        &config.extensions,
    ] {
        for name in list {
            field(name.as_bytes());
        }
        field(b";");
    }
    for name in profile.bootstrap.all() {
        field(name.as_bytes());
    }
    field(profile.status_type.as_bytes());
    field(profile.trait_name.as_bytes());
    field(profile.runtime_crate.as_bytes());
    field(profile.namespace_token.as_bytes());

    hasher.finalize().to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Shared emission context
// ---------------------------------------------------------------------------

struct EmitContext<'a> {
    registry: &'a Registry,
    profile: &'a ApiProfile,
    boot: BootstrapCommands<'a>,
    selected: &'a [SelectedCommand<'a>],
    fingerprint: &'a str,
}

impl EmitContext<'_> {
    fn rt(&self) -> &str {
        &self.profile.runtime_crate
    }

    fn status(&self) -> &str {
        &self.profile.status_type
    }

    /// Type of the instance handle, taken from the resolver's first parameter.
    fn instance_type(&self) -> &str {
        &self.boot.get_instance_proc_addr.parameters[0].type_descriptor
    }

    fn generic_failure(&self) -> String {
        format!("<{} as {}::StatusCode>::GENERIC_FAILURE", self.status(), self.rt())
    }

    fn success(&self) -> String {
        format!("<{} as {}::StatusCode>::SUCCESS", self.status(), self.rt())
    }

    fn succeeded(&self, expr: &str) -> String {
        format!("{}::StatusCode::succeeded({expr})", self.rt())
    }

    fn banner(&self, w: &mut SourceWriter, unit: &str) {
        w.line(&format!(
            "// @generated by xrshim from {} {}: {unit} unit.",
            self.registry.api, self.registry.version
        ));
        w.line("// Do not edit. Regenerate from the registry and the layer configuration.");
        w.line(&format!("// input fingerprint: blake3:{}", self.fingerprint));
        w.blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::model::{Command, ReturnKind};

    fn registry() -> Registry {
        Registry::new("OpenXR", "1.0.34")
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
            .with_command(
                Command::new("xrGetSystem", ReturnKind::Status)
                    .with_param("instance", "XrInstance")
                    .with_param("getInfo", "*const XrSystemGetInfo")
                    .with_param("systemId", "*mut XrSystemId"),
            )
    }

    #[test]
    fn fingerprint_tracks_every_input() {
        let registry = registry();
        let config = ConfigurationSet::new(Vec::<String>::new(), ["xrGetSystem"]);
        let profile = ApiProfile::default();
        let base = input_fingerprint(&registry, &config, &profile);
        assert_eq!(base.len(), 64);
        assert_eq!(base, input_fingerprint(&registry, &config, &profile));

        let moved = ConfigurationSet::new(["xrGetSystem"], Vec::<String>::new());
        assert_ne!(base, input_fingerprint(&registry, &moved, &profile));

        let mut retyped = registry.clone();
        retyped.commands[3].parameters[2].type_descriptor = "*mut u64".to_string();
        assert_ne!(base, input_fingerprint(&retyped, &config, &profile));

        let renamed = profile.with_trait_name("LayerApi");
        assert_ne!(base, input_fingerprint(&registry, &config, &renamed));
    }

    #[test]
    fn banners_carry_fingerprint() {
        let registry = registry();
        let config = ConfigurationSet::new(Vec::<String>::new(), ["xrGetSystem"]);
        let units = generate(&registry, &config, &ApiProfile::default()).unwrap();
        let stamp = format!("// input fingerprint: blake3:{}", units.fingerprint);
        assert!(units.declarations.starts_with("// @generated by xrshim from OpenXR 1.0.34"));
        assert!(units.declarations.contains(&stamp));
        assert!(units.definitions.contains(&stamp));
    }

    #[test]
    fn rejected_configuration_emits_nothing() {
        let registry = registry();
        let config = ConfigurationSet::new(["xrGetInstanceProcAddr"], Vec::<String>::new());
        let err = generate(&registry, &config, &ApiProfile::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Config(ConfigError::BootstrapListed { .. })
        ));
    }

    #[test]
    fn rejected_registry_emits_nothing() {
        let mut registry = registry();
        registry.commands.remove(0);
        let err = generate(&registry, &ConfigurationSet::default(), &ApiProfile::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::Registry(_)));
    }
}
