//! Signature rendering. Parameter order and type descriptors are copied from
//! the registry untouched.

use std::borrow::Cow;

use crate::model::Command;
use crate::registry::is_rust_keyword;

/// Spell `name` as a Rust identifier, using a raw identifier for keywords.
#[must_use]
pub fn ident(name: &str) -> Cow<'_, str> {
    if is_rust_keyword(name) {
        Cow::Owned(format!("r#{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// `a: A, b: B`
#[must_use]
pub fn params(command: &Command) -> String {
    command
        .parameters
        .iter()
        .map(|p| format!("{}: {}", ident(&p.name), p.type_descriptor))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `&self, a: A, b: B`
#[must_use]
pub fn method_params(command: &Command) -> String {
    if command.parameters.is_empty() {
        "&self".to_string()
    } else {
        format!("&self, {}", params(command))
    }
}

/// `a, b`
#[must_use]
pub fn args(command: &Command) -> String {
    command
        .parameters
        .iter()
        .map(|p| ident(&p.name).into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` -> XrResult` or nothing.
#[must_use]
pub fn ret(command: &Command, status_type: &str) -> String {
    if command.returns_status() {
        format!(" -> {status_type}")
    } else {
        String::new()
    }
}

/// `unsafe extern "system" fn(A, B) -> XrResult`
#[must_use]
pub fn fn_pointer(command: &Command, status_type: &str) -> String {
    let types = command
        .parameters
        .iter()
        .map(|p| p.type_descriptor.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "unsafe extern \"system\" fn({types}){}",
        ret(command, status_type)
    )
}

/// Name of the function-pointer alias for a command.
#[must_use]
pub fn pfn(name: &str) -> String {
    format!("PFN_{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReturnKind;

    fn locate_space() -> Command {
        Command::new("xrLocateSpace", ReturnKind::Status)
            .with_param("space", "XrSpace")
            .with_param("baseSpace", "XrSpace")
            .with_param("time", "XrTime")
            .with_param("location", "*mut XrSpaceLocation")
    }

    #[test]
    fn renders_params_in_registry_order() {
        let command = locate_space();
        assert_eq!(
            params(&command),
            "space: XrSpace, baseSpace: XrSpace, time: XrTime, location: *mut XrSpaceLocation"
        );
        assert_eq!(args(&command), "space, baseSpace, time, location");
        assert_eq!(
            fn_pointer(&command, "XrResult"),
            "unsafe extern \"system\" fn(XrSpace, XrSpace, XrTime, *mut XrSpaceLocation) -> XrResult"
        );
    }

    #[test]
    fn void_commands_have_no_return() {
        let command = Command::new("xrNotify", ReturnKind::None).with_param("value", "u32");
        assert_eq!(ret(&command, "XrResult"), "");
        assert_eq!(fn_pointer(&command, "XrResult"), "unsafe extern \"system\" fn(u32)");
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        let command = Command::new("xrTyped", ReturnKind::Status)
            .with_param("type", "XrStructureType")
            .with_param("next", "*const ::std::ffi::c_void");
        assert_eq!(params(&command), "r#type: XrStructureType, next: *const ::std::ffi::c_void");
        assert_eq!(args(&command), "r#type, next");
    }

    #[test]
    fn parameterless_method_takes_only_self() {
        let command = Command::new("xrTick", ReturnKind::None);
        assert_eq!(method_params(&command), "&self");
        assert_eq!(method_params(&locate_space()).split(", ").next(), Some("&self"));
    }
}
