//! Address resolution through the next resolver in the chain.

use std::ffi::CStr;

use thiserror::Error;

use crate::status::{GetInstanceProcAddr, StatusCode, VoidFunction, XrInstance, XrResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("failed to resolve {name}: {status}")]
    Failed { name: String, status: XrResult },
    #[error("failed to resolve {name}: resolver returned a null address")]
    Null { name: String },
}

impl ResolveError {
    /// Status to report to the caller.
    #[must_use]
    pub fn status(&self) -> XrResult {
        match self {
            Self::Failed { status, .. } => *status,
            Self::Null { .. } => XrResult::GENERIC_FAILURE,
        }
    }
}

/// Resolve `name` against `instance`.
///
/// # Safety
///
/// `resolver` must be a valid `xrGetInstanceProcAddr` implementation.
pub unsafe fn resolve(
    resolver: GetInstanceProcAddr,
    instance: XrInstance,
    name: &CStr,
) -> Result<VoidFunction, ResolveError> {
    let mut function: Option<VoidFunction> = None;
    let status = unsafe { resolver(instance, name.as_ptr(), &mut function) };
    let owned_name = || name.to_string_lossy().into_owned();
    if !status.succeeded() {
        return Err(ResolveError::Failed {
            name: owned_name(),
            status,
        });
    }
    function.ok_or_else(|| ResolveError::Null { name: owned_name() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;

    unsafe extern "system" fn marker() {}

    unsafe extern "system" fn resolver(
        _instance: XrInstance,
        name: *const c_char,
        function: *mut Option<VoidFunction>,
    ) -> XrResult {
        let name = unsafe { CStr::from_ptr(name) };
        match name.to_bytes() {
            b"xrGood" => {
                unsafe { *function = Some(marker) };
                XrResult::SUCCESS
            }
            b"xrNull" => {
                unsafe { *function = None };
                XrResult::SUCCESS
            }
            _ => XrResult::ERROR_FUNCTION_UNSUPPORTED,
        }
    }

    #[test]
    fn resolves_known_name() {
        let address = unsafe { resolve(resolver, XrInstance(1), c"xrGood") }.unwrap();
        assert_eq!(address as usize, marker as usize);
    }

    #[test]
    fn failing_status_is_carried() {
        let err = unsafe { resolve(resolver, XrInstance(1), c"xrMissing") }.unwrap_err();
        assert_eq!(err.status(), XrResult::ERROR_FUNCTION_UNSUPPORTED);
        assert_eq!(
            err.to_string(),
            "failed to resolve xrMissing: XR_ERROR_FUNCTION_UNSUPPORTED(-7)"
        );
    }

    #[test]
    fn null_address_is_an_error() {
        let err = unsafe { resolve(resolver, XrInstance(1), c"xrNull") }.unwrap_err();
        assert_eq!(err, ResolveError::Null { name: "xrNull".to_string() });
        assert_eq!(err.status(), XrResult::ERROR_RUNTIME_FAILURE);
    }
}
