//! Status codes and handle types of the loader ABI.

use std::ffi::c_char;
use std::fmt;

/// Status enumeration returned by `status` commands.
pub trait StatusCode: Copy + fmt::Debug {
    const SUCCESS: Self;
    /// Reported when a layer fails without a more specific status.
    const GENERIC_FAILURE: Self;

    fn succeeded(self) -> bool;
}

/// OpenXR `XrResult`. Non-negative values are successes.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct XrResult(pub i32);

impl XrResult {
    pub const SUCCESS: Self = Self(0);
    pub const TIMEOUT_EXPIRED: Self = Self(1);
    pub const ERROR_VALIDATION_FAILURE: Self = Self(-1);
    pub const ERROR_RUNTIME_FAILURE: Self = Self(-2);
    pub const ERROR_OUT_OF_MEMORY: Self = Self(-3);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-6);
    pub const ERROR_FUNCTION_UNSUPPORTED: Self = Self(-7);
    pub const ERROR_HANDLE_INVALID: Self = Self(-12);

    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "XR_SUCCESS",
            1 => "XR_TIMEOUT_EXPIRED",
            -1 => "XR_ERROR_VALIDATION_FAILURE",
            -2 => "XR_ERROR_RUNTIME_FAILURE",
            -3 => "XR_ERROR_OUT_OF_MEMORY",
            -6 => "XR_ERROR_INITIALIZATION_FAILED",
            -7 => "XR_ERROR_FUNCTION_UNSUPPORTED",
            -12 => "XR_ERROR_HANDLE_INVALID",
            _ => return None,
        })
    }
}

impl StatusCode for XrResult {
    const SUCCESS: Self = Self::SUCCESS;
    const GENERIC_FAILURE: Self = Self::ERROR_RUNTIME_FAILURE;

    fn succeeded(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Debug for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "XrResult({})", self.0),
        }
    }
}

impl fmt::Display for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// OpenXR instance handle.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XrInstance(pub u64);

impl XrInstance {
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Untyped entry point as returned by address resolution.
pub type VoidFunction = unsafe extern "system" fn();

/// `xrGetInstanceProcAddr`.
pub type GetInstanceProcAddr =
    unsafe extern "system" fn(XrInstance, *const c_char, *mut Option<VoidFunction>) -> XrResult;
