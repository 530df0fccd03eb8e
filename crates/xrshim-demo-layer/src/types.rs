//! The slice of the OpenXR ABI the `minimal` target touches.

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XrSession(pub u64);

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XrSystemId(pub u64);

pub const XR_TYPE_INSTANCE_CREATE_INFO: u32 = 3;
pub const XR_TYPE_SYSTEM_GET_INFO: u32 = 4;
pub const XR_TYPE_SESSION_CREATE_INFO: u32 = 8;

pub const XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XrInstanceCreateInfo {
    pub ty: u32,
    pub create_flags: u64,
    pub enabled_extension_count: u32,
}

impl Default for XrInstanceCreateInfo {
    fn default() -> Self {
        Self {
            ty: XR_TYPE_INSTANCE_CREATE_INFO,
            create_flags: 0,
            enabled_extension_count: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XrSystemGetInfo {
    pub ty: u32,
    pub form_factor: u32,
}

impl XrSystemGetInfo {
    #[must_use]
    pub const fn new(form_factor: u32) -> Self {
        Self {
            ty: XR_TYPE_SYSTEM_GET_INFO,
            form_factor,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XrSessionCreateInfo {
    pub ty: u32,
    pub create_flags: u64,
    pub system_id: XrSystemId,
}

impl XrSessionCreateInfo {
    #[must_use]
    pub const fn new(system_id: XrSystemId) -> Self {
        Self {
            ty: XR_TYPE_SESSION_CREATE_INFO,
            create_flags: 0,
            system_id,
        }
    }
}
