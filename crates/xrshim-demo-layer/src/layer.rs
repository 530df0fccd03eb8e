use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use xrshim_membrane::{StatusCode, XrInstance, XrResult, debug_log};

use crate::dispatch::{self, LAYER_NAMESPACE, OpenXrApi, PFN_xrGetInstanceProcAddr, Upstream};
use crate::types::{
    XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY, XrInstanceCreateInfo, XrSession, XrSessionCreateInfo,
    XrSystemGetInfo, XrSystemId,
};

/// Next `xrCreateInstance` in the chain.
pub type CreateInstanceFn =
    unsafe extern "system" fn(*const XrInstanceCreateInfo, *mut XrInstance) -> XrResult;

#[derive(Default)]
pub struct DemoLayer {
    upstream: Upstream,
    sessions_created: AtomicU64,
    fault_next_session: AtomicBool,
}

impl DemoLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created.load(Ordering::Relaxed)
    }

    /// Make the next intercepted `xrCreateSession` panic inside the layer.
    pub fn inject_session_fault(&self) {
        self.fault_next_session.store(true, Ordering::Relaxed);
    }

    /// Head-mounted system of the bound instance, through the eagerly
    /// resolved upstream `xrGetSystem`.
    pub fn head_mounted_system(&self) -> Result<XrSystemId, XrResult> {
        let instance = self
            .upstream
            .instance()
            .ok_or(<XrResult as StatusCode>::GENERIC_FAILURE)?;
        let info = XrSystemGetInfo::new(XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY);
        let mut system_id = XrSystemId::default();
        let result = unsafe { self.upstream.xrGetSystem(instance, &info, &mut system_id) };
        if result.succeeded() {
            Ok(system_id)
        } else {
            Err(result)
        }
    }
}

impl OpenXrApi for DemoLayer {
    fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    unsafe fn xrCreateSession(
        &self,
        instance: XrInstance,
        create_info: *const XrSessionCreateInfo,
        session: *mut XrSession,
    ) -> XrResult {
        if create_info.is_null() || session.is_null() {
            return XrResult::ERROR_VALIDATION_FAILURE;
        }
        if self.fault_next_session.swap(false, Ordering::Relaxed) {
            panic!("injected xrCreateSession fault");
        }
        let requested = unsafe { (*create_info).system_id };
        match self.head_mounted_system() {
            Ok(system_id) if system_id == requested => {}
            Ok(_) => return XrResult::ERROR_VALIDATION_FAILURE,
            Err(status) => return status,
        }

        let result = unsafe { self.upstream.xrCreateSession(instance, create_info, session) };
        if result.succeeded() {
            let total = self.sessions_created.fetch_add(1, Ordering::Relaxed) + 1;
            debug_log!(LAYER_NAMESPACE, "session {:?} created ({total} so far)", unsafe {
                *session
            });
        }
        result
    }
}

/// Layer-side `xrCreateInstance`: create through the next layer, then hand the
/// new instance to `layer`.
///
/// # Safety
///
/// Both function pointers must be valid implementations; `create_info` and
/// `instance` must be valid for the duration of the call.
pub unsafe fn create_layer_instance(
    layer: Arc<DemoLayer>,
    next_create_instance: CreateInstanceFn,
    next_get_instance_proc_addr: PFN_xrGetInstanceProcAddr,
    create_info: *const XrInstanceCreateInfo,
    instance: *mut XrInstance,
) -> XrResult {
    if instance.is_null() {
        return XrResult::ERROR_VALIDATION_FAILURE;
    }
    let result = unsafe { next_create_instance(create_info, instance) };
    if !result.succeeded() {
        return result;
    }
    unsafe {
        dispatch::activate_layer(layer, next_get_instance_proc_addr, *instance, create_info)
    }
}
