//! Example API layer on top of generated dispatch.
//!
//! The build script generates the `minimal` target: `xrCreateSession` is
//! intercepted, `xrGetSystem` is resolved eagerly for the layer's own use.
//! [`DemoLayer`] counts created sessions and rejects session creation for
//! systems other than the one it looked up.

pub mod dispatch {
    #![allow(clippy::missing_safety_doc)]

    use crate::types::{XrInstanceCreateInfo, XrSession, XrSessionCreateInfo, XrSystemGetInfo, XrSystemId};
    use xrshim_membrane::{XrInstance, XrResult};

    include!(concat!(env!("OUT_DIR"), "/dispatch_decl.gen.rs"));
    include!(concat!(env!("OUT_DIR"), "/dispatch_defs.gen.rs"));
}

pub mod layer;
pub mod types;

pub use layer::{CreateInstanceFn, DemoLayer, create_layer_instance};
