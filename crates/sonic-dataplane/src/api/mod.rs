//! Control-client traits for the dataplane binary API.
//!
//! Each submodule groups the request/reply messages of one API area and the
//! trait a control client implements to issue them:
//!
//! - [`l2`]: Bridge-domain creation/deletion and bridge membership
//! - [`interface`]: Interface lifecycle (sub-interface deletion)
//!
//! [`DataplaneControlClient`] is the union of both traits and is what the
//! bridge-domain manager consumes.

pub mod interface;
pub mod l2;

pub use interface::{DeleteSubif, InterfaceApi};
pub use l2::{BridgeDomainAddDel, BridgeDomainAddDelReply, L2Api, SwInterfaceSetL2Bridge};

/// A client able to issue every call the bridge-domain manager needs.
///
/// Blanket-implemented for any type implementing both API traits.
pub trait DataplaneControlClient: L2Api + InterfaceApi {}

impl<T: L2Api + InterfaceApi + ?Sized> DataplaneControlClient for T {}
