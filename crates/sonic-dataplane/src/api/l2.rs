//! L2 bridging API.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::DataplaneResult;
use crate::types::{BridgeDomainFlags, BridgeDomainId, InterfaceIndex, SplitHorizonGroup};

/// Message name of the bridge-domain add/delete request.
pub const BRIDGE_DOMAIN_ADD_DEL: &str = "bridge_domain_add_del_v2";

/// Message name of the bridge membership request.
pub const SW_INTERFACE_SET_L2_BRIDGE: &str = "sw_interface_set_l2_bridge";

/// Creates or deletes a bridge domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeDomainAddDel {
    /// Bridge domain id; [`BridgeDomainId::SENTINEL`] on create lets the
    /// dataplane pick one
    pub bd_id: BridgeDomainId,
    /// true to create, false to delete
    pub is_add: bool,
    /// Forwarding behavior of the new domain
    pub flags: BridgeDomainFlags,
}

impl BridgeDomainAddDel {
    /// Request creation of a bridge domain with a dataplane-allocated id.
    pub fn create(flags: BridgeDomainFlags) -> Self {
        Self {
            bd_id: BridgeDomainId::SENTINEL,
            is_add: true,
            flags,
        }
    }

    /// Request deletion of an existing bridge domain.
    pub fn delete(bd_id: BridgeDomainId) -> Self {
        Self {
            bd_id,
            is_add: false,
            flags: BridgeDomainFlags::default(),
        }
    }
}

/// Reply to [`BridgeDomainAddDel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeDomainAddDelReply {
    /// Id of the created (or deleted) bridge domain
    pub bd_id: BridgeDomainId,
}

/// Adds an interface to, or removes it from, a bridge domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwInterfaceSetL2Bridge {
    pub rx_sw_if_index: InterfaceIndex,
    pub bd_id: BridgeDomainId,
    pub shg: SplitHorizonGroup,
    /// true to attach, false to detach
    pub enable: bool,
}

impl SwInterfaceSetL2Bridge {
    /// Attach `sw_if_index` to `bd_id` in split-horizon group `shg`.
    pub fn attach(sw_if_index: InterfaceIndex, bd_id: BridgeDomainId, shg: SplitHorizonGroup) -> Self {
        Self {
            rx_sw_if_index: sw_if_index,
            bd_id,
            shg,
            enable: true,
        }
    }

    /// Detach `sw_if_index` from `bd_id`.
    pub fn detach(sw_if_index: InterfaceIndex, bd_id: BridgeDomainId) -> Self {
        Self {
            rx_sw_if_index: sw_if_index,
            bd_id,
            shg: SplitHorizonGroup::NONE,
            enable: false,
        }
    }
}

/// L2 bridging calls of a dataplane control client.
///
/// Every call is a request/response round trip. Dropping the returned future
/// is how a caller cancels or times out a call.
#[async_trait]
pub trait L2Api: Send + Sync {
    /// Creates or deletes a bridge domain.
    async fn bridge_domain_add_del(
        &self,
        request: &BridgeDomainAddDel,
    ) -> DataplaneResult<BridgeDomainAddDelReply>;

    /// Sets or clears bridge membership of an interface.
    async fn sw_interface_set_l2_bridge(&self, request: &SwInterfaceSetL2Bridge) -> DataplaneResult<()>;
}

#[async_trait]
impl<T: L2Api + ?Sized> L2Api for Arc<T> {
    async fn bridge_domain_add_del(
        &self,
        request: &BridgeDomainAddDel,
    ) -> DataplaneResult<BridgeDomainAddDelReply> {
        (**self).bridge_domain_add_del(request).await
    }

    async fn sw_interface_set_l2_bridge(&self, request: &SwInterfaceSetL2Bridge) -> DataplaneResult<()> {
        (**self).sw_interface_set_l2_bridge(request).await
    }
}
