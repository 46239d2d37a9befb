//! Diagnostics for remote dataplane calls.
//!
//! Every call issued by the manager produces one [`CallRecord`]. Records are
//! informational: observers cannot influence the outcome of the call.

use sonic_dataplane::api::interface::DELETE_SUBIF;
use sonic_dataplane::api::l2::{BRIDGE_DOMAIN_ADD_DEL, SW_INTERFACE_SET_L2_BRIDGE};
use sonic_dataplane::{BridgeDomainId, InterfaceIndex, SplitHorizonGroup};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Remote sub-operation issued by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataplaneOp {
    CreateBridgeDomain,
    DeleteBridgeDomain,
    AttachInterface,
    DetachInterface,
    DeleteSubInterface,
}

impl DataplaneOp {
    /// Returns the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataplaneOp::CreateBridgeDomain => "create_bridge_domain",
            DataplaneOp::DeleteBridgeDomain => "delete_bridge_domain",
            DataplaneOp::AttachInterface => "attach_interface",
            DataplaneOp::DetachInterface => "detach_interface",
            DataplaneOp::DeleteSubInterface => "delete_sub_interface",
        }
    }

    /// Returns the binary-API message carrying this operation.
    pub fn api(&self) -> &'static str {
        match self {
            DataplaneOp::CreateBridgeDomain | DataplaneOp::DeleteBridgeDomain => {
                BRIDGE_DOMAIN_ADD_DEL
            }
            DataplaneOp::AttachInterface | DataplaneOp::DetachInterface => {
                SW_INTERFACE_SET_L2_BRIDGE
            }
            DataplaneOp::DeleteSubInterface => DELETE_SUBIF,
        }
    }

    /// Returns true if the operation adds state to the dataplane.
    pub fn is_add(&self) -> bool {
        matches!(
            self,
            DataplaneOp::CreateBridgeDomain | DataplaneOp::AttachInterface
        )
    }
}

/// Outcome of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub op: DataplaneOp,
    /// Bridge domain affected; for a successful create, the allocated id
    pub bridge_domain: Option<BridgeDomainId>,
    pub interface: Option<InterfaceIndex>,
    pub split_horizon_group: Option<SplitHorizonGroup>,
    pub success: bool,
    pub duration: Duration,
}

impl CallRecord {
    pub(crate) fn new(op: DataplaneOp) -> Self {
        Self {
            op,
            bridge_domain: None,
            interface: None,
            split_horizon_group: None,
            success: false,
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn bridge_domain(mut self, bd_id: BridgeDomainId) -> Self {
        self.bridge_domain = Some(bd_id);
        self
    }

    pub(crate) fn interface(mut self, sw_if_index: InterfaceIndex) -> Self {
        self.interface = Some(sw_if_index);
        self
    }

    pub(crate) fn split_horizon_group(mut self, shg: SplitHorizonGroup) -> Self {
        self.split_horizon_group = Some(shg);
        self
    }
}

/// Diagnostic sink for remote calls.
pub trait CallObserver: Send + Sync {
    fn observe(&self, record: &CallRecord);
}

/// Logs every remote call through `tracing`.
///
/// Bridge-domain and membership calls log at info, sub-interface deletion
/// at debug, failures at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn observe(&self, record: &CallRecord) {
        let bridge_id = record.bridge_domain.map(|id| id.as_raw());
        let sw_if_index = record.interface.map(|idx| idx.as_raw());
        let shg = record.split_horizon_group.map(|shg| shg.as_raw());

        if !record.success {
            warn!(
                vppapi = record.op.api(),
                op = record.op.as_str(),
                bridge_id,
                sw_if_index,
                is_add = record.op.is_add(),
                duration = ?record.duration,
                "failed"
            );
            return;
        }

        match record.op {
            DataplaneOp::DeleteSubInterface => debug!(
                vppapi = record.op.api(),
                sw_if_index,
                duration = ?record.duration,
                "completed"
            ),
            _ => info!(
                vppapi = record.op.api(),
                bridge_id,
                sw_if_index,
                shg,
                is_add = record.op.is_add(),
                duration = ?record.duration,
                "completed"
            ),
        }
    }
}
