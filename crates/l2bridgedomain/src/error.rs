//! Error types for bridge-domain operations.
//!
//! Each remote sub-operation of the attach and detach paths has its own
//! variant, carrying the identifiers involved and the dataplane error as its
//! source.

use sonic_dataplane::{BridgeDomainId, DataplaneError, InterfaceIndex, SplitHorizonGroup};
use thiserror::Error;

/// Result type alias for bridge-domain operations.
pub type L2BridgeResult<T> = Result<T, L2BridgeError>;

/// Errors returned by attach and detach.
///
/// Progress committed before the failing call is kept; the caller may retry
/// the whole operation.
#[derive(Debug, Error)]
pub enum L2BridgeError {
    /// Creating the bridge domain for a client interface failed.
    #[error("Failed to create bridge domain for client interface {client_if_index}: {source}")]
    CreateBridgeDomain {
        /// The client interface the domain was created for.
        client_if_index: InterfaceIndex,
        #[source]
        source: DataplaneError,
    },

    /// Deleting a bridge domain failed.
    #[error("Failed to delete bridge domain {bd_id}: {source}")]
    DeleteBridgeDomain {
        bd_id: BridgeDomainId,
        #[source]
        source: DataplaneError,
    },

    /// Attaching an interface to a bridge domain failed.
    #[error("Failed to attach interface {sw_if_index} to bridge domain {bd_id} (shg {shg}): {source}")]
    AttachInterface {
        sw_if_index: InterfaceIndex,
        bd_id: BridgeDomainId,
        shg: SplitHorizonGroup,
        #[source]
        source: DataplaneError,
    },

    /// Detaching an interface from a bridge domain failed.
    #[error("Failed to detach interface {sw_if_index} from bridge domain {bd_id}: {source}")]
    DetachInterface {
        sw_if_index: InterfaceIndex,
        bd_id: BridgeDomainId,
        #[source]
        source: DataplaneError,
    },

    /// Deleting the client sub-interface failed.
    #[error("Failed to delete sub-interface {sw_if_index}: {source}")]
    DeleteSubInterface {
        sw_if_index: InterfaceIndex,
        #[source]
        source: DataplaneError,
    },
}

impl L2BridgeError {
    /// Returns the name of the failed sub-operation.
    pub fn operation(&self) -> &'static str {
        match self {
            L2BridgeError::CreateBridgeDomain { .. } => "create_bridge_domain",
            L2BridgeError::DeleteBridgeDomain { .. } => "delete_bridge_domain",
            L2BridgeError::AttachInterface { .. } => "attach_interface",
            L2BridgeError::DetachInterface { .. } => "detach_interface",
            L2BridgeError::DeleteSubInterface { .. } => "delete_sub_interface",
        }
    }

    /// Returns the underlying dataplane error.
    pub fn dataplane_error(&self) -> &DataplaneError {
        match self {
            L2BridgeError::CreateBridgeDomain { source, .. }
            | L2BridgeError::DeleteBridgeDomain { source, .. }
            | L2BridgeError::AttachInterface { source, .. }
            | L2BridgeError::DetachInterface { source, .. }
            | L2BridgeError::DeleteSubInterface { source, .. } => source,
        }
    }

    /// Returns true if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.dataplane_error().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = L2BridgeError::AttachInterface {
            sw_if_index: InterfaceIndex::new(20),
            bd_id: BridgeDomainId::new(5),
            shg: SplitHorizonGroup::new(1),
            source: DataplaneError::from_retval("sw_interface_set_l2_bridge", -2),
        };
        assert_eq!(
            err.to_string(),
            "Failed to attach interface 20 to bridge domain 5 (shg 1): \
             sw_interface_set_l2_bridge failed: VNET_API_ERROR_INVALID_SW_IF_INDEX"
        );
        assert_eq!(err.operation(), "attach_interface");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_retryable_follows_dataplane() {
        let err = L2BridgeError::DeleteSubInterface {
            sw_if_index: InterfaceIndex::new(10),
            source: DataplaneError::Timeout { api: "delete_subif" },
        };
        assert!(err.is_retryable());
        assert_eq!(err.operation(), "delete_sub_interface");

        let err = L2BridgeError::DeleteBridgeDomain {
            bd_id: BridgeDomainId::new(5),
            source: DataplaneError::from_retval("bridge_domain_add_del_v2", -6),
        };
        assert!(!err.is_retryable());
    }
}
