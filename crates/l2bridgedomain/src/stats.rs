//! Counters of remote calls issued by the manager.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::diag::{CallRecord, DataplaneOp};

/// Atomic counters updated after every remote call.
#[derive(Debug, Default)]
pub struct L2BridgeStats {
    domains_created: AtomicU64,
    domains_deleted: AtomicU64,
    interfaces_attached: AtomicU64,
    interfaces_detached: AtomicU64,
    sub_interfaces_deleted: AtomicU64,
    failed_calls: AtomicU64,
}

/// Point-in-time copy of [`L2BridgeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct L2BridgeStatsSnapshot {
    pub domains_created: u64,
    pub domains_deleted: u64,
    pub interfaces_attached: u64,
    pub interfaces_detached: u64,
    pub sub_interfaces_deleted: u64,
    pub failed_calls: u64,
}

impl L2BridgeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one finished call.
    pub fn record(&self, call: &CallRecord) {
        let counter = if !call.success {
            &self.failed_calls
        } else {
            match call.op {
                DataplaneOp::CreateBridgeDomain => &self.domains_created,
                DataplaneOp::DeleteBridgeDomain => &self.domains_deleted,
                DataplaneOp::AttachInterface => &self.interfaces_attached,
                DataplaneOp::DetachInterface => &self.interfaces_detached,
                DataplaneOp::DeleteSubInterface => &self.sub_interfaces_deleted,
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> L2BridgeStatsSnapshot {
        L2BridgeStatsSnapshot {
            domains_created: self.domains_created.load(Ordering::Relaxed),
            domains_deleted: self.domains_deleted.load(Ordering::Relaxed),
            interfaces_attached: self.interfaces_attached.load(Ordering::Relaxed),
            interfaces_detached: self.interfaces_detached.load(Ordering::Relaxed),
            sub_interfaces_deleted: self.sub_interfaces_deleted.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
        }
    }
}

impl L2BridgeStatsSnapshot {
    /// Bridge domains created and not yet deleted.
    pub fn live_domains(&self) -> u64 {
        self.domains_created.saturating_sub(self.domains_deleted)
    }
}
