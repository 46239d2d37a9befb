//! Shared L2 bridge-domain lifecycle manager.
//!
//! Many connections terminate on the same client-facing interface ("hub").
//! This crate keeps one dataplane bridge domain per hub and bridges every
//! connection's server-facing interface into it:
//!
//! - [`L2BridgeDomain`]: Pipeline stage running the attach and detach paths
//! - [`BridgeDomainTable`]: Hub → bridge-domain mapping shared by all
//!   connections, with one critical section per hub
//! - [`InstrumentedClient`]: Dataplane client wrapper reporting every call to
//!   a [`CallObserver`] and [`L2BridgeStats`]
//! - [`L2BridgeConfig`]: Bridge-domain flags and split-horizon groups
//!
//! # Lifecycle
//!
//! 1. The first connect for a hub creates the bridge domain
//! 2. Each connect attaches the server-facing interface (split-horizon group
//!    1 by default) and the hub itself (group 0) if not yet attached
//! 3. Each disconnect detaches its server-facing interface
//! 4. When only the hub remains, the hub is detached, its sub-interface is
//!    deleted and the bridge domain is destroyed
//!
//! Each successful dataplane call is committed to the table immediately, so
//! a failure leaves the table matching the dataplane and the next attach or
//! detach resumes from there.

mod attach;
mod bridge_domain;
mod client;
mod config;
mod detach;
mod diag;
mod error;
mod stats;
mod table;
mod types;

pub use bridge_domain::{L2BridgeDomain, STAGE_NAME};
pub use client::InstrumentedClient;
pub use config::{ConfigError, L2BridgeConfig};
pub use diag::{CallObserver, CallRecord, DataplaneOp, TracingObserver};
pub use error::{L2BridgeError, L2BridgeResult};
pub use stats::{L2BridgeStats, L2BridgeStatsSnapshot};
pub use table::{BridgeDomainTable, RecordGuard};
pub use types::{BridgeDomainRecord, ClientKey};
