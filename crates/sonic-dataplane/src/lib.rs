//! Typed bindings for the L2 part of the dataplane binary API.
//!
//! This crate provides type-safe identifiers, return-value handling and the
//! control-client traits that the bridge-domain manager consumes. The
//! transport that actually encodes and sends messages lives outside this
//! workspace and implements [`L2Api`] and [`InterfaceApi`].
//!
//! # Architecture
//!
//! - [`types`]: Kind-tagged identifiers (interface index, bridge-domain id),
//!   split-horizon groups and bridge-domain flags
//! - [`error`]: API return values and error handling
//! - [`api`]: Request/reply messages and client traits
//!
//! # Example
//!
//! ```ignore
//! use sonic_dataplane::{BridgeDomainAddDel, BridgeDomainFlags, L2Api, DataplaneResult};
//!
//! async fn create(client: &impl L2Api) -> DataplaneResult<()> {
//!     let reply = client
//!         .bridge_domain_add_del(&BridgeDomainAddDel::create(BridgeDomainFlags::LEARNING_BRIDGE))
//!         .await?;
//!     println!("created bridge domain {}", reply.bd_id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod types;

pub use api::{
    BridgeDomainAddDel, BridgeDomainAddDelReply, DataplaneControlClient, DeleteSubif,
    InterfaceApi, L2Api, SwInterfaceSetL2Bridge,
};
pub use error::{ApiRetval, DataplaneError, DataplaneResult};
pub use types::{
    BridgeDomainFlags, BridgeDomainId, BridgeDomainKind, DataplaneId, DataplaneIdKind,
    InterfaceIndex, InterfaceKind, RawDataplaneId, SplitHorizonGroup,
};
