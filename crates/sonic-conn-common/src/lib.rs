//! Common connection-pipeline abstractions.
//!
//! This crate provides the pieces every stage of the connection-provisioning
//! pipeline shares:
//!
//! - [`MetadataStore`]: Typed per-connection key/value store
//! - [`ConnectionContext`]: Context handed to a stage for one invocation
//! - [`ifindex`]: Interface-index accessors over connection metadata
//! - [`InterfaceResolver`]: Capability resolving a connection's interfaces
//! - [`ConnectionStage`]: Trait implemented by pipeline stages
//!
//! # Architecture
//!
//! 1. A connect request walks the pipeline stage by stage
//! 2. Stages that create dataplane interfaces record their indices in the
//!    connection's client-side or server-side metadata
//! 3. Later stages resolve those indices through an [`InterfaceResolver`]
//! 4. A disconnect walks the pipeline again, each stage undoing its work

mod context;
pub mod ifindex;
mod metadata;
mod resolver;
mod stage;

pub use context::ConnectionContext;
pub use metadata::{ConnectionMetadata, MetadataKey, MetadataMap, MetadataStore};
pub use resolver::{InterfaceResolver, MetadataResolver};
pub use stage::{ConnectionEvent, ConnectionStage};
