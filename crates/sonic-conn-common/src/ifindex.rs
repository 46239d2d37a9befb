//! Interface-index accessors over connection metadata.
//!
//! The stage that creates an interface stores its index here; later stages
//! read it back for the same connection and side.

use sonic_dataplane::InterfaceIndex;

use crate::context::ConnectionContext;
use crate::metadata::MetadataKey;

/// Metadata key for the interface index of one connection side.
pub struct IfIndexKey;

impl MetadataKey for IfIndexKey {
    type Value = InterfaceIndex;
}

/// Stores the interface index for the given side.
pub fn store(ctx: &ConnectionContext, is_client: bool, index: InterfaceIndex) {
    ctx.metadata(is_client).store::<IfIndexKey>(index);
}

/// Returns the interface index stored for the given side.
pub fn load(ctx: &ConnectionContext, is_client: bool) -> Option<InterfaceIndex> {
    ctx.metadata(is_client).load::<IfIndexKey>()
}

/// Removes the interface index stored for the given side.
pub fn delete(ctx: &ConnectionContext, is_client: bool) {
    ctx.metadata(is_client).delete::<IfIndexKey>();
}

/// Returns the stored interface index if present, otherwise stores `index`.
///
/// The boolean is true if the value was loaded, false if stored.
pub fn load_or_store(
    ctx: &ConnectionContext,
    is_client: bool,
    index: InterfaceIndex,
) -> (InterfaceIndex, bool) {
    ctx.metadata(is_client).load_or_store::<IfIndexKey>(index)
}

/// Removes the interface index for the given side, returning it if present.
pub fn load_and_delete(ctx: &ConnectionContext, is_client: bool) -> Option<InterfaceIndex> {
    ctx.metadata(is_client).load_and_delete::<IfIndexKey>()
}
