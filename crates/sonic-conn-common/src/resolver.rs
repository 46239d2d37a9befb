//! Interface resolution capability.

use sonic_dataplane::InterfaceIndex;

use crate::context::ConnectionContext;
use crate::ifindex;

/// Resolves the client-facing or server-facing interface of a connection.
///
/// Implementations must read the current value on every call; callers never
/// cache the result across invocations.
pub trait InterfaceResolver: Send + Sync {
    /// Returns the interface index for the given side, or `None` if an
    /// earlier stage has not provided it yet.
    fn resolve(&self, ctx: &ConnectionContext, is_client: bool) -> Option<InterfaceIndex>;
}

/// Resolves interfaces from the indices stored in connection metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataResolver;

impl InterfaceResolver for MetadataResolver {
    fn resolve(&self, ctx: &ConnectionContext, is_client: bool) -> Option<InterfaceIndex> {
        ifindex::load(ctx, is_client)
    }
}

impl<F> InterfaceResolver for F
where
    F: Fn(&ConnectionContext, bool) -> Option<InterfaceIndex> + Send + Sync,
{
    fn resolve(&self, ctx: &ConnectionContext, is_client: bool) -> Option<InterfaceIndex> {
        self(ctx, is_client)
    }
}
