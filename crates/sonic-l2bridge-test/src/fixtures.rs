//! Connection fixtures and test logging.

use sonic_conn_common::{ifindex, ConnectionContext, MetadataStore};
use sonic_dataplane::InterfaceIndex;
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing through the test harness.
///
/// Honors `RUST_LOG` and defaults to `debug`. Safe to call from every test.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Creates a connection whose client-side and server-side interface indices
/// are already resolved.
pub fn connection(store: &MetadataStore, connection_id: &str, client: u32, server: u32) -> ConnectionContext {
    let ctx = ConnectionContext::from_store(store, connection_id);
    ifindex::store(&ctx, true, InterfaceIndex::new(client));
    ifindex::store(&ctx, false, InterfaceIndex::new(server));
    ctx
}

/// Creates a connection with only the client-side interface resolved.
pub fn client_only_connection(store: &MetadataStore, connection_id: &str, client: u32) -> ConnectionContext {
    let ctx = ConnectionContext::from_store(store, connection_id);
    ifindex::store(&ctx, true, InterfaceIndex::new(client));
    ctx
}

/// Creates a connection with neither interface resolved.
pub fn unresolved_connection(store: &MetadataStore, connection_id: &str) -> ConnectionContext {
    ConnectionContext::from_store(store, connection_id)
}

/// Creates `count` connections sharing `client`, with server indices
/// `first_server`, `first_server + 1`, ...
pub fn hub_connections(
    store: &MetadataStore,
    client: u32,
    first_server: u32,
    count: u32,
) -> Vec<ConnectionContext> {
    (0..count)
        .map(|i| {
            let server = first_server + i;
            connection(store, &format!("conn-{}-{}", client, server), client, server)
        })
        .collect()
}
