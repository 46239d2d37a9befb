//! Per-invocation connection context.

use std::sync::Arc;

use crate::metadata::{ConnectionMetadata, MetadataMap, MetadataStore};

/// Context handed to every pipeline stage for one connect/disconnect call.
///
/// Cloning is cheap; clones share the same connection metadata.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    connection_id: String,
    metadata: Arc<ConnectionMetadata>,
}

impl ConnectionContext {
    /// Creates a context over existing connection metadata.
    pub fn new(connection_id: impl Into<String>, metadata: Arc<ConnectionMetadata>) -> Self {
        Self {
            connection_id: connection_id.into(),
            metadata,
        }
    }

    /// Creates a context for `connection_id`, attaching to (or creating) its
    /// entry in `store`.
    pub fn from_store(store: &MetadataStore, connection_id: impl Into<String>) -> Self {
        let connection_id = connection_id.into();
        let metadata = store.get_or_create(&connection_id);
        Self {
            connection_id,
            metadata,
        }
    }

    /// Returns the connection id.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Returns the client-facing metadata if `is_client`, else the
    /// server-facing metadata.
    pub fn metadata(&self, is_client: bool) -> &MetadataMap {
        self.metadata.side(is_client)
    }
}
