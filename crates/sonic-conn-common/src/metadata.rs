//! Per-connection metadata store.
//!
//! Pipeline stages hand values to each other through a typed key/value map
//! scoped to a connection id. Every connection has two maps: one for the
//! client-facing side and one for the server-facing side.
//!
//! Keys are types implementing [`MetadataKey`]; the associated `Value` type
//! fixes what may be stored under the key, so a load never needs a runtime
//! type check at the call site.
//!
//! # Example
//!
//! ```
//! use sonic_conn_common::{MetadataKey, MetadataStore};
//!
//! struct MtuKey;
//! impl MetadataKey for MtuKey {
//!     type Value = u32;
//! }
//!
//! let store = MetadataStore::new();
//! let conn = store.get_or_create("conn-1");
//!
//! conn.side(true).store::<MtuKey>(9000);
//! assert_eq!(conn.side(true).load::<MtuKey>(), Some(9000));
//! assert_eq!(conn.side(false).load::<MtuKey>(), None);
//! ```

use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A typed metadata key.
pub trait MetadataKey: 'static {
    /// The type of value stored under this key.
    type Value: Clone + Send + Sync + 'static;
}

/// Typed key/value map for one side of one connection.
///
/// Entries are only ever created by [`store`](Self::store) or
/// [`load_or_store`](Self::load_or_store); loads never create entries.
#[derive(Default)]
pub struct MetadataMap {
    inner: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl MetadataMap {
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under key `K`, replacing any previous value.
    pub fn store<K: MetadataKey>(&self, value: K::Value) {
        self.inner.write().insert(TypeId::of::<K>(), Box::new(value));
    }

    /// Returns a copy of the value stored under key `K`.
    pub fn load<K: MetadataKey>(&self) -> Option<K::Value> {
        self.inner
            .read()
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
            .cloned()
    }

    /// Removes the value stored under key `K`.
    pub fn delete<K: MetadataKey>(&self) {
        self.inner.write().remove(&TypeId::of::<K>());
    }

    /// Returns the existing value for `K` if present, otherwise stores and
    /// returns `value`.
    ///
    /// The boolean is true if the value was loaded, false if stored.
    pub fn load_or_store<K: MetadataKey>(&self, value: K::Value) -> (K::Value, bool) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner
            .get(&TypeId::of::<K>())
            .and_then(|existing| existing.downcast_ref::<K::Value>())
        {
            return (existing.clone(), true);
        }
        inner.insert(TypeId::of::<K>(), Box::new(value.clone()));
        (value, false)
    }

    /// Removes the value stored under key `K`, returning it if present.
    pub fn load_and_delete<K: MetadataKey>(&self) -> Option<K::Value> {
        self.inner
            .write()
            .remove(&TypeId::of::<K>())
            .and_then(|value| value.downcast::<K::Value>().ok())
            .map(|value| *value)
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl fmt::Debug for MetadataMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataMap").field("len", &self.len()).finish()
    }
}

/// Client-side and server-side metadata of one connection.
#[derive(Debug, Default)]
pub struct ConnectionMetadata {
    client: MetadataMap,
    server: MetadataMap,
}

impl ConnectionMetadata {
    /// Creates empty metadata for a connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the client-facing map if `is_client`, else the server-facing one.
    pub fn side(&self, is_client: bool) -> &MetadataMap {
        if is_client {
            &self.client
        } else {
            &self.server
        }
    }
}

/// Metadata of every live connection, keyed by connection id.
#[derive(Debug, Default)]
pub struct MetadataStore {
    connections: DashMap<String, Arc<ConnectionMetadata>>,
}

impl MetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metadata of `connection_id`, creating it if this is the
    /// first time the connection is seen.
    pub fn get_or_create(&self, connection_id: &str) -> Arc<ConnectionMetadata> {
        self.connections
            .entry(connection_id.to_string())
            .or_insert_with(|| {
                debug!(connection_id, "Created connection metadata");
                Arc::new(ConnectionMetadata::new())
            })
            .clone()
    }

    /// Returns the metadata of `connection_id` if it exists.
    ///
    /// **This never creates entries.**
    pub fn get(&self, connection_id: &str) -> Option<Arc<ConnectionMetadata>> {
        self.connections
            .get(connection_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Drops the metadata of a closed connection.
    pub fn remove(&self, connection_id: &str) -> Option<Arc<ConnectionMetadata>> {
        let removed = self.connections.remove(connection_id).map(|(_, meta)| meta);
        if removed.is_some() {
            debug!(connection_id, "Removed connection metadata");
        }
        removed
    }

    /// Returns the number of tracked connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if no connection is tracked.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct NameKey;
    impl MetadataKey for NameKey {
        type Value = String;
    }

    struct CountKey;
    impl MetadataKey for CountKey {
        type Value = u64;
    }

    #[test]
    fn test_store_and_load() {
        let map = MetadataMap::new();
        assert!(map.load::<NameKey>().is_none());

        map.store::<NameKey>("memif0".to_string());
        assert_eq!(map.load::<NameKey>(), Some("memif0".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_load_never_creates() {
        let map = MetadataMap::new();
        assert!(map.load::<CountKey>().is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let map = MetadataMap::new();
        map.store::<NameKey>("a".to_string());
        map.store::<CountKey>(3);

        map.delete::<NameKey>();
        assert!(map.load::<NameKey>().is_none());
        assert_eq!(map.load::<CountKey>(), Some(3));
    }

    #[test]
    fn test_load_or_store() {
        let map = MetadataMap::new();

        let (value, loaded) = map.load_or_store::<CountKey>(1);
        assert_eq!(value, 1);
        assert!(!loaded);

        let (value, loaded) = map.load_or_store::<CountKey>(2);
        assert_eq!(value, 1);
        assert!(loaded);
    }

    #[test]
    fn test_load_and_delete() {
        let map = MetadataMap::new();
        assert!(map.load_and_delete::<CountKey>().is_none());

        map.store::<CountKey>(7);
        assert_eq!(map.load_and_delete::<CountKey>(), Some(7));
        assert!(map.load::<CountKey>().is_none());
    }

    #[test]
    fn test_connection_sides_are_separate() {
        let meta = ConnectionMetadata::new();
        meta.side(true).store::<CountKey>(1);
        meta.side(false).store::<CountKey>(2);

        assert_eq!(meta.side(true).load::<CountKey>(), Some(1));
        assert_eq!(meta.side(false).load::<CountKey>(), Some(2));
    }

    #[test]
    fn test_store_get_or_create_shares_metadata() {
        let store = MetadataStore::new();
        assert!(store.get("conn-1").is_none());

        let first = store.get_or_create("conn-1");
        first.side(true).store::<CountKey>(5);

        let second = store.get_or_create("conn-1");
        assert_eq!(second.side(true).load::<CountKey>(), Some(5));
        assert_eq!(store.len(), 1);

        assert!(store.remove("conn-1").is_some());
        assert!(store.remove("conn-1").is_none());
        assert!(store.is_empty());
    }
}
