//! Shared bridge-domain table with per-key critical sections.
//!
//! Every key owns one async mutex. An attach or detach acquires it through
//! [`BridgeDomainTable::lock`] and holds the returned [`RecordGuard`] across
//! its whole load → decide → remote call → store sequence, so operations on
//! the same client interface run one at a time while operations on different
//! client interfaces run in parallel.
//!
//! The guard hands out copies of the record. A protocol mutates its copy and
//! stores it back explicitly after every successful remote step.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::{BridgeDomainRecord, ClientKey};

type Slot = Arc<Mutex<Option<BridgeDomainRecord>>>;

/// Client interface → bridge domain mapping shared by every connection.
///
/// The table is an owned instance; share it between pipeline stages with an
/// `Arc`.
#[derive(Debug, Default)]
pub struct BridgeDomainTable {
    slots: DashMap<ClientKey, Slot>,
}

impl BridgeDomainTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the critical section of `key`, waiting for any operation
    /// currently holding it.
    pub async fn lock(&self, key: ClientKey) -> RecordGuard<'_> {
        // The shard lock is released at the end of this statement, before
        // waiting on the slot.
        let slot = Arc::clone(self.slots.entry(key).or_default().value());
        let guard = slot.lock_owned().await;
        RecordGuard {
            table: self,
            key,
            guard,
        }
    }

    /// Returns a copy of the record for `key`.
    ///
    /// **This never creates entries.**
    pub async fn get(&self, key: &ClientKey) -> Option<BridgeDomainRecord> {
        let slot = self.slots.get(key).map(|slot| Arc::clone(slot.value()))?;
        let record = slot.lock().await.clone();
        record
    }

    /// Returns true if a record exists for `key`.
    pub async fn contains(&self, key: &ClientKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Returns copies of every record, ordered by key.
    pub async fn snapshot(&self) -> BTreeMap<ClientKey, BridgeDomainRecord> {
        let slots: Vec<(ClientKey, Slot)> = self
            .slots
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut records = BTreeMap::new();
        for (key, slot) in slots {
            if let Some(record) = slot.lock().await.clone() {
                records.insert(key, record);
            }
        }
        records
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    /// Returns true if no record is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Dumps every record as `key -> record` lines for debugging.
    pub async fn dump(&self) -> Vec<String> {
        self.snapshot()
            .await
            .iter()
            .map(|(key, record)| {
                let members: Vec<String> =
                    record.attached.iter().map(|idx| idx.to_string()).collect();
                format!("{} -> bd {} [{}]", key, record.id, members.join(", "))
            })
            .collect()
    }
}

/// Exclusive access to one key of a [`BridgeDomainTable`].
///
/// Dropping the guard leaves the critical section. When the key has no
/// record and nobody else is waiting on it, its slot is removed from the
/// table.
pub struct RecordGuard<'a> {
    table: &'a BridgeDomainTable,
    key: ClientKey,
    guard: OwnedMutexGuard<Option<BridgeDomainRecord>>,
}

impl RecordGuard<'_> {
    /// Returns the key this guard protects.
    pub fn key(&self) -> ClientKey {
        self.key
    }

    /// Returns a copy of the stored record.
    pub fn load(&self) -> Option<BridgeDomainRecord> {
        self.guard.clone()
    }

    /// Stores `record`, replacing the previous one.
    pub fn store(&mut self, record: BridgeDomainRecord) {
        *self.guard = Some(record);
    }

    /// Removes the record, returning it if present.
    pub fn delete(&mut self) -> Option<BridgeDomainRecord> {
        self.guard.take()
    }
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        if self.guard.is_none() {
            // Two references: the table's and the one inside our guard. Any
            // waiter holds a third, and new waiters need the shard lock that
            // remove_if holds.
            self.table
                .slots
                .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_dataplane::{BridgeDomainId, InterfaceIndex};
    use std::time::Duration;

    fn key(raw: u32) -> ClientKey {
        ClientKey::new(InterfaceIndex::new(raw))
    }

    fn record(id: u32, members: &[u32]) -> BridgeDomainRecord {
        let mut record = BridgeDomainRecord::new(BridgeDomainId::new(id));
        for member in members {
            record.attach(InterfaceIndex::new(*member));
        }
        record
    }

    #[tokio::test]
    async fn test_load_store_delete() {
        let table = BridgeDomainTable::new();
        assert!(table.get(&key(10)).await.is_none());

        {
            let mut entry = table.lock(key(10)).await;
            assert_eq!(entry.key(), key(10));
            assert!(entry.load().is_none());
            entry.store(record(5, &[20, 10]));
        }
        assert_eq!(table.get(&key(10)).await, Some(record(5, &[20, 10])));
        assert_eq!(table.len().await, 1);

        {
            let mut entry = table.lock(key(10)).await;
            assert_eq!(entry.delete(), Some(record(5, &[20, 10])));
        }
        assert!(table.is_empty().await);
        assert!(!table.contains(&key(10)).await);
    }

    #[tokio::test]
    async fn test_load_returns_copy() {
        let table = BridgeDomainTable::new();
        let mut entry = table.lock(key(10)).await;
        entry.store(record(5, &[20]));

        let mut copy = entry.load().unwrap();
        copy.attach(InterfaceIndex::new(21));
        assert_eq!(entry.load(), Some(record(5, &[20])));
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let table = BridgeDomainTable::new();
        assert!(table.get(&key(10)).await.is_none());
        assert!(table.slots.is_empty());
    }

    #[tokio::test]
    async fn test_empty_slot_is_pruned() {
        let table = BridgeDomainTable::new();
        {
            let entry = table.lock(key(10)).await;
            assert!(entry.load().is_none());
        }
        assert!(table.slots.is_empty());

        {
            let mut entry = table.lock(key(11)).await;
            entry.store(record(1, &[11]));
        }
        assert_eq!(table.slots.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_is_serialized() {
        let table = Arc::new(BridgeDomainTable::new());

        let mut handles = Vec::new();
        for member in 0..16u32 {
            let table = Arc::clone(&table);
            handles.push(tokio::spawn(async move {
                let mut entry = table.lock(key(10)).await;
                let mut current = entry.load().unwrap_or_else(|| record(5, &[]));
                tokio::time::sleep(Duration::from_millis(1)).await;
                current.attach(InterfaceIndex::new(100 + member));
                entry.store(current);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // A lost update would drop members.
        assert_eq!(table.get(&key(10)).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let table = BridgeDomainTable::new();
        let _held = table.lock(key(10)).await;

        let other = tokio::time::timeout(Duration::from_millis(100), table.lock(key(11))).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_dump_and_snapshot_order() {
        let table = BridgeDomainTable::new();
        table.lock(key(11)).await.store(record(6, &[30, 11]));
        table.lock(key(10)).await.store(record(5, &[20, 10]));

        let keys: Vec<ClientKey> = table.snapshot().await.into_keys().collect();
        assert_eq!(keys, vec![key(10), key(11)]);
        assert_eq!(
            table.dump().await,
            vec![
                "client-if 10 -> bd 5 [10, 20]".to_string(),
                "client-if 11 -> bd 6 [11, 30]".to_string(),
            ]
        );
    }
}
