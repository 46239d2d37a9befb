//! Disconnect path: detach the server-facing interface and tear the bridge
//! domain down once only the client-facing interface is left.
//!
//! Teardown order is client detach, sub-interface deletion, bridge-domain
//! deletion, record removal. The record is stored after every successful
//! remote step so a failed detach can be resumed by the next one. Between
//! the client detach and the sub-interface deletion the record carries the
//! sub-interface in `pending_subif`.

use sonic_dataplane::{DataplaneControlClient, InterfaceIndex};
use tracing::{debug, info};

use crate::client::InstrumentedClient;
use crate::error::{L2BridgeError, L2BridgeResult};
use crate::table::{BridgeDomainTable, RecordGuard};
use crate::types::{BridgeDomainRecord, ClientKey};

pub(crate) async fn detach<C: DataplaneControlClient>(
    table: &BridgeDomainTable,
    client: &InstrumentedClient<C>,
    client_if_index: InterfaceIndex,
    server_if_index: Option<InterfaceIndex>,
) -> L2BridgeResult<()> {
    let mut entry = table.lock(ClientKey::new(client_if_index)).await;

    let Some(mut record) = entry.load() else {
        debug!(%client_if_index, "No bridge domain to detach from");
        return Ok(());
    };

    if let Some(server_if_index) = server_if_index.filter(|idx| record.is_attached(*idx)) {
        client
            .detach_interface(server_if_index, record.id)
            .await
            .map_err(|source| L2BridgeError::DetachInterface {
                sw_if_index: server_if_index,
                bd_id: record.id,
                source,
            })?;
        record.detach(server_if_index);
        entry.store(record.clone());
    }

    if record.is_sole_member(client_if_index) {
        client
            .detach_interface(client_if_index, record.id)
            .await
            .map_err(|source| L2BridgeError::DetachInterface {
                sw_if_index: client_if_index,
                bd_id: record.id,
                source,
            })?;
        record.detach(client_if_index);
        record.pending_subif = Some(client_if_index);
        entry.store(record.clone());
        finish_teardown(&mut entry, client, record).await
    } else if record.is_empty() {
        // Left behind by an attach that failed right after creating the
        // domain, or by a teardown that failed after the client detach.
        finish_teardown(&mut entry, client, record).await
    } else {
        debug!(
            %client_if_index,
            bd_id = %record.id,
            members = record.len(),
            "Bridge domain still in use"
        );
        entry.store(record);
        Ok(())
    }
}

/// Deletes the pending sub-interface, if any, then the bridge domain and
/// its record. `record` must have no members.
async fn finish_teardown<C: DataplaneControlClient>(
    entry: &mut RecordGuard<'_>,
    client: &InstrumentedClient<C>,
    mut record: BridgeDomainRecord,
) -> L2BridgeResult<()> {
    if let Some(sw_if_index) = record.pending_subif {
        client
            .delete_sub_interface(sw_if_index)
            .await
            .map_err(|source| L2BridgeError::DeleteSubInterface { sw_if_index, source })?;
        record.pending_subif = None;
        entry.store(record.clone());
    }

    client
        .delete_bridge_domain(record.id)
        .await
        .map_err(|source| L2BridgeError::DeleteBridgeDomain {
            bd_id: record.id,
            source,
        })?;
    entry.delete();
    info!(key = %entry.key(), bd_id = %record.id, "Deleted bridge domain");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_dataplane::{BridgeDomainId, SplitHorizonGroup};
    use sonic_l2bridge_test::{CallKind, FakeDataplane};
    use std::sync::Arc;

    fn idx(raw: u32) -> InterfaceIndex {
        InterfaceIndex::new(raw)
    }

    /// Builds a domain on the fake with `members` attached and a matching
    /// record under `client`.
    async fn seed(
        table: &BridgeDomainTable,
        client: &InstrumentedClient<Arc<FakeDataplane>>,
        key: u32,
        members: &[u32],
    ) -> BridgeDomainId {
        let bd_id = client.create_bridge_domain(Default::default()).await.unwrap();
        let mut record = BridgeDomainRecord::new(bd_id);
        for member in members {
            client
                .attach_interface(idx(*member), bd_id, SplitHorizonGroup::NONE)
                .await
                .unwrap();
            record.attach(idx(*member));
        }
        table.lock(ClientKey::new(idx(key))).await.store(record);
        client.inner().clear_calls();
        bd_id
    }

    fn setup() -> (BridgeDomainTable, Arc<FakeDataplane>, InstrumentedClient<Arc<FakeDataplane>>) {
        let fake = Arc::new(FakeDataplane::with_first_bridge_id(5));
        let client = InstrumentedClient::new(Arc::clone(&fake));
        (BridgeDomainTable::new(), fake, client)
    }

    #[tokio::test]
    async fn test_absent_record_is_noop() {
        let (table, fake, client) = setup();
        detach(&table, &client, idx(10), Some(idx(20))).await.unwrap();
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_shared_domain_keeps_record() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10, 20, 21]).await;

        detach(&table, &client, idx(10), Some(idx(20))).await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_detach(idx(20)));
        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert_eq!(record.attached, [idx(10), idx(21)].into_iter().collect());
    }

    #[tokio::test]
    async fn test_last_server_tears_down_in_order() {
        let (table, fake, client) = setup();
        let bd_id = seed(&table, &client, 10, &[10, 20]).await;

        detach(&table, &client, idx(10), Some(idx(20))).await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[0].is_detach(idx(20)));
        assert!(calls[1].is_detach(idx(10)));
        assert!(calls[2].is_subif_delete(idx(10)));
        assert!(calls[3].is_bd_delete());
        assert!(table.is_empty().await);
        assert!(fake.bridge_domain(bd_id).is_none());
    }

    #[tokio::test]
    async fn test_unresolved_server_still_collects_lone_client() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10]).await;

        detach(&table, &client, idx(10), None).await.unwrap();

        assert_eq!(fake.count(CallKind::SetL2Bridge), 1);
        assert_eq!(fake.count(CallKind::DeleteSubif), 1);
        assert_eq!(fake.count(CallKind::BridgeDomainAddDel), 1);
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_server_is_not_detached() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10, 20]).await;

        detach(&table, &client, idx(10), Some(idx(99))).await.unwrap();

        assert!(fake.calls().is_empty());
        assert_eq!(table.get(&ClientKey::new(idx(10))).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_record_destroys_domain() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[]).await;

        detach(&table, &client, idx(10), Some(idx(20))).await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_bd_delete());
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_server_detach_failure_keeps_record() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10, 20]).await;
        fake.fail_next(CallKind::SetL2Bridge, -2);

        let err = detach(&table, &client, idx(10), Some(idx(20))).await.unwrap_err();
        assert_eq!(err.operation(), "detach_interface");
        assert_eq!(table.get(&ClientKey::new(idx(10))).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subif_delete_failure_is_retried() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10, 20]).await;
        fake.fail_next(CallKind::DeleteSubif, -1);

        let err = detach(&table, &client, idx(10), Some(idx(20))).await.unwrap_err();
        assert_eq!(err.operation(), "delete_sub_interface");
        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert!(record.is_empty());
        assert_eq!(record.pending_subif, Some(idx(10)));

        fake.clear_calls();
        detach(&table, &client, idx(10), None).await.unwrap();
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_subif_delete(idx(10)));
        assert!(calls[1].is_bd_delete());
        assert!(table.is_empty().await);
        assert!(fake.deleted_sub_interfaces().contains(&idx(10)));
    }

    #[tokio::test]
    async fn test_bd_delete_failure_resumes_on_next_detach() {
        let (table, fake, client) = setup();
        seed(&table, &client, 10, &[10, 20]).await;
        fake.fail_next(CallKind::BridgeDomainAddDel, -1);

        let err = detach(&table, &client, idx(10), Some(idx(20))).await.unwrap_err();
        assert_eq!(err.operation(), "delete_bridge_domain");
        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert!(record.is_empty());

        fake.clear_calls();
        detach(&table, &client, idx(10), Some(idx(20))).await.unwrap();
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_bd_delete());
        assert!(table.is_empty().await);
    }
}
