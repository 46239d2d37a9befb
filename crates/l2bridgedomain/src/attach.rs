//! Connect path: make sure the bridge domain exists and both endpoints are
//! members.
//!
//! Each successful remote step is stored in the table before the next one
//! runs. A failure returns immediately and leaves the record exactly as far
//! as the dataplane got; nothing is rolled back.

use sonic_dataplane::{DataplaneControlClient, InterfaceIndex};
use tracing::{debug, info};

use crate::client::InstrumentedClient;
use crate::config::L2BridgeConfig;
use crate::error::{L2BridgeError, L2BridgeResult};
use crate::table::BridgeDomainTable;
use crate::types::{BridgeDomainRecord, ClientKey};

pub(crate) async fn attach<C: DataplaneControlClient>(
    table: &BridgeDomainTable,
    client: &InstrumentedClient<C>,
    config: &L2BridgeConfig,
    client_if_index: InterfaceIndex,
    server_if_index: InterfaceIndex,
) -> L2BridgeResult<()> {
    let mut entry = table.lock(ClientKey::new(client_if_index)).await;

    let mut record = match entry.load() {
        Some(record) => record,
        None => {
            let bd_id = client
                .create_bridge_domain(config.bridge_domain_flags)
                .await
                .map_err(|source| L2BridgeError::CreateBridgeDomain {
                    client_if_index,
                    source,
                })?;
            info!(%client_if_index, %bd_id, "Created bridge domain");

            let record = BridgeDomainRecord::new(bd_id);
            entry.store(record.clone());
            record
        }
    };

    if !record.is_attached(server_if_index) {
        let shg = config.server_split_horizon_group;
        client
            .attach_interface(server_if_index, record.id, shg)
            .await
            .map_err(|source| L2BridgeError::AttachInterface {
                sw_if_index: server_if_index,
                bd_id: record.id,
                shg,
                source,
            })?;
        record.attach(server_if_index);
        entry.store(record.clone());
    }

    if !record.is_attached(client_if_index) {
        let shg = config.client_split_horizon_group;
        client
            .attach_interface(client_if_index, record.id, shg)
            .await
            .map_err(|source| L2BridgeError::AttachInterface {
                sw_if_index: client_if_index,
                bd_id: record.id,
                shg,
                source,
            })?;
        record.attach(client_if_index);
        // Back in use; the sub-interface must survive.
        if record.pending_subif == Some(client_if_index) {
            record.pending_subif = None;
        }
        entry.store(record.clone());
    }

    debug!(
        %client_if_index,
        %server_if_index,
        bd_id = %record.id,
        members = record.len(),
        "Bridge domain attached"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_dataplane::{BridgeDomainFlags, BridgeDomainId, SplitHorizonGroup};
    use sonic_l2bridge_test::{CallKind, DataplaneCall, FakeDataplane};
    use std::sync::Arc;

    fn idx(raw: u32) -> InterfaceIndex {
        InterfaceIndex::new(raw)
    }

    fn setup(first_bd: u32) -> (BridgeDomainTable, Arc<FakeDataplane>, InstrumentedClient<Arc<FakeDataplane>>) {
        let fake = Arc::new(FakeDataplane::with_first_bridge_id(first_bd));
        let client = InstrumentedClient::new(Arc::clone(&fake));
        (BridgeDomainTable::new(), fake, client)
    }

    #[tokio::test]
    async fn test_first_attach_creates_and_attaches_in_order() {
        let (table, fake, client) = setup(5);
        let config = L2BridgeConfig::default();

        attach(&table, &client, &config, idx(10), idx(20)).await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(
            calls[0],
            DataplaneCall::BridgeDomainAddDel(req) if req.is_add && req.flags == BridgeDomainFlags::LEARNING_BRIDGE
        ));
        assert!(calls[1].is_attach(idx(20)));
        assert!(calls[2].is_attach(idx(10)));

        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert_eq!(record.id, BridgeDomainId::new(5));
        assert_eq!(record.attached, [idx(10), idx(20)].into_iter().collect());
    }

    #[tokio::test]
    async fn test_split_horizon_groups() {
        let (table, fake, client) = setup(1);
        let config = L2BridgeConfig::default();

        attach(&table, &client, &config, idx(10), idx(20)).await.unwrap();

        let members = fake.bridge_domain(BridgeDomainId::new(1)).unwrap();
        assert_eq!(members[&idx(20)], config.server_split_horizon_group);
        assert_eq!(members[&idx(10)], SplitHorizonGroup::NONE);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_no_record() {
        let (table, fake, client) = setup(1);
        fake.fail_next(CallKind::BridgeDomainAddDel, -1);

        let err = attach(&table, &client, &L2BridgeConfig::default(), idx(10), idx(20))
            .await
            .unwrap_err();
        assert_eq!(err.operation(), "create_bridge_domain");
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_reattach_cancels_pending_subif_deletion() {
        let (table, fake, client) = setup(1);
        let config = L2BridgeConfig::default();
        attach(&table, &client, &config, idx(10), idx(20)).await.unwrap();

        // Teardown stopped after the client detach.
        client.detach_interface(idx(20), BridgeDomainId::new(1)).await.unwrap();
        client.detach_interface(idx(10), BridgeDomainId::new(1)).await.unwrap();
        let mut record = BridgeDomainRecord::new(BridgeDomainId::new(1));
        record.pending_subif = Some(idx(10));
        table.lock(ClientKey::new(idx(10))).await.store(record);
        fake.clear_calls();

        attach(&table, &client, &config, idx(10), idx(21)).await.unwrap();

        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert_eq!(record.attached, [idx(10), idx(21)].into_iter().collect());
        assert_eq!(record.pending_subif, None);
        assert_eq!(fake.count(CallKind::BridgeDomainAddDel), 0);
        assert!(fake.deleted_sub_interfaces().is_empty());
    }

    #[tokio::test]
    async fn test_resume_after_client_attach_failure() {
        let (table, fake, client) = setup(1);
        let config = L2BridgeConfig::default();
        fake.fail_next_matching(|call| call.is_attach(InterfaceIndex::new(10)), -2);

        let err = attach(&table, &client, &config, idx(10), idx(20)).await.unwrap_err();
        assert!(matches!(
            err,
            L2BridgeError::AttachInterface { sw_if_index, .. } if sw_if_index == idx(10)
        ));
        let record = table.get(&ClientKey::new(idx(10))).await.unwrap();
        assert_eq!(record.attached, [idx(20)].into_iter().collect());

        // Retry only issues the missing step.
        let before = fake.calls().len();
        attach(&table, &client, &config, idx(10), idx(20)).await.unwrap();
        let calls = fake.calls();
        assert_eq!(calls.len(), before + 1);
        assert!(calls[before].is_attach(idx(10)));
        assert_eq!(fake.count(CallKind::BridgeDomainAddDel), 1);
    }
}
