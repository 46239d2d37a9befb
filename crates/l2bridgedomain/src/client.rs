//! Instrumented wrapper around the dataplane control client.
//!
//! The wrapper issues exactly one request per method, never retries, and
//! reports every outcome to the configured [`CallObserver`] and to
//! [`L2BridgeStats`].

use sonic_dataplane::{
    BridgeDomainAddDel, BridgeDomainFlags, BridgeDomainId, DataplaneControlClient,
    DataplaneResult, DeleteSubif, InterfaceIndex, SplitHorizonGroup, SwInterfaceSetL2Bridge,
};
use std::sync::Arc;
use std::time::Instant;

use crate::diag::{CallObserver, CallRecord, DataplaneOp, TracingObserver};
use crate::stats::L2BridgeStats;

/// Dataplane client that times and reports every call.
pub struct InstrumentedClient<C> {
    inner: C,
    observer: Arc<dyn CallObserver>,
    stats: L2BridgeStats,
}

impl<C: DataplaneControlClient> InstrumentedClient<C> {
    /// Wraps `inner`, logging calls through [`TracingObserver`].
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            observer: Arc::new(TracingObserver),
            stats: L2BridgeStats::new(),
        }
    }

    /// Replaces the diagnostic sink.
    pub fn with_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns the call counters.
    pub fn stats(&self) -> &L2BridgeStats {
        &self.stats
    }

    /// Creates a bridge domain, letting the dataplane allocate its id.
    pub async fn create_bridge_domain(&self, flags: BridgeDomainFlags) -> DataplaneResult<BridgeDomainId> {
        let start = Instant::now();
        let result = self
            .inner
            .bridge_domain_add_del(&BridgeDomainAddDel::create(flags))
            .await
            .map(|reply| reply.bd_id);

        let mut record = CallRecord::new(DataplaneOp::CreateBridgeDomain);
        if let Ok(bd_id) = &result {
            record = record.bridge_domain(*bd_id);
        }
        self.finish(record, start, result.is_ok());
        result
    }

    /// Deletes a bridge domain.
    pub async fn delete_bridge_domain(&self, bd_id: BridgeDomainId) -> DataplaneResult<()> {
        let start = Instant::now();
        let result = self
            .inner
            .bridge_domain_add_del(&BridgeDomainAddDel::delete(bd_id))
            .await
            .map(|_| ());

        let record = CallRecord::new(DataplaneOp::DeleteBridgeDomain).bridge_domain(bd_id);
        self.finish(record, start, result.is_ok());
        result
    }

    /// Attaches `sw_if_index` to `bd_id` in split-horizon group `shg`.
    pub async fn attach_interface(
        &self,
        sw_if_index: InterfaceIndex,
        bd_id: BridgeDomainId,
        shg: SplitHorizonGroup,
    ) -> DataplaneResult<()> {
        let start = Instant::now();
        let result = self
            .inner
            .sw_interface_set_l2_bridge(&SwInterfaceSetL2Bridge::attach(sw_if_index, bd_id, shg))
            .await;

        let record = CallRecord::new(DataplaneOp::AttachInterface)
            .bridge_domain(bd_id)
            .interface(sw_if_index)
            .split_horizon_group(shg);
        self.finish(record, start, result.is_ok());
        result
    }

    /// Detaches `sw_if_index` from `bd_id`.
    pub async fn detach_interface(&self, sw_if_index: InterfaceIndex, bd_id: BridgeDomainId) -> DataplaneResult<()> {
        let start = Instant::now();
        let result = self
            .inner
            .sw_interface_set_l2_bridge(&SwInterfaceSetL2Bridge::detach(sw_if_index, bd_id))
            .await;

        let record = CallRecord::new(DataplaneOp::DetachInterface)
            .bridge_domain(bd_id)
            .interface(sw_if_index);
        self.finish(record, start, result.is_ok());
        result
    }

    /// Deletes the sub-interface `sw_if_index`.
    pub async fn delete_sub_interface(&self, sw_if_index: InterfaceIndex) -> DataplaneResult<()> {
        let start = Instant::now();
        let result = self.inner.delete_subif(&DeleteSubif::new(sw_if_index)).await;

        let record = CallRecord::new(DataplaneOp::DeleteSubInterface).interface(sw_if_index);
        self.finish(record, start, result.is_ok());
        result
    }

    fn finish(&self, mut record: CallRecord, start: Instant, success: bool) {
        record.success = success;
        record.duration = start.elapsed();
        self.stats.record(&record);
        self.observer.observe(&record);
    }
}
