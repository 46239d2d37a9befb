//! In-memory dataplane for exercising the bridge-domain manager.
//!
//! [`FakeDataplane`] keeps bridge domains, their members and deleted
//! sub-interfaces, records every request in order (failed ones included),
//! and can be told to fail upcoming requests with a given return value.
//!
//! Requests are validated the way the real dataplane would: deleting a
//! bridge domain that still has members, attaching to a missing domain,
//! detaching a non-member or deleting a sub-interface twice all fail.

use async_trait::async_trait;
use parking_lot::Mutex;
use sonic_dataplane::api::interface::DELETE_SUBIF;
use sonic_dataplane::api::l2::{BRIDGE_DOMAIN_ADD_DEL, SW_INTERFACE_SET_L2_BRIDGE};
use sonic_dataplane::{
    ApiRetval, BridgeDomainAddDel, BridgeDomainAddDelReply, BridgeDomainId, DataplaneError,
    DataplaneResult, DeleteSubif, InterfaceApi, InterfaceIndex, L2Api, SplitHorizonGroup,
    SwInterfaceSetL2Bridge,
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::debug;

/// Members of one bridge domain and their split-horizon groups.
pub type Members = BTreeMap<InterfaceIndex, SplitHorizonGroup>;

/// A request received by [`FakeDataplane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataplaneCall {
    BridgeDomainAddDel(BridgeDomainAddDel),
    SetL2Bridge(SwInterfaceSetL2Bridge),
    DeleteSubif(DeleteSubif),
}

/// Request kind, used to target fault injection and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    BridgeDomainAddDel,
    SetL2Bridge,
    DeleteSubif,
}

impl CallKind {
    /// Returns the API message name.
    pub fn api(&self) -> &'static str {
        match self {
            CallKind::BridgeDomainAddDel => BRIDGE_DOMAIN_ADD_DEL,
            CallKind::SetL2Bridge => SW_INTERFACE_SET_L2_BRIDGE,
            CallKind::DeleteSubif => DELETE_SUBIF,
        }
    }
}

impl DataplaneCall {
    pub fn kind(&self) -> CallKind {
        match self {
            DataplaneCall::BridgeDomainAddDel(_) => CallKind::BridgeDomainAddDel,
            DataplaneCall::SetL2Bridge(_) => CallKind::SetL2Bridge,
            DataplaneCall::DeleteSubif(_) => CallKind::DeleteSubif,
        }
    }

    /// Bridge-domain creation.
    pub fn is_create(&self) -> bool {
        matches!(self, DataplaneCall::BridgeDomainAddDel(req) if req.is_add)
    }

    /// Bridge-domain deletion.
    pub fn is_bd_delete(&self) -> bool {
        matches!(self, DataplaneCall::BridgeDomainAddDel(req) if !req.is_add)
    }

    /// Attach of `sw_if_index` to any bridge domain.
    pub fn is_attach(&self, sw_if_index: InterfaceIndex) -> bool {
        matches!(
            self,
            DataplaneCall::SetL2Bridge(req) if req.enable && req.rx_sw_if_index == sw_if_index
        )
    }

    /// Detach of `sw_if_index` from any bridge domain.
    pub fn is_detach(&self, sw_if_index: InterfaceIndex) -> bool {
        matches!(
            self,
            DataplaneCall::SetL2Bridge(req) if !req.enable && req.rx_sw_if_index == sw_if_index
        )
    }

    /// Deletion of sub-interface `sw_if_index`.
    pub fn is_subif_delete(&self, sw_if_index: InterfaceIndex) -> bool {
        matches!(self, DataplaneCall::DeleteSubif(req) if req.sw_if_index == sw_if_index)
    }
}

type CallMatcher = Box<dyn Fn(&DataplaneCall) -> bool + Send + Sync>;

struct Fault {
    matcher: CallMatcher,
    retval: i32,
    persistent: bool,
}

struct State {
    next_bd_id: u32,
    bridge_domains: BTreeMap<BridgeDomainId, Members>,
    deleted_subifs: BTreeSet<InterfaceIndex>,
    calls: Vec<DataplaneCall>,
    faults: Vec<Fault>,
}

impl State {
    /// Returns the return value of the first matching fault, consuming it
    /// unless persistent.
    fn take_fault(&mut self, call: &DataplaneCall) -> Option<i32> {
        let pos = self.faults.iter().position(|fault| (fault.matcher)(call))?;
        let retval = self.faults[pos].retval;
        if !self.faults[pos].persistent {
            self.faults.remove(pos);
        }
        Some(retval)
    }

    fn member_of(&self, sw_if_index: InterfaceIndex) -> Option<BridgeDomainId> {
        self.bridge_domains
            .iter()
            .find(|(_, members)| members.contains_key(&sw_if_index))
            .map(|(bd_id, _)| *bd_id)
    }

    fn bridge_domain_add_del(&mut self, req: &BridgeDomainAddDel) -> Result<BridgeDomainId, ApiRetval> {
        if req.is_add {
            let bd_id = if req.bd_id.is_sentinel() {
                let bd_id = BridgeDomainId::new(self.next_bd_id);
                self.next_bd_id += 1;
                bd_id
            } else {
                req.bd_id
            };
            if self.bridge_domains.contains_key(&bd_id) {
                return Err(ApiRetval::InvalidValue);
            }
            self.bridge_domains.insert(bd_id, Members::new());
            Ok(bd_id)
        } else {
            match self.bridge_domains.get(&req.bd_id) {
                None => Err(ApiRetval::NoSuchEntry),
                Some(members) if !members.is_empty() => Err(ApiRetval::InvalidValue),
                Some(_) => {
                    self.bridge_domains.remove(&req.bd_id);
                    Ok(req.bd_id)
                }
            }
        }
    }

    fn set_l2_bridge(&mut self, req: &SwInterfaceSetL2Bridge) -> Result<(), ApiRetval> {
        if self.deleted_subifs.contains(&req.rx_sw_if_index) {
            return Err(ApiRetval::InvalidSwIfIndex);
        }
        if req.enable {
            if !self.bridge_domains.contains_key(&req.bd_id) {
                return Err(ApiRetval::NoSuchEntry);
            }
            // An interface belongs to at most one bridge domain.
            if let Some(previous) = self.member_of(req.rx_sw_if_index) {
                if let Some(members) = self.bridge_domains.get_mut(&previous) {
                    members.remove(&req.rx_sw_if_index);
                }
            }
            if let Some(members) = self.bridge_domains.get_mut(&req.bd_id) {
                members.insert(req.rx_sw_if_index, req.shg);
            }
            Ok(())
        } else {
            let removed = self
                .bridge_domains
                .get_mut(&req.bd_id)
                .and_then(|members| members.remove(&req.rx_sw_if_index));
            match removed {
                Some(_) => Ok(()),
                None => Err(ApiRetval::NoSuchEntry),
            }
        }
    }

    fn delete_subif(&mut self, req: &DeleteSubif) -> Result<(), ApiRetval> {
        if self.member_of(req.sw_if_index).is_some() {
            return Err(ApiRetval::InvalidValue);
        }
        if !self.deleted_subifs.insert(req.sw_if_index) {
            return Err(ApiRetval::InvalidSwIfIndex);
        }
        Ok(())
    }
}

/// In-memory dataplane implementing [`L2Api`] and [`InterfaceApi`].
///
/// Share it with the code under test through an `Arc` to inspect it
/// afterwards.
pub struct FakeDataplane {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl Default for FakeDataplane {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDataplane {
    /// Creates a dataplane allocating bridge-domain ids from 1.
    pub fn new() -> Self {
        Self::with_first_bridge_id(1)
    }

    /// Creates a dataplane allocating bridge-domain ids from `first`.
    pub fn with_first_bridge_id(first: u32) -> Self {
        Self {
            state: Mutex::new(State {
                next_bd_id: first,
                bridge_domains: BTreeMap::new(),
                deleted_subifs: BTreeSet::new(),
                calls: Vec::new(),
                faults: Vec::new(),
            }),
            latency: None,
        }
    }

    /// Delays every request by `latency` before it is handled.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fails the next request of `kind` with `retval`.
    pub fn fail_next(&self, kind: CallKind, retval: i32) {
        self.add_fault(Box::new(move |call| call.kind() == kind), retval, false);
    }

    /// Fails every request of `kind` with `retval` until
    /// [`clear_faults`](Self::clear_faults).
    pub fn fail_always(&self, kind: CallKind, retval: i32) {
        self.add_fault(Box::new(move |call| call.kind() == kind), retval, true);
    }

    /// Fails the next request matching `matcher` with `retval`.
    pub fn fail_next_matching<F>(&self, matcher: F, retval: i32)
    where
        F: Fn(&DataplaneCall) -> bool + Send + Sync + 'static,
    {
        self.add_fault(Box::new(matcher), retval, false);
    }

    /// Removes every pending fault.
    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    fn add_fault(&self, matcher: CallMatcher, retval: i32, persistent: bool) {
        self.state.lock().faults.push(Fault {
            matcher,
            retval,
            persistent,
        });
    }

    /// Returns every request received so far, in order.
    pub fn calls(&self) -> Vec<DataplaneCall> {
        self.state.lock().calls.clone()
    }

    /// Forgets the recorded requests, keeping dataplane state.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Returns how many requests of `kind` were received.
    pub fn count(&self, kind: CallKind) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    /// Returns the members of `bd_id`, or `None` if it does not exist.
    pub fn bridge_domain(&self, bd_id: BridgeDomainId) -> Option<Members> {
        self.state.lock().bridge_domains.get(&bd_id).cloned()
    }

    /// Returns every existing bridge domain and its members.
    pub fn bridge_domains(&self) -> BTreeMap<BridgeDomainId, Members> {
        self.state.lock().bridge_domains.clone()
    }

    /// Returns the sub-interfaces deleted so far.
    pub fn deleted_sub_interfaces(&self) -> BTreeSet<InterfaceIndex> {
        self.state.lock().deleted_subifs.clone()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Records `call` and runs `apply` unless a fault matches.
    fn dispatch<T>(
        &self,
        call: DataplaneCall,
        apply: impl FnOnce(&mut State) -> Result<T, ApiRetval>,
    ) -> DataplaneResult<T> {
        let api = call.kind().api();
        let mut state = self.state.lock();
        state.calls.push(call);
        if let Some(retval) = state.take_fault(&call) {
            debug!(?call, retval, "Injected fault");
            return Err(DataplaneError::from_retval(api, retval));
        }
        apply(&mut state).map_err(|retval| DataplaneError::Retval { api, retval })
    }
}

#[async_trait]
impl L2Api for FakeDataplane {
    async fn bridge_domain_add_del(
        &self,
        request: &BridgeDomainAddDel,
    ) -> DataplaneResult<BridgeDomainAddDelReply> {
        self.delay().await;
        let bd_id = self.dispatch(DataplaneCall::BridgeDomainAddDel(*request), |state| {
            state.bridge_domain_add_del(request)
        })?;
        Ok(BridgeDomainAddDelReply { bd_id })
    }

    async fn sw_interface_set_l2_bridge(&self, request: &SwInterfaceSetL2Bridge) -> DataplaneResult<()> {
        self.delay().await;
        self.dispatch(DataplaneCall::SetL2Bridge(*request), |state| {
            state.set_l2_bridge(request)
        })
    }
}

#[async_trait]
impl InterfaceApi for FakeDataplane {
    async fn delete_subif(&self, request: &DeleteSubif) -> DataplaneResult<()> {
        self.delay().await;
        self.dispatch(DataplaneCall::DeleteSubif(*request), |state| {
            state.delete_subif(request)
        })
    }
}
