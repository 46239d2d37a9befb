//! Bridge-domain table types.

use serde::Serialize;
use sonic_dataplane::{BridgeDomainId, InterfaceIndex};
use std::collections::BTreeSet;
use std::fmt;

/// Key of a bridge domain: the client-facing interface anchoring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientKey {
    client_if_index: InterfaceIndex,
}

impl ClientKey {
    pub fn new(client_if_index: InterfaceIndex) -> Self {
        Self { client_if_index }
    }

    pub fn client_if_index(&self) -> InterfaceIndex {
        self.client_if_index
    }
}

impl From<InterfaceIndex> for ClientKey {
    fn from(client_if_index: InterfaceIndex) -> Self {
        Self::new(client_if_index)
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-if {}", self.client_if_index)
    }
}

/// A bridge domain and the interfaces currently bridged into it.
///
/// `attached` includes the client-facing interface once it has been
/// attached on the dataplane. `pending_subif` holds the client-facing
/// sub-interface between its detach and its deletion during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeDomainRecord {
    pub id: BridgeDomainId,
    pub attached: BTreeSet<InterfaceIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_subif: Option<InterfaceIndex>,
}

impl BridgeDomainRecord {
    /// Creates a record for a freshly created bridge domain with no members.
    pub fn new(id: BridgeDomainId) -> Self {
        Self {
            id,
            attached: BTreeSet::new(),
            pending_subif: None,
        }
    }

    /// Returns true if `sw_if_index` is a member.
    pub fn is_attached(&self, sw_if_index: InterfaceIndex) -> bool {
        self.attached.contains(&sw_if_index)
    }

    /// Adds a member. Returns false if it was already attached.
    pub fn attach(&mut self, sw_if_index: InterfaceIndex) -> bool {
        self.attached.insert(sw_if_index)
    }

    /// Removes a member. Returns false if it was not attached.
    pub fn detach(&mut self, sw_if_index: InterfaceIndex) -> bool {
        self.attached.remove(&sw_if_index)
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Returns true if no interface is attached.
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Returns true if `sw_if_index` is the one and only member.
    pub fn is_sole_member(&self, sw_if_index: InterfaceIndex) -> bool {
        self.len() == 1 && self.is_attached(sw_if_index)
    }
}
