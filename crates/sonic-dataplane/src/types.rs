//! Type-safe dataplane identifier wrappers.
//!
//! Interface indices and bridge-domain ids are both plain `u32` values on the
//! wire. Wrapping them in a kind-tagged id prevents passing an interface index
//! where a bridge-domain id is expected (and vice versa).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Raw dataplane identifier type (matches `u32` ids in the binary API).
pub type RawDataplaneId = u32;

/// Marker trait for dataplane identifier kinds.
pub trait DataplaneIdKind: Send + Sync + 'static {
    /// Returns the identifier kind name for debugging.
    fn type_name() -> &'static str;
}

/// A type-safe dataplane identifier.
///
/// The phantom type parameter `T` indicates what kind of dataplane object
/// this id refers to.
///
/// # Examples
///
/// ```
/// use sonic_dataplane::{BridgeDomainId, InterfaceIndex};
///
/// let client = InterfaceIndex::new(10);
/// let bd = BridgeDomainId::new(5);
///
/// // This would fail to compile:
/// // fn takes_interface(i: InterfaceIndex) {}
/// // takes_interface(bd);
/// assert_eq!(client.as_raw(), 10);
/// assert_eq!(bd.as_raw(), 5);
/// ```
pub struct DataplaneId<T: DataplaneIdKind> {
    raw: RawDataplaneId,
    _marker: PhantomData<T>,
}

impl<T: DataplaneIdKind> DataplaneId<T> {
    /// The all-ones sentinel (`~0`).
    ///
    /// For interfaces it marks an invalid index; for bridge domains it asks
    /// the dataplane to allocate an id on creation.
    pub const SENTINEL: Self = Self::new(RawDataplaneId::MAX);

    /// Creates an id from a raw value.
    pub const fn new(raw: RawDataplaneId) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Returns the raw id value.
    pub const fn as_raw(&self) -> RawDataplaneId {
        self.raw
    }

    /// Returns true if this is the all-ones sentinel.
    pub const fn is_sentinel(&self) -> bool {
        self.raw == RawDataplaneId::MAX
    }
}

impl<T: DataplaneIdKind> Clone for DataplaneId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: DataplaneIdKind> Copy for DataplaneId<T> {}

impl<T: DataplaneIdKind> fmt::Debug for DataplaneId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::type_name(), self.raw)
    }
}

impl<T: DataplaneIdKind> fmt::Display for DataplaneId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl<T: DataplaneIdKind> PartialEq for DataplaneId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: DataplaneIdKind> Eq for DataplaneId<T> {}

impl<T: DataplaneIdKind> PartialOrd for DataplaneId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: DataplaneIdKind> Ord for DataplaneId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: DataplaneIdKind> Hash for DataplaneId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: DataplaneIdKind> From<RawDataplaneId> for DataplaneId<T> {
    fn from(raw: RawDataplaneId) -> Self {
        Self::new(raw)
    }
}

impl<T: DataplaneIdKind> Serialize for DataplaneId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw)
    }
}

impl<'de, T: DataplaneIdKind> Deserialize<'de> for DataplaneId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawDataplaneId::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// Id Kind Markers
// ============================================================================

macro_rules! define_id_kind {
    ($name:ident, $type_name:literal, $id_alias:ident) => {
        #[doc = concat!("Marker type for dataplane ", $type_name, " ids.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl DataplaneIdKind for $name {
            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("Type alias for ", $type_name, " ids.")]
        pub type $id_alias = DataplaneId<$name>;
    };
}

define_id_kind!(InterfaceKind, "InterfaceIndex", InterfaceIndex);
define_id_kind!(BridgeDomainKind, "BridgeDomainId", BridgeDomainId);

/// Split-horizon group of a bridge-domain member.
///
/// Members sharing a non-zero group never flood to each other. Group 0
/// floods to and from every other member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitHorizonGroup(u8);

impl SplitHorizonGroup {
    /// No group: floods to every member.
    pub const NONE: Self = SplitHorizonGroup(0);

    /// Creates a group from its raw tag.
    pub const fn new(raw: u8) -> Self {
        SplitHorizonGroup(raw)
    }

    /// Returns the raw tag.
    pub const fn as_raw(&self) -> u8 {
        self.0
    }

    /// Returns true for group 0.
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SplitHorizonGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Forwarding behavior of a bridge domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeDomainFlags {
    /// Flood broadcast and multicast
    pub flood: bool,
    /// Flood unknown unicast
    pub uu_flood: bool,
    /// Forward known unicast
    pub forward: bool,
    /// Learn source MAC addresses
    pub learn: bool,
    /// Terminate ARP requests locally
    pub arp_term: bool,
}

impl BridgeDomainFlags {
    /// Standard learning bridge: flood, forward, learn and flood unknown
    /// unicast, no ARP termination.
    pub const LEARNING_BRIDGE: Self = BridgeDomainFlags {
        flood: true,
        uu_flood: true,
        forward: true,
        learn: true,
        arp_term: false,
    };
}

impl Default for BridgeDomainFlags {
    fn default() -> Self {
        Self::LEARNING_BRIDGE
    }
}
