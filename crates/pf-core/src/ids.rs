//! Newtype identifiers for every entity the engine tracks.
//!
//! Each id wraps a `pub u32` so dense storage can index with `id.index()`
//! while map keys and sorted collections get `Ord + Hash` for free.  The
//! all-ones value is reserved as the [`INVALID`](AgentId::INVALID) sentinel.

use std::fmt;

macro_rules! ids {
    ($($(#[$attr:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// The reserved "no such entity" value.
            pub const INVALID: $name = $name(u32::MAX);

            /// The id as a dense-table index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    )+};
}

ids! {
    /// A mobile agent (truck, crane, gantry, bridge) in the traffic
    /// simulation.  Assigned by the caller when injecting the agent.
    AgentId,
    /// A network junction node.
    NodeId,
    /// A directed network edge.
    EdgeId,
    /// A lane within the network's flat lane table.
    LaneId,
    /// A service-point destination.  Unique per destination kind (crane ids
    /// and gantry ids are separate monotonic sequences).
    DestId,
}
