//! Agent and destination kind enums shared across all fleet crates.
//!
//! The original terminal model used one vehicle subclass per kind; here kind
//! is plain data on a single agent type, and kind-specific behavior hangs off
//! optional capability traits in `pf-agent`.

/// What sort of mobile unit an agent is.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum AgentKind {
    /// Container truck / AGV — the workhorse of the dispatch cycle.
    #[default]
    Truck,
    /// Quay crane shuttle.
    Crane,
    /// Gantry-side carrier.
    Gantry,
    /// Bridge carrier.
    Bridge,
}

impl AgentKind {
    /// Human-readable label, useful for CSV column values and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Truck  => "truck",
            AgentKind::Crane  => "crane",
            AgentKind::Gantry => "gantry",
            AgentKind::Bridge => "bridge",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which family of service points a destination belongs to.
///
/// The alternation policy bounces agents between the crane side and the
/// gantry side; `Other` is reserved for future service-point families and is
/// never selected by [`DestKind::opposite`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DestKind {
    Crane,
    Gantry,
    Other,
}

impl DestKind {
    /// The target kind for an agent whose last finished task was at `self`.
    ///
    /// Binary crane↔gantry alternation; `Other` routes back to the crane
    /// side so an agent can always re-enter the cycle.
    pub fn opposite(self) -> DestKind {
        match self {
            DestKind::Crane  => DestKind::Gantry,
            DestKind::Gantry => DestKind::Crane,
            DestKind::Other  => DestKind::Crane,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DestKind::Crane  => "crane",
            DestKind::Gantry => "gantry",
            DestKind::Other  => "other",
        }
    }

    /// All kinds the scheduler keeps queues for, in a fixed iteration order.
    pub const ALL: [DestKind; 3] = [DestKind::Crane, DestKind::Gantry, DestKind::Other];
}

impl std::fmt::Display for DestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
