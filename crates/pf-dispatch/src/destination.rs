//! Service-point records and the per-kind destination registry.
//!
//! Destinations are created once at startup (one per interpolated point per
//! configured edge), never deleted, and mutated only by service-log stamping
//! when a task finishes.  Agents hold `(DestKind, DestId)` references into
//! the registry — never owning pointers — which keeps the object graph
//! acyclic.

use pf_core::{AgentId, DestId, DestKind, EdgeId, Point2, Tick};

// ── ServiceRecord ─────────────────────────────────────────────────────────────

/// The last completed service at a destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRecord {
    /// Simulation tick at which the task finished.
    pub finished_at: Tick,
    /// The agent that completed it.
    pub agent: AgentId,
}

// ── Destination ───────────────────────────────────────────────────────────────

/// One fixed service point an agent can be routed to and dwell at.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    pub kind: DestKind,
    /// Unique within its kind, assigned monotonically from 0.
    pub id: DestId,
    /// The network edge the point lies on.
    pub edge: EdgeId,
    /// Planar position of the berth, metres.
    pub position: Point2,
    /// Stamped on each task finish; `None` until first served.
    pub service_log: Option<ServiceRecord>,
}

// ── DestinationRegistry ───────────────────────────────────────────────────────

/// Canonical destination storage, one dense table per kind.
///
/// `DestId` doubles as the index into its kind's table, so lookups are O(1)
/// and id assignment is monotonic by construction.
#[derive(Default)]
pub struct DestinationRegistry {
    tables: [Vec<Destination>; DestKind::ALL.len()],
}

/// Index of `kind` within per-kind array fields.
#[inline]
pub(crate) fn kind_slot(kind: DestKind) -> usize {
    match kind {
        DestKind::Crane  => 0,
        DestKind::Gantry => 1,
        DestKind::Other  => 2,
    }
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new destination and return its id.
    pub fn insert(&mut self, kind: DestKind, edge: EdgeId, position: Point2) -> DestId {
        let table = &mut self.tables[kind_slot(kind)];
        let id = DestId(table.len() as u32);
        table.push(Destination {
            kind,
            id,
            edge,
            position,
            service_log: None,
        });
        id
    }

    pub fn get(&self, kind: DestKind, id: DestId) -> Option<&Destination> {
        self.tables[kind_slot(kind)].get(id.index())
    }

    pub fn get_mut(&mut self, kind: DestKind, id: DestId) -> Option<&mut Destination> {
        self.tables[kind_slot(kind)].get_mut(id.index())
    }

    /// Number of destinations of `kind`.
    pub fn count(&self, kind: DestKind) -> usize {
        self.tables[kind_slot(kind)].len()
    }

    /// All ids of `kind`, ascending.
    pub fn ids(&self, kind: DestKind) -> impl Iterator<Item = DestId> + '_ {
        (0..self.count(kind) as u32).map(DestId)
    }

    /// All destinations of `kind`, ascending by id.
    pub fn of_kind(&self, kind: DestKind) -> &[Destination] {
        &self.tables[kind_slot(kind)]
    }
}
