//! The task scheduler: pending/ongoing queues and the dispatch policy.

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use pf_core::geo::sample_evenly;
use pf_core::{AgentId, DestId, DestKind, EdgeId, Point2, SimRng, Tick};
use pf_traffic::{TrafficControl, TrafficError};

use crate::destination::{kind_slot, Destination, DestinationRegistry, ServiceRecord};
use crate::{DispatchError, DispatchResult};

/// How many pending-pool expansions `dispatch_task` attempts before giving
/// up with [`DispatchError::DispatchExhausted`].
pub const MAX_EXPAND_ATTEMPTS: u32 = 3;

// ── DispatchConfig ────────────────────────────────────────────────────────────

/// Startup configuration for destination generation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// Edges holding crane-side berths.
    pub crane_edges: Vec<EdgeId>,
    /// Edges holding gantry-side berths.
    pub gantry_edges: Vec<EdgeId>,
    /// Edges holding reserved service points (unused by the alternation
    /// policy, but registered and queryable).
    pub other_edges: Vec<EdgeId>,
    /// Service points interpolated along each edge's first lane.
    pub points_per_edge: usize,
    /// Seed for all randomized scheduling decisions.
    pub seed: u64,
}

// ── TaskSpec ──────────────────────────────────────────────────────────────────

/// A fully resolved task: one agent bound for one destination.
///
/// This is the single normalized shape every task request reduces to at the
/// scheduler boundary — callers either pass an explicit `TaskSpec` or let
/// [`Scheduler::dispatch_task`] produce one.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSpec {
    pub kind: DestKind,
    pub id: DestId,
    pub edge: EdgeId,
    pub position: Point2,
}

impl From<&Destination> for TaskSpec {
    fn from(d: &Destination) -> Self {
        Self {
            kind: d.kind,
            id: d.id,
            edge: d.edge,
            position: d.position,
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Owns the destination registry plus per-kind pending pools and ongoing
/// buckets.
///
/// `pending` holds assignable destination-id *instances*: pool expansion may
/// put the same id in the pool more than once, which is what allows several
/// agents to be dispatched to one multi-berth service point.  `ongoing` maps
/// a destination id to the agents currently routed to it, FIFO by
/// assignment.
pub struct Scheduler {
    registry: DestinationRegistry,
    pending:  [Vec<DestId>; DestKind::ALL.len()],
    ongoing:  [FxHashMap<DestId, Vec<AgentId>>; DestKind::ALL.len()],
    rng:      SimRng,
}

impl Scheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            registry: DestinationRegistry::new(),
            pending:  Default::default(),
            ongoing:  Default::default(),
            rng:      SimRng::new(seed),
        }
    }

    // ── Startup ───────────────────────────────────────────────────────────

    /// Interpolate `points_per_edge` service points along each configured
    /// edge's first lane, register them, and seed the pending pools.
    ///
    /// Runs once at startup.  Fails with [`DispatchError::Configuration`] if
    /// an edge has no lanes or a lane has no extent.
    pub fn generate_destinations<T: TrafficControl + ?Sized>(
        &mut self,
        config: &DispatchConfig,
        traffic: &T,
    ) -> DispatchResult<()> {
        let groups = [
            (DestKind::Crane,  &config.crane_edges),
            (DestKind::Gantry, &config.gantry_edges),
            (DestKind::Other,  &config.other_edges),
        ];

        for (kind, edges) in groups {
            for &edge in edges {
                let lane = traffic
                    .first_lane(edge)
                    .map_err(|e| DispatchError::Configuration { edge, reason: e.to_string() })?;
                let shape = traffic
                    .lane_shape(lane)
                    .map_err(|e| DispatchError::Configuration { edge, reason: e.to_string() })?;

                let points = sample_evenly(shape, config.points_per_edge);
                if points.is_empty() {
                    return Err(DispatchError::Configuration {
                        edge,
                        reason: format!("lane {lane} has no usable extent"),
                    });
                }
                for position in points {
                    let id = self.registry.insert(kind, edge, position);
                    self.pending[kind_slot(kind)].push(id);
                }
            }
        }

        info!(
            crane = self.registry.count(DestKind::Crane),
            gantry = self.registry.count(DestKind::Gantry),
            other = self.registry.count(DestKind::Other),
            "destinations generated"
        );
        Ok(())
    }

    // ── Task generation ───────────────────────────────────────────────────

    /// Refill every kind's pending pool up to `expand` instances per free
    /// destination id (an id is free when no ongoing bucket holds it).
    pub fn generate_tasks(&mut self, expand: usize) {
        let mut added = 0;
        for kind in DestKind::ALL {
            added += self.fill_pending(kind, expand);
        }
        info!(added, expand, "task pools refilled");
    }

    /// Refill one kind's pool.  Returns the number of instances appended.
    ///
    /// New instances are drawn without replacement from the free-id pool
    /// (each free id contributes up to `expand` instances, minus those
    /// already pending), shuffled by the scheduler RNG for reproducibility.
    fn fill_pending(&mut self, kind: DestKind, expand: usize) -> usize {
        let slot = kind_slot(kind);

        let free: Vec<DestId> = self
            .registry
            .ids(kind)
            .filter(|id| !self.ongoing[slot].contains_key(id))
            .collect();
        let target = expand * free.len();
        if self.pending[slot].len() >= target {
            return 0;
        }

        let mut pool: Vec<DestId> = Vec::new();
        for id in free {
            let already = self.pending[slot].iter().filter(|&&p| p == id).count();
            for _ in already..expand {
                pool.push(id);
            }
        }
        self.rng.shuffle(&mut pool);

        let need = (target - self.pending[slot].len()).min(pool.len());
        self.pending[slot].extend(pool.drain(..need));
        need
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Assign a destination to `agent`.
    ///
    /// The target kind alternates against `last_kind` (crane↔gantry; fresh
    /// agents start on the crane side).  `invalid` excludes one destination
    /// id — the one that just failed to route — from selection.  An empty
    /// pool triggers `fill_pending(expand = 2)` and a retry, bounded by
    /// [`MAX_EXPAND_ATTEMPTS`]; exceeding the bound is fatal.
    pub fn dispatch_task(
        &mut self,
        agent: AgentId,
        last_kind: Option<DestKind>,
        invalid: Option<DestId>,
    ) -> DispatchResult<TaskSpec> {
        let target = match last_kind {
            Some(kind) => kind.opposite(),
            None => DestKind::Crane,
        };
        let slot = kind_slot(target);

        for _attempt in 0..=MAX_EXPAND_ATTEMPTS {
            let candidates: Vec<usize> = self.pending[slot]
                .iter()
                .enumerate()
                .filter(|&(_, &id)| Some(id) != invalid)
                .map(|(i, _)| i)
                .collect();

            if let Some(&pick) = self.rng.choose(&candidates) {
                let id = self.pending[slot].swap_remove(pick);
                let dest = self
                    .registry
                    .get(target, id)
                    .ok_or(DispatchError::UnknownDestination { kind: target, id })?;
                debug!(
                    %agent,
                    kind = %target,
                    dest = %id,
                    pending = self.pending[slot].len(),
                    "task dispatched"
                );
                return Ok(TaskSpec::from(dest));
            }

            self.fill_pending(target, 2);
        }

        Err(DispatchError::DispatchExhausted {
            agent,
            kind: target,
            attempts: MAX_EXPAND_ATTEMPTS,
        })
    }

    // ── Queue maintenance ─────────────────────────────────────────────────

    /// Record that `agent` is now routed to `(kind, id)`.  Called by the
    /// task state machine once routing succeeds.
    pub fn register_ongoing(&mut self, kind: DestKind, id: DestId, agent: AgentId) {
        self.ongoing[kind_slot(kind)].entry(id).or_default().push(agent);
    }

    /// Return a destination id to the pending pool.
    ///
    /// With `agent = None` (routing failure: the id was popped from pending
    /// but never registered) the id is requeued unconditionally.  With
    /// `agent = Some` (agent removed mid-task) the agent leaves its bucket
    /// and the id is requeued only once the bucket empties.
    pub fn reclaim(&mut self, kind: DestKind, id: DestId, agent: Option<AgentId>) {
        let slot = kind_slot(kind);
        match agent {
            None => self.pending[slot].push(id),
            Some(a) => {
                if let Some(bucket) = self.ongoing[slot].get_mut(&id) {
                    bucket.retain(|&b| b != a);
                    if bucket.is_empty() {
                        self.ongoing[slot].remove(&id);
                        self.pending[slot].push(id);
                    }
                }
            }
        }
    }

    /// Mark `agent`'s task at `(kind, id)` finished at `now`: leave the
    /// ongoing bucket and stamp the destination's service log.
    pub fn complete(
        &mut self,
        kind: DestKind,
        id: DestId,
        agent: AgentId,
        now: Tick,
    ) -> DispatchResult<()> {
        let slot = kind_slot(kind);
        if let Some(bucket) = self.ongoing[slot].get_mut(&id) {
            bucket.retain(|&b| b != agent);
            if bucket.is_empty() {
                self.ongoing[slot].remove(&id);
            }
        }

        let dest = self
            .registry
            .get_mut(kind, id)
            .ok_or(DispatchError::UnknownDestination { kind, id })?;
        dest.service_log = Some(ServiceRecord { finished_at: now, agent });
        debug!(%agent, kind = %kind, dest = %id, tick = %now, "task finished");
        Ok(())
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Shortest edge path from `start` to `end` via the simulation's router.
    ///
    /// A same-edge request is always rejected as a degenerate task.
    pub fn request_route<T: TrafficControl + ?Sized>(
        &self,
        traffic: &T,
        start: EdgeId,
        end: EdgeId,
    ) -> DispatchResult<Vec<EdgeId>> {
        if start == end {
            return Err(DispatchError::RouteNotFound { start, end });
        }
        traffic.shortest_path(start, end).map_err(|e| match e {
            TrafficError::NoRoute { from, to } => DispatchError::RouteNotFound { start: from, end: to },
            other => DispatchError::Traffic(other),
        })
    }

    // ── Read-only queries (observation/reward surface) ────────────────────

    /// Number of assignable instances in `kind`'s pending pool.
    pub fn pending_count(&self, kind: DestKind) -> usize {
        self.pending[kind_slot(kind)].len()
    }

    /// Agents currently routed to `(kind, id)`, FIFO by assignment.
    pub fn ongoing_agents(&self, kind: DestKind, id: DestId) -> &[AgentId] {
        self.ongoing[kind_slot(kind)]
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Last completed service at `(kind, id)`, if any.
    pub fn service_log(&self, kind: DestKind, id: DestId) -> Option<ServiceRecord> {
        self.registry.get(kind, id).and_then(|d| d.service_log)
    }

    /// The canonical destination record.
    pub fn destination(&self, kind: DestKind, id: DestId) -> Option<&Destination> {
        self.registry.get(kind, id)
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }
}
