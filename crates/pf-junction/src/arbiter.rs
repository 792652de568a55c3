//! The junction arbiter: holds agents at the junction boundary and admits
//! non-conflicting movements in request order.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use pf_core::{AgentId, EdgeId, Point2};
use pf_traffic::{SpeedCommand, TrafficControl};

use crate::conflict::{ConflictTable, Movement};
use crate::{JunctionError, JunctionResult};

// ── JunctionConfig ────────────────────────────────────────────────────────────

/// Static description of one arbitrated junction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JunctionConfig {
    /// Planar center of the junction.
    pub center: Point2,
    /// Agents within this radius of the center are arbitrated.
    pub radius: f32,
    /// The 8 arm edges, indexed clockwise.  Even indices must be the
    /// inbound arms, odd the outbound.
    pub arm_edges: [EdgeId; 8],
}

// ── JunctionArbiter ───────────────────────────────────────────────────────────

/// Per-junction arbitration state.
///
/// `requesting` holds agents halted at the boundary in registration order
/// (closest first within a tick, FIFO across ticks); `occupying` the agents
/// granted passage and still crossing.  The two are disjoint: commit moves
/// an agent out of `requesting` the moment it enters `occupying`.
pub struct JunctionArbiter {
    config: JunctionConfig,
    table: ConflictTable,
    arm_index: FxHashMap<EdgeId, u8>,
    requesting: Vec<(AgentId, Movement)>,
    occupying: FxHashMap<AgentId, Movement>,
}

impl JunctionArbiter {
    pub fn new(config: JunctionConfig) -> JunctionResult<Self> {
        let mut arm_index = FxHashMap::default();
        for (i, &edge) in config.arm_edges.iter().enumerate() {
            if arm_index.insert(edge, i as u8).is_some() {
                return Err(JunctionError::DuplicateArm { edge });
            }
        }
        Ok(Self {
            config,
            table: ConflictTable::new(),
            arm_index,
            requesting: Vec::new(),
            occupying: FxHashMap::default(),
        })
    }

    pub fn config(&self) -> &JunctionConfig {
        &self.config
    }

    pub fn table(&self) -> &ConflictTable {
        &self.table
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Agents halted at the boundary, in registration order.
    pub fn requesting(&self) -> impl Iterator<Item = (AgentId, Movement)> + '_ {
        self.requesting.iter().copied()
    }

    pub fn is_requesting(&self, agent: AgentId) -> bool {
        self.requesting.iter().any(|&(a, _)| a == agent)
    }

    pub fn is_occupying(&self, agent: AgentId) -> bool {
        self.occupying.contains_key(&agent)
    }

    pub fn occupying_count(&self) -> usize {
        self.occupying.len()
    }

    /// Movements currently crossing.
    pub fn occupying_movements(&self) -> impl Iterator<Item = Movement> + '_ {
        self.occupying.values().copied()
    }

    // ── The per-tick pass ─────────────────────────────────────────────────

    /// Run one arbitration pass: cleanup, request collection, admission,
    /// commit.  Must run exactly once per simulation tick.
    pub fn step<T: TrafficControl + ?Sized>(&mut self, traffic: &mut T) -> JunctionResult<()> {
        self.cleanup(traffic);
        self.collect(traffic)?;
        let admitted = self.admit();
        self.commit(&admitted, traffic)
    }

    /// Drop stale occupancy: agents that left the simulation, and agents
    /// whose request record is gone (they were committed on an earlier tick
    /// and have had a full tick to clear the crossing).
    fn cleanup<T: TrafficControl + ?Sized>(&mut self, traffic: &T) {
        let live: FxHashSet<AgentId> = traffic.active_agents().into_iter().collect();
        let requesting: FxHashSet<AgentId> = self.requesting.iter().map(|&(a, _)| a).collect();
        self.occupying
            .retain(|agent, _| live.contains(agent) && requesting.contains(agent));
        self.requesting.retain(|(a, _)| live.contains(a));
    }

    /// Register every untracked agent inside the radius on an inbound arm,
    /// closest first, and hold it.
    fn collect<T: TrafficControl + ?Sized>(&mut self, traffic: &mut T) -> JunctionResult<()> {
        let mut in_circle: Vec<(f32, AgentId)> = Vec::new();
        for agent in traffic.active_agents() {
            let d2 = traffic.position(agent)?.distance_sq(self.config.center);
            if d2 <= self.config.radius * self.config.radius {
                in_circle.push((d2, agent));
            }
        }
        in_circle.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, agent) in in_circle {
            let edge = traffic.current_edge(agent)?;
            let Some(&from) = self.arm_index.get(&edge) else {
                continue;
            };
            if from % 2 != 0 {
                continue;
            }
            if self.occupying.contains_key(&agent) || self.is_requesting(agent) {
                continue;
            }

            let movement = self.derive_movement(traffic, agent, from)?;
            self.requesting.push((agent, movement));
            traffic.set_speed(agent, SpeedCommand::Halt)?;
            debug!(%agent, from = movement.from, to = ?movement.to, "junction request registered");
        }
        Ok(())
    }

    /// The agent's movement through the junction: its current arm plus the
    /// arm index of the next edge on its route, if any.
    fn derive_movement<T: TrafficControl + ?Sized>(
        &self,
        traffic: &T,
        agent: AgentId,
        from: u8,
    ) -> JunctionResult<Movement> {
        let route = traffic.route(agent)?;
        let current = self.config.arm_edges[from as usize];
        let to = route
            .iter()
            .position(|&e| e == current)
            .and_then(|i| route.get(i + 1))
            .and_then(|next| self.arm_index.get(next).copied());
        Ok(Movement::new(from, to))
    }

    /// Admit requests in registration order; a request passes only if it
    /// conflicts with no occupying movement and no earlier admission of
    /// this pass.
    fn admit(&self) -> Vec<(AgentId, Movement)> {
        let mut admitted: Vec<(AgentId, Movement)> = Vec::new();
        for &(agent, movement) in &self.requesting {
            let blocked = self
                .occupying
                .values()
                .chain(admitted.iter().map(|(_, m)| m))
                .any(|&held| self.table.conflicts(movement, held));
            if !blocked {
                admitted.push((agent, movement));
            }
        }
        admitted
    }

    /// Release each admitted agent: remove its request, record its
    /// occupancy (unless the movement terminates inside), resume it.
    fn commit<T: TrafficControl + ?Sized>(
        &mut self,
        admitted: &[(AgentId, Movement)],
        traffic: &mut T,
    ) -> JunctionResult<()> {
        for &(agent, movement) in admitted {
            self.requesting.retain(|&(a, _)| a != agent);
            if movement.to.is_some() {
                self.occupying.insert(agent, movement);
            }
            traffic.set_speed(agent, SpeedCommand::Free)?;
            debug!(%agent, from = movement.from, to = ?movement.to, "junction passage granted");
        }
        Ok(())
    }
}
