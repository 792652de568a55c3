//! The `TrafficControl` trait — the boundary between the dispatch core and
//! whatever motion simulator is driving the vehicles.
//!
//! Every query that can fail returns `TrafficResult`; a failed per-agent
//! query ([`TrafficError::AgentVanished`]) means the simulator dropped the
//! agent, and the fleet layer responds by reclaiming its destination and
//! ending tracking.

use pf_core::{AgentId, EdgeId, LaneId, Point2, Tick};

use crate::TrafficResult;

// ── SpeedCommand ──────────────────────────────────────────────────────────────

/// A speed constraint imposed on one agent.
///
/// `Halt` pins the agent at zero (dwelling at a berth, or held by the
/// junction arbiter); `Free` returns control to the simulator's own speed
/// choice (the lane limit in the reference simulator).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedCommand {
    /// Hold at zero speed.
    Halt,
    /// Fixed speed in m/s (capped at the lane limit).
    Fixed(f32),
    /// Unrestricted — the simulator picks the speed.
    #[default]
    Free,
}

// ── TrafficControl ────────────────────────────────────────────────────────────

/// Query/command surface of the motion simulator, one method per operation
/// the dispatch core consumes.
///
/// Implementations must keep agent iteration order deterministic
/// ([`active_agents`](Self::active_agents) returns ids in ascending order) so
/// that scheduler and arbiter decisions are reproducible run-to-run.
pub trait TrafficControl {
    // ── Agent lifecycle ───────────────────────────────────────────────────

    /// Inject `agent` at the start of `initial_route`.
    fn add_agent(&mut self, agent: AgentId, initial_route: &[EdgeId]) -> TrafficResult<()>;

    /// Remove `agent` from the simulation.
    fn remove_agent(&mut self, agent: AgentId) -> TrafficResult<()>;

    /// All currently simulated agent ids, ascending.
    fn active_agents(&self) -> Vec<AgentId>;

    // ── Per-agent queries ─────────────────────────────────────────────────

    fn current_edge(&self, agent: AgentId) -> TrafficResult<EdgeId>;
    fn current_lane(&self, agent: AgentId) -> TrafficResult<LaneId>;
    fn position(&self, agent: AgentId) -> TrafficResult<Point2>;
    fn speed(&self, agent: AgentId) -> TrafficResult<f32>;

    /// The agent's planned route (ordered edge ids, starting at or before
    /// its current edge).
    fn route(&self, agent: AgentId) -> TrafficResult<&[EdgeId]>;

    /// Consecutive ticks this agent has been halted (speed below the halt
    /// threshold).  Resets to zero whenever the agent moves.
    fn waiting_ticks(&self, agent: AgentId) -> TrafficResult<u64>;

    // ── Per-agent commands ────────────────────────────────────────────────

    fn set_speed(&mut self, agent: AgentId, cmd: SpeedCommand) -> TrafficResult<()>;

    /// Replace the agent's route.  The new route must start at the agent's
    /// current edge.
    fn set_route(&mut self, agent: AgentId, route: &[EdgeId]) -> TrafficResult<()>;

    // ── Network queries ───────────────────────────────────────────────────

    /// Shortest edge path from `from` to `to`, inclusive of both.
    fn shortest_path(&self, from: EdgeId, to: EdgeId) -> TrafficResult<Vec<EdgeId>>;

    /// First lane of `edge`, or [`TrafficError::EdgeWithoutLanes`].
    fn first_lane(&self, edge: EdgeId) -> TrafficResult<LaneId>;

    fn lane_shape(&self, lane: LaneId) -> TrafficResult<&[Point2]>;
    fn lane_max_speed(&self, lane: LaneId) -> TrafficResult<f32>;
    fn lane_length(&self, lane: LaneId) -> TrafficResult<f32>;

    // ── Time ──────────────────────────────────────────────────────────────

    /// Advance simulated time by one tick, moving every agent.
    fn advance_tick(&mut self);

    /// Current simulation tick.
    fn now(&self) -> Tick;
}
