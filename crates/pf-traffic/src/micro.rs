//! `MicroTraffic` — a deterministic constant-speed reference simulator.
//!
//! Vehicles traverse their route's first lane at the lane speed limit (or a
//! commanded speed), with no car-following and no collision model.  The point
//! is a fully deterministic [`TrafficControl`] implementation with the same
//! interface a production microscopic simulator exposes, so dispatch and
//! arbitration policy can be exercised in tests and demos.

use std::collections::BTreeMap;

use pf_core::geo::point_along;
use pf_core::{AgentId, EdgeId, LaneId, Point2, SimClock, Tick};

use crate::control::{SpeedCommand, TrafficControl};
use crate::network::RoadNetwork;
use crate::router::{DijkstraRouter, Router};
use crate::{TrafficError, TrafficResult};

/// Speeds below this count as halted (matches the usual microscopic-simulator
/// convention for waiting-time accumulation).
const HALT_SPEED: f32 = 0.1;

// ── VehicleState ──────────────────────────────────────────────────────────────

/// Kinematic state of one simulated vehicle.
#[derive(Debug, Clone)]
struct VehicleState {
    /// Planned route; `route[route_pos]` is the current edge.
    route: Vec<EdgeId>,
    route_pos: usize,
    /// Distance travelled along the current edge's first lane, metres.
    offset_m: f32,
    /// Active speed constraint.
    cmd: SpeedCommand,
    /// Speed realized during the last tick, m/s.
    speed: f32,
    /// Consecutive halted ticks.
    waiting: u64,
}

// ── MicroTraffic ──────────────────────────────────────────────────────────────

/// Deterministic reference implementation of [`TrafficControl`].
///
/// Agents are stored in a `BTreeMap` so iteration (and therefore movement
/// update order and [`active_agents`](TrafficControl::active_agents)) is
/// ascending by id, run-to-run reproducible.
pub struct MicroTraffic<R: Router = DijkstraRouter> {
    network: RoadNetwork,
    router:  R,
    clock:   SimClock,
    agents:  BTreeMap<AgentId, VehicleState>,
}

impl MicroTraffic<DijkstraRouter> {
    /// A simulator over `network` with the default Dijkstra router and a
    /// 1-second tick.
    pub fn new(network: RoadNetwork) -> Self {
        Self::with_router(network, DijkstraRouter)
    }
}

impl<R: Router> MicroTraffic<R> {
    pub fn with_router(network: RoadNetwork, router: R) -> Self {
        Self {
            network,
            router,
            clock: SimClock::default(),
            agents: BTreeMap::new(),
        }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    fn state(&self, agent: AgentId) -> TrafficResult<&VehicleState> {
        self.agents.get(&agent).ok_or(TrafficError::AgentVanished(agent))
    }

    fn state_mut(&mut self, agent: AgentId) -> TrafficResult<&mut VehicleState> {
        self.agents.get_mut(&agent).ok_or(TrafficError::AgentVanished(agent))
    }

    fn check_route(&self, agent: AgentId, route: &[EdgeId]) -> TrafficResult<()> {
        if route.is_empty() {
            return Err(TrafficError::EmptyRoute(agent));
        }
        for &e in route {
            if !self.network.contains_edge(e) {
                return Err(TrafficError::UnknownEdge(e));
            }
        }
        Ok(())
    }
}

impl<R: Router> TrafficControl for MicroTraffic<R> {
    // ── Agent lifecycle ───────────────────────────────────────────────────

    fn add_agent(&mut self, agent: AgentId, initial_route: &[EdgeId]) -> TrafficResult<()> {
        if self.agents.contains_key(&agent) {
            return Err(TrafficError::DuplicateAgent(agent));
        }
        self.check_route(agent, initial_route)?;
        self.agents.insert(
            agent,
            VehicleState {
                route: initial_route.to_vec(),
                route_pos: 0,
                offset_m: 0.0,
                cmd: SpeedCommand::Free,
                speed: 0.0,
                waiting: 0,
            },
        );
        Ok(())
    }

    fn remove_agent(&mut self, agent: AgentId) -> TrafficResult<()> {
        self.agents
            .remove(&agent)
            .map(|_| ())
            .ok_or(TrafficError::AgentVanished(agent))
    }

    fn active_agents(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    // ── Per-agent queries ─────────────────────────────────────────────────

    fn current_edge(&self, agent: AgentId) -> TrafficResult<EdgeId> {
        let s = self.state(agent)?;
        Ok(s.route[s.route_pos])
    }

    fn current_lane(&self, agent: AgentId) -> TrafficResult<LaneId> {
        let edge = self.current_edge(agent)?;
        self.first_lane(edge)
    }

    fn position(&self, agent: AgentId) -> TrafficResult<Point2> {
        let s = self.state(agent)?;
        let edge = s.route[s.route_pos];
        let lane = self.first_lane(edge)?;
        let shape = &self.network.lane_shape[lane.index()];
        point_along(shape, s.offset_m).ok_or(TrafficError::UnknownLane(lane))
    }

    fn speed(&self, agent: AgentId) -> TrafficResult<f32> {
        Ok(self.state(agent)?.speed)
    }

    fn route(&self, agent: AgentId) -> TrafficResult<&[EdgeId]> {
        Ok(&self.state(agent)?.route)
    }

    fn waiting_ticks(&self, agent: AgentId) -> TrafficResult<u64> {
        Ok(self.state(agent)?.waiting)
    }

    // ── Per-agent commands ────────────────────────────────────────────────

    fn set_speed(&mut self, agent: AgentId, cmd: SpeedCommand) -> TrafficResult<()> {
        self.state_mut(agent)?.cmd = cmd;
        Ok(())
    }

    fn set_route(&mut self, agent: AgentId, route: &[EdgeId]) -> TrafficResult<()> {
        self.check_route(agent, route)?;
        let current = self.current_edge(agent)?;
        if route[0] != current {
            return Err(TrafficError::RouteNotAtCurrentEdge { agent, current });
        }
        let s = self.state_mut(agent)?;
        s.route = route.to_vec();
        s.route_pos = 0;
        // offset_m is kept: the agent continues from where it is on the edge.
        Ok(())
    }

    // ── Network queries ───────────────────────────────────────────────────

    fn shortest_path(&self, from: EdgeId, to: EdgeId) -> TrafficResult<Vec<EdgeId>> {
        self.router.edge_path(&self.network, from, to)
    }

    fn first_lane(&self, edge: EdgeId) -> TrafficResult<LaneId> {
        if !self.network.contains_edge(edge) {
            return Err(TrafficError::UnknownEdge(edge));
        }
        self.network
            .first_lane(edge)
            .ok_or(TrafficError::EdgeWithoutLanes(edge))
    }

    fn lane_shape(&self, lane: LaneId) -> TrafficResult<&[Point2]> {
        self.network
            .lane_shape
            .get(lane.index())
            .map(Vec::as_slice)
            .ok_or(TrafficError::UnknownLane(lane))
    }

    fn lane_max_speed(&self, lane: LaneId) -> TrafficResult<f32> {
        self.network
            .lane_max_speed
            .get(lane.index())
            .copied()
            .ok_or(TrafficError::UnknownLane(lane))
    }

    fn lane_length(&self, lane: LaneId) -> TrafficResult<f32> {
        self.network
            .lane_length_m
            .get(lane.index())
            .copied()
            .ok_or(TrafficError::UnknownLane(lane))
    }

    // ── Time ──────────────────────────────────────────────────────────────

    fn advance_tick(&mut self) {
        let dt = self.clock.tick_duration_secs as f32;

        for state in self.agents.values_mut() {
            let edge = state.route[state.route_pos];
            let limit = self
                .network
                .first_lane(edge)
                .map(|l| self.network.lane_max_speed[l.index()])
                .unwrap_or(0.0);

            let v = match state.cmd {
                SpeedCommand::Halt     => 0.0,
                SpeedCommand::Fixed(x) => x.min(limit),
                SpeedCommand::Free     => limit,
            };
            state.speed = v;
            state.offset_m += v * dt;

            // Cross edge boundaries; stop at the end of the final route edge.
            loop {
                let len = self.network.edge_length_m[state.route[state.route_pos].index()];
                if state.offset_m < len {
                    break;
                }
                if state.route_pos + 1 < state.route.len() {
                    state.offset_m -= len;
                    state.route_pos += 1;
                } else {
                    state.offset_m = len;
                    state.speed = 0.0;
                    break;
                }
            }

            if state.speed < HALT_SPEED {
                state.waiting += 1;
            } else {
                state.waiting = 0;
            }
        }

        self.clock.advance();
    }

    fn now(&self) -> Tick {
        self.clock.current_tick
    }
}
