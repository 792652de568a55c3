//! The `FleetSim` struct and its tick loop.

use std::collections::BTreeMap;

use tracing::info;

use pf_agent::{AgentTask, FleetError, ServiceCapability, TaskState};
use pf_core::{AgentId, AgentKind, DestId, DestKind, EdgeId, Tick};
use pf_dispatch::destination::ServiceRecord;
use pf_dispatch::Scheduler;
use pf_junction::JunctionArbiter;
use pf_traffic::{TrafficControl, TrafficError};

use crate::observer::{FleetObserver, TickSummary};
use crate::SimResult;

// ── FleetConfig ───────────────────────────────────────────────────────────────

/// Tick-driver thresholds.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetConfig {
    /// An agent on its destination edge within this distance of the berth
    /// counts as arrived.
    pub arrival_threshold_m: f32,
    /// Consecutive halted ticks that complete a dwell.
    pub dwell_ticks: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { arrival_threshold_m: 10.0, dwell_ticks: 10 }
    }
}

// ── FleetSim ──────────────────────────────────────────────────────────────────

/// The tick driver.
///
/// `FleetSim<T>` owns the motion simulator, the scheduler, one
/// [`AgentTask`] per tracked agent, and the junction arbiters, and drives
/// the per-tick sequence:
///
/// 1. Per agent, ascending id: `check_task_start` → `check_task_finish` →
///    (`apply_task` if the dwell just completed).
/// 2. One arbitration pass per junction.
/// 3. A single simulation time advance.
///
/// Agents that vanish from the simulator mid-poll are dropped from tracking
/// after their destination is reclaimed.  Create via
/// [`FleetSimBuilder`][crate::FleetSimBuilder].
pub struct FleetSim<T: TrafficControl> {
    pub(crate) traffic: T,
    pub(crate) scheduler: Scheduler,
    pub(crate) tasks: BTreeMap<AgentId, AgentTask>,
    pub(crate) arbiters: Vec<JunctionArbiter>,
    pub(crate) service: Box<dyn ServiceCapability>,
    pub(crate) config: FleetConfig,
}

impl<T: TrafficControl> FleetSim<T> {
    // ── Agent lifecycle ───────────────────────────────────────────────────

    /// Inject an agent at `start_edge` and dispatch its first task.
    ///
    /// On dispatch failure the agent is removed from the simulator again
    /// before the error surfaces.
    pub fn spawn_agent(
        &mut self,
        agent: AgentId,
        kind: AgentKind,
        start_edge: EdgeId,
    ) -> SimResult<()> {
        self.traffic.add_agent(agent, &[start_edge])?;
        let mut task = AgentTask::new(agent, kind);
        if let Err(e) = task.apply_task(None, &mut self.scheduler, &mut self.traffic) {
            let _ = self.traffic.remove_agent(agent);
            return Err(e.into());
        }
        self.tasks.insert(agent, task);
        info!(%agent, kind = %kind, "agent spawned");
        Ok(())
    }

    /// Remove an agent, reclaiming its destination.
    pub fn remove_agent(&mut self, agent: AgentId) -> SimResult<()> {
        if let Some(mut task) = self.tasks.remove(&agent) {
            task.abandon(&mut self.scheduler);
        }
        self.traffic.remove_agent(agent)?;
        Ok(())
    }

    // ── The tick loop ─────────────────────────────────────────────────────

    /// Run one simulation tick.
    pub fn step<O: FleetObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.traffic.now();
        observer.on_tick_start(now);

        let mut summary = TickSummary::default();
        let mut vanished: Vec<AgentId> = Vec::new();

        let ids: Vec<AgentId> = self.tasks.keys().copied().collect();
        for agent in ids {
            let Some(task) = self.tasks.get_mut(&agent) else {
                continue;
            };

            let was_paused = task.is_paused_on_task();
            match task.check_task_start(
                &mut self.scheduler,
                &mut self.traffic,
                self.config.arrival_threshold_m,
            ) {
                Ok(true) if !was_paused => {
                    if let Some(dest) = task.destination().copied() {
                        self.service.on_service_start(agent, &dest);
                    }
                }
                Ok(_) => {}
                Err(FleetError::Traffic(TrafficError::AgentVanished(_))) => {
                    vanished.push(agent);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let dest = task.destination().copied();
            match task.check_task_finish(&mut self.scheduler, &mut self.traffic, self.config.dwell_ticks)
            {
                Ok(true) => {
                    summary.finished_tasks += 1;
                    if let Some(dest) = dest {
                        self.service.on_service_end(agent, &dest);
                        observer.on_task_finished(now, agent, &dest);
                    }
                    // Restart the cycle on the opposite side.
                    task.apply_task(None, &mut self.scheduler, &mut self.traffic)?;
                }
                Ok(false) => {}
                Err(FleetError::Traffic(TrafficError::AgentVanished(_))) => {
                    vanished.push(agent);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            if matches!(task.state(), TaskState::ArrivedPending | TaskState::Dwelling) {
                summary.dwelling += 1;
            }
        }
        for agent in vanished {
            self.tasks.remove(&agent);
        }

        for arbiter in &mut self.arbiters {
            arbiter.step(&mut self.traffic)?;
        }

        summary.active_agents = self.tasks.len();
        let mut speed_sum = 0.0;
        for &agent in self.tasks.keys() {
            if let Ok(v) = self.traffic.speed(agent) {
                speed_sum += v;
            }
            if let Ok(w) = self.traffic.waiting_ticks(agent) {
                summary.total_waiting_ticks += w;
            }
        }
        if !self.tasks.is_empty() {
            summary.mean_speed = speed_sum / self.tasks.len() as f32;
        }
        summary.pending_crane = self.scheduler.pending_count(DestKind::Crane);
        summary.pending_gantry = self.scheduler.pending_count(DestKind::Gantry);
        observer.on_tick_end(now, &summary);

        self.traffic.advance_tick();
        Ok(())
    }

    /// Run `delta` ticks — one macro step of an external driver.
    pub fn macro_step<O: FleetObserver>(&mut self, delta: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..delta {
            self.step(observer)?;
        }
        observer.on_step_end(self.traffic.now());
        Ok(())
    }

    // ── Read-only queries (observation/reward surface) ────────────────────

    pub fn now(&self) -> Tick {
        self.traffic.now()
    }

    pub fn traffic(&self) -> &T {
        &self.traffic
    }

    /// Mutable simulator access, for external drivers that inject agents or
    /// command speeds outside the dispatch cycle.
    pub fn traffic_mut(&mut self) -> &mut T {
        &mut self.traffic
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn task(&self, agent: AgentId) -> Option<&AgentTask> {
        self.tasks.get(&agent)
    }

    /// Tracked agent ids, ascending.
    pub fn active_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.tasks.keys().copied()
    }

    pub fn arbiters(&self) -> &[JunctionArbiter] {
        &self.arbiters
    }

    pub fn pending_count(&self, kind: DestKind) -> usize {
        self.scheduler.pending_count(kind)
    }

    pub fn ongoing_agents(&self, kind: DestKind, id: DestId) -> &[AgentId] {
        self.scheduler.ongoing_agents(kind, id)
    }

    pub fn destination_service_log(&self, kind: DestKind, id: DestId) -> Option<ServiceRecord> {
        self.scheduler.service_log(kind, id)
    }
}
