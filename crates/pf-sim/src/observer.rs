//! Simulation observer trait for progress reporting and metrics collection.

use pf_core::{AgentId, Tick};
use pf_dispatch::scheduler::TaskSpec;

/// Per-tick fleet statistics handed to [`FleetObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default)]
pub struct TickSummary {
    /// Agents currently tracked by the tick driver.
    pub active_agents: usize,
    /// Agents halted at a berth this tick.
    pub dwelling: usize,
    /// Assignable crane-side task instances.
    pub pending_crane: usize,
    /// Assignable gantry-side task instances.
    pub pending_gantry: usize,
    /// Tasks that finished during this tick.
    pub finished_tasks: usize,
    /// Mean speed over tracked agents, m/s.  Zero when nothing is tracked.
    pub mean_speed: f32,
    /// Sum of accumulated waiting ticks over tracked agents.
    pub total_waiting_ticks: u64,
}

/// Callbacks invoked by [`FleetSim`][crate::FleetSim] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait FleetObserver {
    /// Called at the very start of each tick, before agent polling.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the tick's polling and arbitration, before time advances.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called when an agent's dwell completes.
    fn on_task_finished(&mut self, _tick: Tick, _agent: AgentId, _task: &TaskSpec) {}

    /// Called once when [`FleetSim::macro_step`][crate::FleetSim::macro_step]
    /// returns.
    fn on_step_end(&mut self, _tick: Tick) {}
}

/// A [`FleetObserver`] that does nothing.  Use when you need to drive the
/// sim but don't want callbacks.
pub struct NoopObserver;

impl FleetObserver for NoopObserver {}
