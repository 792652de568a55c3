//! The per-agent task state machine.
//!
//! Each tracked agent owns one [`AgentTask`] driving the dispatch cycle:
//!
//! ```text
//! Idle ──apply_task──▶ Routed ──▶ EnRoute ──▶ ArrivedPending ──▶ Dwelling
//!                        ▲                                          │
//!                        └────────── apply_task ◀── Finished ◀──────┘
//! ```
//!
//! The state machine holds no simulator or scheduler references; every
//! transition method borrows them for the duration of the call, so agents
//! and the scheduler stay reference-cycle free.

use tracing::{debug, warn};

use pf_core::{AgentId, AgentKind, DestKind};
use pf_dispatch::scheduler::TaskSpec;
use pf_dispatch::{DispatchError, Scheduler};
use pf_traffic::{SpeedCommand, TrafficControl};

use crate::{FleetError, FleetResult};

/// How many route-and-redispatch attempts `apply_task` makes before
/// surfacing `DispatchExhausted`.
pub const MAX_ROUTE_RETRIES: u32 = 8;

// ── TaskState ─────────────────────────────────────────────────────────────────

/// Where an agent is in its dispatch cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskState {
    /// No task has ever been applied.
    #[default]
    Idle,
    /// A destination is assigned and a route is set; the agent has not been
    /// polled since.
    Routed,
    /// Driving toward the destination edge.
    EnRoute,
    /// Arrival detected this tick; dwell accounting starts next poll.
    ArrivedPending,
    /// Halted at the berth, accumulating waiting time.
    Dwelling,
    /// Dwell complete; awaiting the next `apply_task`.
    Finished,
}

// ── AgentTask ─────────────────────────────────────────────────────────────────

/// Task-cycle state for one agent.
#[derive(Clone, Debug)]
pub struct AgentTask {
    agent: AgentId,
    kind: AgentKind,
    state: TaskState,
    destination: Option<TaskSpec>,
    last_destination_type: Option<DestKind>,
    paused_on_task: bool,
    finished: bool,
}

impl AgentTask {
    pub fn new(agent: AgentId, kind: AgentKind) -> Self {
        Self {
            agent,
            kind,
            state: TaskState::Idle,
            destination: None,
            last_destination_type: None,
            paused_on_task: false,
            finished: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The currently assigned destination, `None` while idle or finished.
    pub fn destination(&self) -> Option<&TaskSpec> {
        self.destination.as_ref()
    }

    /// Kind of the last destination this agent was routed to; drives the
    /// crane↔gantry alternation.
    pub fn last_destination_type(&self) -> Option<DestKind> {
        self.last_destination_type
    }

    pub fn is_paused_on_task(&self) -> bool {
        self.paused_on_task
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Assign a task and route the agent to it.
    ///
    /// With `explicit = None` the scheduler picks the destination via the
    /// alternation policy.  A `RouteNotFound` on the picked destination
    /// reclaims it and redraws with that id excluded, up to
    /// [`MAX_ROUTE_RETRIES`] times; running out of retries surfaces
    /// `DispatchExhausted`.
    pub fn apply_task<T: TrafficControl + ?Sized>(
        &mut self,
        explicit: Option<TaskSpec>,
        scheduler: &mut Scheduler,
        traffic: &mut T,
    ) -> FleetResult<()> {
        let mut explicit = explicit;
        let mut invalid = None;

        for _retry in 0..MAX_ROUTE_RETRIES {
            let task = match explicit.take() {
                Some(t) => t,
                None => scheduler.dispatch_task(self.agent, self.last_destination_type, invalid)?,
            };

            let current = match traffic.current_edge(self.agent) {
                Ok(edge) => edge,
                Err(e) => {
                    // The task was popped from pending but never registered.
                    scheduler.reclaim(task.kind, task.id, None);
                    return Err(e.into());
                }
            };

            match scheduler.request_route(traffic, current, task.edge) {
                Ok(route) => {
                    let commanded = traffic
                        .set_route(self.agent, &route)
                        .and_then(|()| traffic.set_speed(self.agent, SpeedCommand::Free));
                    if let Err(e) = commanded {
                        scheduler.reclaim(task.kind, task.id, None);
                        return Err(e.into());
                    }
                    scheduler.register_ongoing(task.kind, task.id, self.agent);

                    self.last_destination_type = Some(task.kind);
                    self.destination = Some(task);
                    self.paused_on_task = false;
                    self.finished = false;
                    self.state = TaskState::Routed;
                    debug!(agent = %self.agent, kind = %task.kind, dest = %task.id, "task applied");
                    return Ok(());
                }
                Err(DispatchError::RouteNotFound { start, end }) => {
                    warn!(
                        agent = %self.agent,
                        %start,
                        %end,
                        dest = %task.id,
                        "no route to destination, redrawing"
                    );
                    scheduler.reclaim(task.kind, task.id, None);
                    invalid = Some(task.id);
                }
                Err(e) => {
                    scheduler.reclaim(task.kind, task.id, None);
                    return Err(e.into());
                }
            }
        }

        Err(FleetError::Dispatch(DispatchError::DispatchExhausted {
            agent: self.agent,
            kind: self
                .last_destination_type
                .map(DestKind::opposite)
                .unwrap_or(DestKind::Crane),
            attempts: MAX_ROUTE_RETRIES,
        }))
    }

    /// Detect arrival at the destination berth.
    ///
    /// Polled every tick while the task is live.  Once the agent is on the
    /// destination edge within `threshold_distance` metres of the berth, it
    /// is halted and the state moves to `ArrivedPending`.  Returns whether
    /// the agent is (now or already) paused at its berth.
    pub fn check_task_start<T: TrafficControl + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler,
        traffic: &mut T,
        threshold_distance: f32,
    ) -> FleetResult<bool> {
        if self.paused_on_task {
            return Ok(true);
        }
        let Some(dest) = self.destination else {
            return Ok(false);
        };
        if self.state == TaskState::Routed {
            self.state = TaskState::EnRoute;
        }

        let arrived = (|| -> Result<bool, pf_traffic::TrafficError> {
            if traffic.current_edge(self.agent)? != dest.edge {
                return Ok(false);
            }
            let position = traffic.position(self.agent)?;
            Ok(position.distance(dest.position) < threshold_distance)
        })();

        match arrived {
            Ok(false) => Ok(false),
            Ok(true) => {
                traffic.set_speed(self.agent, SpeedCommand::Halt)?;
                self.paused_on_task = true;
                self.state = TaskState::ArrivedPending;
                debug!(agent = %self.agent, dest = %dest.id, "arrived at berth");
                Ok(true)
            }
            Err(e) => {
                self.abandon(scheduler);
                Err(e.into())
            }
        }
    }

    /// Detect dwell completion.
    ///
    /// Polled while paused at a berth.  When the simulator-reported waiting
    /// time reaches `pause_ticks_threshold` the task finishes: the ongoing
    /// bucket entry is removed, the destination's service log is stamped,
    /// and the state moves to `Finished`.  Returns whether the task finished
    /// on this call.
    pub fn check_task_finish<T: TrafficControl + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler,
        traffic: &mut T,
        pause_ticks_threshold: u64,
    ) -> FleetResult<bool> {
        match self.state {
            TaskState::ArrivedPending => self.state = TaskState::Dwelling,
            TaskState::Dwelling => {}
            _ => return Ok(false),
        }
        let Some(dest) = self.destination else {
            return Ok(false);
        };

        let waited = match traffic.waiting_ticks(self.agent) {
            Ok(w) => w,
            Err(e) => {
                self.abandon(scheduler);
                return Err(e.into());
            }
        };
        if waited < pause_ticks_threshold {
            return Ok(false);
        }

        scheduler.complete(dest.kind, dest.id, self.agent, traffic.now())?;
        self.destination = None;
        self.paused_on_task = false;
        self.finished = true;
        self.state = TaskState::Finished;
        debug!(agent = %self.agent, dest = %dest.id, waited, "task finished");
        Ok(true)
    }

    /// Drop the current task because the agent left the simulation.  The
    /// destination returns to circulation once its ongoing bucket empties.
    pub fn abandon(&mut self, scheduler: &mut Scheduler) {
        if let Some(dest) = self.destination.take() {
            scheduler.reclaim(dest.kind, dest.id, Some(self.agent));
            warn!(agent = %self.agent, dest = %dest.id, "agent vanished, task reclaimed");
        }
        self.paused_on_task = false;
        self.finished = true;
        self.state = TaskState::Finished;
    }
}
