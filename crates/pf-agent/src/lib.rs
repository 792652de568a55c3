//! `pf-agent` — the per-agent task state machine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                      |
//! |----------------|-----------------------------------------------|
//! | [`task`]       | `AgentTask`, `TaskState`, `MAX_ROUTE_RETRIES` |
//! | [`capability`] | `ServiceCapability`, `NullService`            |
//! | [`error`]      | `FleetError`, `FleetResult<T>`                |
//!
//! An [`AgentTask`] tracks one agent through the dispatch cycle: assign a
//! destination, route to it, halt within the arrival threshold, dwell for
//! the configured number of ticks, finish, repeat.  The tick driver in
//! `pf-sim` owns one `AgentTask` per active agent and polls the transition
//! methods each tick.

pub mod capability;
pub mod error;
pub mod task;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use capability::{NullService, ServiceCapability};
pub use error::{FleetError, FleetResult};
pub use task::{AgentTask, TaskState, MAX_ROUTE_RETRIES};
