//! Kind-specific service behavior hooks.
//!
//! The terminal model distinguishes trucks, cranes, gantries and bridge
//! carriers, but what a crane actually *does* while an agent dwells at its
//! berth is not yet specified anywhere; the dwell timer in
//! `AgentTask::check_task_finish` stands in for real service work.  The
//! hooks exist so a tick driver can attach that behavior later without
//! touching the state machine.

use pf_core::AgentId;
use pf_dispatch::scheduler::TaskSpec;

/// Optional service-side behavior invoked around an agent's dwell.
///
/// All hooks default to no-ops.
pub trait ServiceCapability {
    /// The agent has halted at its berth; service may begin.
    fn on_service_start(&mut self, _agent: AgentId, _task: &TaskSpec) {}

    /// The agent's dwell completed and it is about to be re-dispatched.
    fn on_service_end(&mut self, _agent: AgentId, _task: &TaskSpec) {}
}

/// The default capability: no service behavior at all.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullService;

impl ServiceCapability for NullService {}
