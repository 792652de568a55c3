use pf_dispatch::DispatchError;
use pf_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    /// Scheduler-side failure: exhausted dispatch, bad configuration, or a
    /// routing failure that survived every retry.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Simulator-side failure.  `AgentVanished` means the agent left the
    /// simulation; its task has already been reclaimed when this surfaces.
    #[error(transparent)]
    Traffic(#[from] TrafficError),
}

pub type FleetResult<T> = Result<T, FleetError>;
