use pf_agent::FleetError;
use pf_dispatch::DispatchError;
use pf_junction::JunctionError;
use pf_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Junction(#[from] JunctionError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),

    /// Metrics export failed.
    #[error("metrics output error: {0}")]
    Output(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
