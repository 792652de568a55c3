use pf_core::EdgeId;
use pf_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JunctionError {
    /// The eight configured arm edges are not distinct.
    #[error("junction arm edge {edge} configured more than once")]
    DuplicateArm { edge: EdgeId },

    /// A simulator query or command failed mid-pass.
    #[error(transparent)]
    Traffic(#[from] TrafficError),
}

pub type JunctionResult<T> = Result<T, JunctionError>;
