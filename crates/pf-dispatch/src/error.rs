use pf_core::{AgentId, DestId, DestKind, EdgeId};
use pf_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad network reference at startup (fatal, halts initialization).
    #[error("destination configuration error on edge {edge}: {reason}")]
    Configuration { edge: EdgeId, reason: String },

    /// No path between two edges, or a degenerate same-edge request.
    /// Recovered by requeueing the destination and retrying dispatch.
    #[error("no route from edge {start} to edge {end}")]
    RouteNotFound { start: EdgeId, end: EdgeId },

    /// No assignable destination after bounded pool expansions.  Fatal —
    /// surfaced to the caller, never retried indefinitely.
    #[error("no assignable {kind} destination for agent {agent} after {attempts} expansion attempts")]
    DispatchExhausted {
        agent: AgentId,
        kind: DestKind,
        attempts: u32,
    },

    #[error("unknown destination {kind} {id}")]
    UnknownDestination { kind: DestKind, id: DestId },

    /// A simulation query failed (includes `AgentVanished`).
    #[error(transparent)]
    Traffic(#[from] TrafficError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
