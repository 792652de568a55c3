use pf_core::{AgentId, EdgeId, LaneId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    /// The simulator no longer tracks this agent.  The fleet layer treats
    /// this as agent removal (reclaim its destination, drop tracking).
    #[error("agent {0} is not present in the simulation")]
    AgentVanished(AgentId),

    #[error("agent {0} already exists in the simulation")]
    DuplicateAgent(AgentId),

    #[error("edge {0} not found in the network")]
    UnknownEdge(EdgeId),

    #[error("lane {0} not found in the network")]
    UnknownLane(LaneId),

    #[error("edge {0} has no lanes")]
    EdgeWithoutLanes(EdgeId),

    #[error("no route from edge {from} to edge {to}")]
    NoRoute { from: EdgeId, to: EdgeId },

    #[error("route for agent {agent} must start at its current edge {current}")]
    RouteNotAtCurrentEdge { agent: AgentId, current: EdgeId },

    #[error("route for agent {0} is empty")]
    EmptyRoute(AgentId),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
