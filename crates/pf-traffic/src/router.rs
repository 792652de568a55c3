//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `MicroTraffic` (and any other `TrafficControl` implementation built on
//! [`RoadNetwork`]) resolves shortest-path queries through the [`Router`]
//! trait, so a contraction hierarchy or congestion-aware router can be
//! swapped in without touching the dispatch core.  The default
//! [`DijkstraRouter`] is sufficient for terminal-scale networks.
//!
//! # Route shape
//!
//! Fleet routes are **edge-to-edge**: a route starts on the agent's current
//! edge and ends on the destination's edge, inclusive of both.  Internally
//! the router runs node-to-node Dijkstra from the start edge's head node to
//! the end edge's tail node and splices the terminal edges on.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use pf_core::{EdgeId, NodeId};

use crate::network::RoadNetwork;
use crate::{TrafficError, TrafficResult};

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine over edge-to-edge queries.
///
/// Implementations must be `Send + Sync` so a traffic model can be shared
/// behind a trait object by a multi-threaded tick driver.
pub trait Router: Send + Sync {
    /// Ordered edge sequence from `from` to `to`, inclusive of both.
    ///
    /// `from == to` yields the single-edge route `[from]`; the scheduler
    /// rejects that case before it ever reaches the router.
    fn edge_path(
        &self,
        network: &RoadNetwork,
        from: EdgeId,
        to: EdgeId,
    ) -> TrafficResult<Vec<EdgeId>>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the adjacency index, with
/// `edge_travel_ms` as cost and `NodeId` as a deterministic tie-break.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn edge_path(
        &self,
        network: &RoadNetwork,
        from: EdgeId,
        to: EdgeId,
    ) -> TrafficResult<Vec<EdgeId>> {
        if !network.contains_edge(from) {
            return Err(TrafficError::UnknownEdge(from));
        }
        if !network.contains_edge(to) {
            return Err(TrafficError::UnknownEdge(to));
        }
        if from == to {
            return Ok(vec![from]);
        }

        let start = network.edge_to[from.index()];   // head of the start edge
        let goal  = network.edge_from[to.index()];   // tail of the end edge

        // Directly adjacent edges need no search.
        if start == goal {
            return Ok(vec![from, to]);
        }

        let middle = dijkstra(network, start, goal)
            .ok_or(TrafficError::NoRoute { from, to })?;

        let mut path = Vec::with_capacity(middle.len() + 2);
        path.push(from);
        path.extend(middle);
        path.push(to);
        Ok(path)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Node-to-node Dijkstra returning the edge sequence, or `None` if `goal` is
/// unreachable from `start`.
fn dijkstra(network: &RoadNetwork, start: NodeId, goal: NodeId) -> Option<Vec<EdgeId>> {
    let n = network.node_count();
    // Best known travel cost (ms) per node; prev_edge[v] is the edge the
    // best path used to reach v, INVALID while unreached.
    let mut dist = vec![u32::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[start.index()] = 0;

    // BinaryHeap is a max-heap; Reverse turns it into the min-heap we need.
    let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == goal {
            return Some(reconstruct(network, &prev_edge, goal));
        }

        // Stale entry, a cheaper path already settled this node.
        if cost > dist[node.index()] {
            continue;
        }

        for &edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost.saturating_add(network.edge_travel_ms[edge.index()]);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    None
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], goal: NodeId) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let mut cur = goal;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();
    edges
}
