//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph is a directed edge list over junction nodes, with a CSR-style
//! adjacency index for outgoing edges.  `EdgeId`s are stable insertion
//! indices (configuration files reference edges by id), so instead of sorting
//! the edge arrays themselves, `build()` sorts a permutation:
//!
//! ```text
//! out_edge_ids[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! holds the `EdgeId`s leaving node `n`.  Iteration over a node's outgoing
//! edges is a contiguous scan of that slice.
//!
//! # Lanes
//!
//! Each edge carries one or more lanes in a flat lane table (`LaneId` is an
//! index into it).  A lane has a polyline shape in network coordinates, a
//! maximum speed, and a length derived from its shape.  Destination
//! generation interpolates service points along an edge's **first** lane.

use pf_core::geo::polyline_length;
use pf_core::{EdgeId, LaneId, NodeId, Point2};

// ── LaneSpec ──────────────────────────────────────────────────────────────────

/// Input description of one lane, consumed by [`RoadNetworkBuilder::add_edge`].
#[derive(Clone, Debug)]
pub struct LaneSpec {
    /// Polyline in network coordinates (metres).  At least two vertices.
    pub shape: Vec<Point2>,
    /// Maximum speed on this lane, m/s.
    pub max_speed: f32,
}

impl LaneSpec {
    /// Straight lane between two points at the given speed limit.
    pub fn straight(from: Point2, to: Point2, max_speed: f32) -> Self {
        Self { shape: vec![from, to], max_speed }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed edge graph with per-edge lanes.
///
/// Fields are `pub` so routing and the reference simulator can index
/// directly; always go through [`RoadNetworkBuilder`] to create one.
pub struct RoadNetwork {
    // ── Adjacency (CSR over a permutation, see module docs) ───────────────
    /// Row pointer: outgoing edges of node `n` occupy
    /// `out_edge_ids[node_out_start[n] .. node_out_start[n+1]]`.
    pub node_out_start: Vec<u32>,
    /// Edge ids grouped by source node.
    pub out_edge_ids: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId = insertion order) ───────────────────
    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,
    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,
    /// Length of each edge in metres (first lane's polyline length).
    pub edge_length_m: Vec<f32>,
    /// Travel time in milliseconds at the first lane's max speed.  Used as
    /// the Dijkstra edge cost.
    pub edge_travel_ms: Vec<u32>,
    /// Row pointer into the lane table: lanes of edge `e` are LaneIds
    /// `edge_lane_start[e] .. edge_lane_start[e+1]`.
    pub edge_lane_start: Vec<u32>,

    // ── Lane data (indexed by LaneId) ─────────────────────────────────────
    /// Owning edge of each lane.
    pub lane_edge: Vec<EdgeId>,
    /// Polyline shape of each lane.
    pub lane_shape: Vec<Vec<Point2>>,
    /// Maximum speed of each lane, m/s.
    pub lane_max_speed: Vec<f32>,
    /// Length of each lane in metres.
    pub lane_length_m: Vec<f32>,
}

impl RoadNetwork {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_out_start.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_edge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_to.is_empty()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        edge.index() < self.edge_count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Outgoing edges of `node` — a contiguous slice, no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        &self.out_edge_ids[start..end]
    }

    // ── Lane queries ──────────────────────────────────────────────────────

    /// Lanes of `edge` as a `LaneId` range.
    #[inline]
    pub fn lanes_of(&self, edge: EdgeId) -> impl Iterator<Item = LaneId> + '_ {
        let start = self.edge_lane_start[edge.index()] as usize;
        let end   = self.edge_lane_start[edge.index() + 1] as usize;
        (start..end).map(|i| LaneId(i as u32))
    }

    /// The first (rightmost) lane of `edge`, or `None` if the edge has no
    /// lanes.  Destination generation and the reference simulator both drive
    /// on the first lane.
    pub fn first_lane(&self, edge: EdgeId) -> Option<LaneId> {
        self.lanes_of(edge).next()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order; `EdgeId`s are
/// assigned in insertion order and remain stable through `build()`.
///
/// # Example
///
/// ```
/// use pf_core::Point2;
/// use pf_traffic::{LaneSpec, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node();
/// let c = b.add_node();
/// let lane = LaneSpec::straight(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0), 10.0);
/// b.add_edge(a, c, vec![lane]);
/// let net = b.build();
/// assert_eq!(net.edge_count(), 1);
/// ```
pub struct RoadNetworkBuilder {
    node_count: usize,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    lanes: Vec<LaneSpec>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { node_count: 0, raw_edges: Vec::new() }
    }

    /// Add a junction node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.node_count as u32);
        self.node_count += 1;
        id
    }

    /// Add a **directed** edge from `from` to `to` with the given lanes and
    /// return its `EdgeId`.
    ///
    /// Edge length and travel cost are derived from the first lane; an edge
    /// added with no lanes gets zero length and is rejected later by
    /// destination generation.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, lanes: Vec<LaneSpec>) -> EdgeId {
        let id = EdgeId(self.raw_edges.len() as u32);
        self.raw_edges.push(RawEdge { from, to, lanes });
        id
    }

    pub fn node_count(&self) -> usize { self.node_count }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Finalize into a [`RoadNetwork`].
    ///
    /// O(E log E) for the adjacency permutation sort.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.node_count;
        let edge_count = self.raw_edges.len();

        // ── Edge arrays in insertion order ────────────────────────────────
        let edge_from: Vec<NodeId> = self.raw_edges.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeId> = self.raw_edges.iter().map(|e| e.to).collect();

        let mut edge_length_m  = Vec::with_capacity(edge_count);
        let mut edge_travel_ms = Vec::with_capacity(edge_count);
        let mut edge_lane_start = Vec::with_capacity(edge_count + 1);
        let mut lane_edge      = Vec::new();
        let mut lane_shape     = Vec::new();
        let mut lane_max_speed = Vec::new();
        let mut lane_length_m  = Vec::new();

        edge_lane_start.push(0u32);
        for (i, raw) in self.raw_edges.iter().enumerate() {
            let (len, ms) = match raw.lanes.first() {
                Some(lane) => {
                    let len = polyline_length(&lane.shape);
                    let ms = if lane.max_speed > 0.0 {
                        (len / lane.max_speed * 1000.0) as u32
                    } else {
                        u32::MAX
                    };
                    (len, ms)
                }
                None => (0.0, u32::MAX),
            };
            edge_length_m.push(len);
            edge_travel_ms.push(ms);

            for lane in &raw.lanes {
                lane_edge.push(EdgeId(i as u32));
                lane_length_m.push(polyline_length(&lane.shape));
                lane_max_speed.push(lane.max_speed);
                lane_shape.push(lane.shape.clone());
            }
            edge_lane_start.push(lane_edge.len() as u32);
        }

        // ── Adjacency permutation, grouped by source node ─────────────────
        let mut out_edge_ids: Vec<EdgeId> = (0..edge_count as u32).map(EdgeId).collect();
        out_edge_ids.sort_unstable_by_key(|e| edge_from[e.index()].0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &self.raw_edges {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        RoadNetwork {
            node_out_start,
            out_edge_ids,
            edge_from,
            edge_to,
            edge_length_m,
            edge_travel_ms,
            edge_lane_start,
            lane_edge,
            lane_shape,
            lane_max_speed,
            lane_length_m,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
