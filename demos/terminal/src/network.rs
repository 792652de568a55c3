//! Synthetic container-terminal road network.
//!
//! Layout (all distances in metres):
//!
//! ```text
//!                N (0,200)
//!                 │
//!  W2 ══crane══ W ┼ E ══gantry══ E2
//! (-400,0)  (-200,0) (200,0)  (400,0)
//!                 │
//!                S (0,-200)
//! ```
//!
//! One arbitrated 8-arm junction at the origin connects the crane yard
//! (west) with the gantry yard (east).  Every yard edge is paired with a
//! return edge so agents can shuttle back and forth indefinitely.

use pf_core::{EdgeId, Point2};
use pf_traffic::{LaneSpec, RoadNetwork, RoadNetworkBuilder};

/// Yard travel speed, m/s.
const YARD_SPEED: f32 = 10.0;

pub struct TerminalNetwork {
    pub network: RoadNetwork,
    /// The 8 junction arm edges, even = inbound, odd = outbound.
    pub arms: [EdgeId; 8],
    /// Crane-side berth edge (west yard).
    pub crane: EdgeId,
    /// Gantry-side berth edge (east yard).
    pub gantry: EdgeId,
    /// Return edges, used as spawn points.
    pub crane_return: EdgeId,
    pub gantry_return: EdgeId,
}

/// Build the terminal: a 4-way junction with 200 m arms plus one berth
/// edge and its return on the west and east sides.
pub fn build_network() -> TerminalNetwork {
    let mut b = RoadNetworkBuilder::new();
    let center = b.add_node();
    let east = b.add_node();
    let north = b.add_node();
    let west = b.add_node();
    let south = b.add_node();
    let far_west = b.add_node();
    let far_east = b.add_node();

    let p = |x: f32, y: f32| Point2::new(x, y);
    let lane = |a: Point2, z: Point2| vec![LaneSpec::straight(a, z, YARD_SPEED)];

    let arms = [
        b.add_edge(east, center, lane(p(200.0, 0.0), p(0.0, 0.0))),
        b.add_edge(center, north, lane(p(0.0, 0.0), p(0.0, 200.0))),
        b.add_edge(north, center, lane(p(0.0, 200.0), p(0.0, 0.0))),
        b.add_edge(center, west, lane(p(0.0, 0.0), p(-200.0, 0.0))),
        b.add_edge(west, center, lane(p(-200.0, 0.0), p(0.0, 0.0))),
        b.add_edge(center, south, lane(p(0.0, 0.0), p(0.0, -200.0))),
        b.add_edge(south, center, lane(p(0.0, -200.0), p(0.0, 0.0))),
        b.add_edge(center, east, lane(p(0.0, 0.0), p(200.0, 0.0))),
    ];

    let crane = b.add_edge(west, far_west, lane(p(-200.0, 0.0), p(-400.0, 0.0)));
    let crane_return = b.add_edge(far_west, west, lane(p(-400.0, 0.0), p(-200.0, 0.0)));
    let gantry = b.add_edge(east, far_east, lane(p(200.0, 0.0), p(400.0, 0.0)));
    let gantry_return = b.add_edge(far_east, east, lane(p(400.0, 0.0), p(200.0, 0.0)));

    TerminalNetwork {
        network: b.build(),
        arms,
        crane,
        gantry,
        crane_return,
        gantry_return,
    }
}
