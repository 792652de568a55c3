//! Unit tests for pf-traffic.

use pf_core::{AgentId, EdgeId, Point2};

use crate::{
    LaneSpec, MicroTraffic, RoadNetworkBuilder, SpeedCommand, TrafficControl, TrafficError,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Linear corridor a →e0→ b →e1→ c →e2→ d, each edge 100 m at 10 m/s,
/// plus a disconnected node/edge pair for unreachability tests.
fn corridor() -> (crate::RoadNetwork, [EdgeId; 4]) {
    let mut b = RoadNetworkBuilder::new();
    let a = b.add_node();
    let n1 = b.add_node();
    let n2 = b.add_node();
    let d = b.add_node();
    let iso1 = b.add_node();
    let iso2 = b.add_node();

    let p = |x: f32| Point2::new(x, 0.0);
    let e0 = b.add_edge(a, n1, vec![LaneSpec::straight(p(0.0), p(100.0), 10.0)]);
    let e1 = b.add_edge(n1, n2, vec![LaneSpec::straight(p(100.0), p(200.0), 10.0)]);
    let e2 = b.add_edge(n2, d, vec![LaneSpec::straight(p(200.0), p(300.0), 10.0)]);
    let iso = b.add_edge(
        iso1,
        iso2,
        vec![LaneSpec::straight(Point2::new(0.0, 500.0), Point2::new(100.0, 500.0), 10.0)],
    );
    (b.build(), [e0, e1, e2, iso])
}

// ── Network ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use super::*;

    #[test]
    fn edge_ids_are_insertion_order() {
        let (net, [e0, e1, e2, _]) = corridor();
        assert_eq!(e0, EdgeId(0));
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.edge_to[e1.index()], net.edge_from[e2.index()]);
        assert!((net.edge_length_m[e0.index()] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn first_lane_and_lane_data() {
        let (net, [e0, ..]) = corridor();
        let lane = net.first_lane(e0).unwrap();
        assert_eq!(net.lane_edge[lane.index()], e0);
        assert!((net.lane_length_m[lane.index()] - 100.0).abs() < 1e-3);
        assert_eq!(net.lane_max_speed[lane.index()], 10.0);
    }

    #[test]
    fn edge_without_lanes() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node();
        let c = b.add_node();
        let bare = b.add_edge(a, c, vec![]);
        let net = b.build();
        assert!(net.first_lane(bare).is_none());
        assert_eq!(net.edge_length_m[bare.index()], 0.0);
    }

    #[test]
    fn out_edges_grouped_by_source() {
        let (net, [e0, ..]) = corridor();
        let from = net.edge_from[e0.index()];
        assert_eq!(net.out_edges(from), &[e0]);
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use crate::{DijkstraRouter, Router};

    use super::*;

    #[test]
    fn chain_path() {
        let (net, [e0, e1, e2, _]) = corridor();
        let path = DijkstraRouter.edge_path(&net, e0, e2).unwrap();
        assert_eq!(path, vec![e0, e1, e2]);
    }

    #[test]
    fn adjacent_edges() {
        let (net, [e0, e1, ..]) = corridor();
        assert_eq!(DijkstraRouter.edge_path(&net, e0, e1).unwrap(), vec![e0, e1]);
    }

    #[test]
    fn same_edge_is_single_hop() {
        let (net, [e0, ..]) = corridor();
        assert_eq!(DijkstraRouter.edge_path(&net, e0, e0).unwrap(), vec![e0]);
    }

    #[test]
    fn unreachable_is_no_route() {
        let (net, [e0, _, _, iso]) = corridor();
        match DijkstraRouter.edge_path(&net, e0, iso) {
            Err(TrafficError::NoRoute { from, to }) => {
                assert_eq!(from, e0);
                assert_eq!(to, iso);
            }
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn prefers_cheaper_path() {
        // a → b directly (slow) vs a → m → b (fast): two hops win on time.
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node();
        let m = b.add_node();
        let z = b.add_node();
        let pre = b.add_node();
        let post = b.add_node();

        let p = |x: f32, y: f32| Point2::new(x, y);
        let start = b.add_edge(pre, a, vec![LaneSpec::straight(p(-100.0, 0.0), p(0.0, 0.0), 10.0)]);
        let slow = b.add_edge(a, z, vec![LaneSpec::straight(p(0.0, 0.0), p(200.0, 0.0), 1.0)]);
        let fast1 = b.add_edge(a, m, vec![LaneSpec::straight(p(0.0, 0.0), p(100.0, 50.0), 15.0)]);
        let fast2 = b.add_edge(m, z, vec![LaneSpec::straight(p(100.0, 50.0), p(200.0, 0.0), 15.0)]);
        let end = b.add_edge(z, post, vec![LaneSpec::straight(p(200.0, 0.0), p(300.0, 0.0), 10.0)]);
        let net = b.build();

        let path = DijkstraRouter.edge_path(&net, start, end).unwrap();
        assert_eq!(path, vec![start, fast1, fast2, end]);
        assert!(!path.contains(&slow));
    }
}

// ── MicroTraffic ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod micro {
    use super::*;

    #[test]
    fn moves_at_lane_speed() {
        let (net, [e0, e1, e2, _]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0, e1, e2]).unwrap();

        sim.advance_tick();
        // 10 m/s for 1 s → 10 m along e0.
        assert_eq!(sim.current_edge(AgentId(1)).unwrap(), e0);
        let pos = sim.position(AgentId(1)).unwrap();
        assert!((pos.x - 10.0).abs() < 1e-3);
        assert_eq!(sim.speed(AgentId(1)).unwrap(), 10.0);
    }

    #[test]
    fn crosses_edge_boundary() {
        let (net, [e0, e1, e2, _]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0, e1, e2]).unwrap();

        for _ in 0..12 {
            sim.advance_tick();
        }
        // 120 m from the origin → 20 m into e1.
        assert_eq!(sim.current_edge(AgentId(1)).unwrap(), e1);
        let pos = sim.position(AgentId(1)).unwrap();
        assert!((pos.x - 120.0).abs() < 1e-3);
    }

    #[test]
    fn stops_at_route_end() {
        let (net, [e0, e1, e2, _]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0, e1, e2]).unwrap();

        for _ in 0..100 {
            sim.advance_tick();
        }
        assert_eq!(sim.current_edge(AgentId(1)).unwrap(), e2);
        let pos = sim.position(AgentId(1)).unwrap();
        assert!((pos.x - 300.0).abs() < 1e-3);
        assert_eq!(sim.speed(AgentId(1)).unwrap(), 0.0);
    }

    #[test]
    fn halt_accumulates_waiting_and_resume_resets() {
        let (net, [e0, e1, e2, _]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0, e1, e2]).unwrap();

        sim.set_speed(AgentId(1), SpeedCommand::Halt).unwrap();
        for _ in 0..5 {
            sim.advance_tick();
        }
        assert_eq!(sim.waiting_ticks(AgentId(1)).unwrap(), 5);

        sim.set_speed(AgentId(1), SpeedCommand::Free).unwrap();
        sim.advance_tick();
        assert_eq!(sim.waiting_ticks(AgentId(1)).unwrap(), 0);
    }

    #[test]
    fn set_route_must_start_at_current_edge() {
        let (net, [e0, e1, e2, _]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0]).unwrap();

        match sim.set_route(AgentId(1), &[e1, e2]) {
            Err(TrafficError::RouteNotAtCurrentEdge { current, .. }) => assert_eq!(current, e0),
            other => panic!("expected RouteNotAtCurrentEdge, got {other:?}"),
        }
        sim.set_route(AgentId(1), &[e0, e1]).unwrap();
        assert_eq!(sim.route(AgentId(1)).unwrap(), &[e0, e1]);
    }

    #[test]
    fn vanished_agent_queries_fail() {
        let (net, [e0, ..]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0]).unwrap();
        sim.remove_agent(AgentId(1)).unwrap();

        assert!(matches!(
            sim.current_edge(AgentId(1)),
            Err(TrafficError::AgentVanished(a)) if a == AgentId(1)
        ));
    }

    #[test]
    fn duplicate_agent_rejected() {
        let (net, [e0, ..]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(1), &[e0]).unwrap();
        assert!(matches!(
            sim.add_agent(AgentId(1), &[e0]),
            Err(TrafficError::DuplicateAgent(_))
        ));
    }

    #[test]
    fn active_agents_ascending() {
        let (net, [e0, ..]) = corridor();
        let mut sim = MicroTraffic::new(net);
        sim.add_agent(AgentId(9), &[e0]).unwrap();
        sim.add_agent(AgentId(2), &[e0]).unwrap();
        sim.add_agent(AgentId(5), &[e0]).unwrap();
        assert_eq!(sim.active_agents(), vec![AgentId(2), AgentId(5), AgentId(9)]);
    }
}
