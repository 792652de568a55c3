//! Unit tests for pf-agent.

use pf_core::{AgentId, AgentKind, DestKind, Point2};
use pf_dispatch::scheduler::{DispatchConfig, TaskSpec};
use pf_dispatch::{DispatchError, Scheduler};
use pf_traffic::{LaneSpec, MicroTraffic, RoadNetworkBuilder, TrafficControl};

use crate::{AgentTask, FleetError, TaskState};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Fixture {
    traffic: MicroTraffic,
    sched: Scheduler,
    crane: pf_core::EdgeId,
    entry: pf_core::EdgeId,
    isolated: pf_core::EdgeId,
}

/// Square loop with one berth edge per side plus an unreachable stub edge.
/// All edges 100 m at 10 m/s; `points_per_edge = 1` puts each berth at the
/// edge midpoint.
fn fixture(points_per_edge: usize) -> Fixture {
    let mut b = RoadNetworkBuilder::new();
    let n0 = b.add_node();
    let n1 = b.add_node();
    let n2 = b.add_node();
    let n3 = b.add_node();
    let n4 = b.add_node();
    let n5 = b.add_node();

    let p = |x: f32, y: f32| Point2::new(x, y);
    let crane = b.add_edge(n0, n1, vec![LaneSpec::straight(p(0.0, 0.0), p(100.0, 0.0), 10.0)]);
    let _c1 = b.add_edge(n1, n2, vec![LaneSpec::straight(p(100.0, 0.0), p(100.0, 100.0), 10.0)]);
    let gantry = b.add_edge(n2, n3, vec![LaneSpec::straight(p(100.0, 100.0), p(0.0, 100.0), 10.0)]);
    let entry = b.add_edge(n3, n0, vec![LaneSpec::straight(p(0.0, 100.0), p(0.0, 0.0), 10.0)]);
    let isolated = b.add_edge(n4, n5, vec![LaneSpec::straight(p(500.0, 0.0), p(600.0, 0.0), 10.0)]);

    let traffic = MicroTraffic::new(b.build());
    let config = DispatchConfig {
        crane_edges: vec![crane],
        gantry_edges: vec![gantry],
        other_edges: vec![],
        points_per_edge,
        seed: 11,
    };
    let mut sched = Scheduler::new(config.seed);
    sched.generate_destinations(&config, &traffic).unwrap();

    Fixture { traffic, sched, crane, entry, isolated }
}

/// Drive the agent until `check_task_start` fires; panics after `max` ticks.
fn drive_to_berth(fx: &mut Fixture, task: &mut AgentTask, threshold: f32, max: usize) {
    for _ in 0..max {
        if task.check_task_start(&mut fx.sched, &mut fx.traffic, threshold).unwrap() {
            return;
        }
        fx.traffic.advance_tick();
    }
    panic!("agent never reached its berth");
}

/// Dwell until `check_task_finish` fires; panics after `max` ticks.
fn dwell_to_finish(fx: &mut Fixture, task: &mut AgentTask, threshold: u64, max: usize) {
    for _ in 0..max {
        if task.check_task_finish(&mut fx.sched, &mut fx.traffic, threshold).unwrap() {
            return;
        }
        fx.traffic.advance_tick();
    }
    panic!("dwell never completed");
}

// ── applyTask ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod apply {
    use super::*;

    #[test]
    fn routes_and_registers_fresh_agent() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();

        let mut task = AgentTask::new(a, AgentKind::Truck);
        assert_eq!(task.state(), TaskState::Idle);

        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();
        let dest = task.destination().copied().unwrap();
        assert_eq!(dest.kind, DestKind::Crane, "fresh agents start on the crane side");
        assert_eq!(task.state(), TaskState::Routed);
        assert_eq!(task.last_destination_type(), Some(DestKind::Crane));
        assert!(!task.is_finished());

        let route = fx.traffic.route(a).unwrap();
        assert_eq!(route.first(), Some(&fx.entry));
        assert_eq!(route.last(), Some(&dest.edge));
        assert_eq!(fx.sched.ongoing_agents(dest.kind, dest.id), &[a]);
    }

    #[test]
    fn explicit_task_bypasses_dispatch() {
        let mut fx = fixture(1);
        let a = AgentId(2);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();

        let pending_before = fx.sched.pending_count(DestKind::Crane);
        let spec = TaskSpec::from(fx.sched.destination(DestKind::Crane, pf_core::DestId(0)).unwrap());

        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(Some(spec), &mut fx.sched, &mut fx.traffic).unwrap();

        assert_eq!(task.destination().unwrap().id, pf_core::DestId(0));
        // The pending pool is untouched: the task never went through dispatch.
        assert_eq!(fx.sched.pending_count(DestKind::Crane), pending_before);
    }

    #[test]
    fn unroutable_agent_exhausts_and_restores_pending() {
        let mut fx = fixture(2);
        let a = AgentId(1);
        fx.traffic.add_agent(a, &[fx.isolated]).unwrap();

        let pending_before = fx.sched.pending_count(DestKind::Crane);
        let mut task = AgentTask::new(a, AgentKind::Truck);

        match task.apply_task(None, &mut fx.sched, &mut fx.traffic) {
            Err(FleetError::Dispatch(DispatchError::DispatchExhausted { agent, .. })) => {
                assert_eq!(agent, a);
            }
            other => panic!("expected DispatchExhausted, got {other:?}"),
        }
        // Every failed draw was reclaimed.
        assert_eq!(fx.sched.pending_count(DestKind::Crane), pending_before);
        for id in [pf_core::DestId(0), pf_core::DestId(1)] {
            assert!(fx.sched.ongoing_agents(DestKind::Crane, id).is_empty());
        }
        assert_eq!(task.state(), TaskState::Idle);
    }
}

// ── Arrival and dwell ─────────────────────────────────────────────────────────

#[cfg(test)]
mod arrival {
    use super::*;

    #[test]
    fn halts_within_threshold_of_the_berth() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();
        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();
        let dest = task.destination().copied().unwrap();

        drive_to_berth(&mut fx, &mut task, 10.0, 60);

        assert!(task.is_paused_on_task());
        assert_eq!(task.state(), TaskState::ArrivedPending);
        assert_eq!(fx.traffic.current_edge(a).unwrap(), dest.edge);
        let dist = fx.traffic.position(a).unwrap().distance(dest.position);
        assert!(dist < 10.0, "triggered at distance {dist}");

        // The halt takes effect on the next step.
        fx.traffic.advance_tick();
        assert_eq!(fx.traffic.speed(a).unwrap(), 0.0);
        // Repeated polls stay true without touching state.
        assert!(task.check_task_start(&mut fx.sched, &mut fx.traffic, 10.0).unwrap());
        assert_eq!(task.state(), TaskState::ArrivedPending);
    }

    #[test]
    fn no_finish_before_dwell_threshold() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();
        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();

        // En route: finish polling is a no-op.
        assert!(!task.check_task_finish(&mut fx.sched, &mut fx.traffic, 10).unwrap());
        assert_eq!(task.state(), TaskState::EnRoute);

        drive_to_berth(&mut fx, &mut task, 10.0, 60);

        // First finish poll promotes ArrivedPending to Dwelling.
        assert!(!task.check_task_finish(&mut fx.sched, &mut fx.traffic, 10).unwrap());
        assert_eq!(task.state(), TaskState::Dwelling);
        assert!(fx.traffic.waiting_ticks(a).unwrap() < 10);
    }

    #[test]
    fn dwell_completion_finishes_and_stamps_log() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();
        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();
        let dest = task.destination().copied().unwrap();

        drive_to_berth(&mut fx, &mut task, 10.0, 60);
        dwell_to_finish(&mut fx, &mut task, 10, 40);

        assert!(task.is_finished());
        assert_eq!(task.state(), TaskState::Finished);
        assert!(task.destination().is_none());
        assert!(!task.is_paused_on_task());
        assert!(fx.traffic.waiting_ticks(a).unwrap() >= 10);

        let log = fx.sched.service_log(dest.kind, dest.id).unwrap();
        assert_eq!(log.agent, a);
        assert_eq!(log.finished_at, fx.traffic.now());
        assert!(fx.sched.ongoing_agents(dest.kind, dest.id).is_empty());
    }

    #[test]
    fn finish_restarts_the_cycle_on_the_other_side() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();
        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();

        drive_to_berth(&mut fx, &mut task, 10.0, 60);
        dwell_to_finish(&mut fx, &mut task, 10, 40);

        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();
        assert_eq!(task.destination().unwrap().kind, DestKind::Gantry);
        assert_eq!(task.state(), TaskState::Routed);
        assert!(!task.is_finished());
    }
}

// ── Vanished agents ───────────────────────────────────────────────────────────

#[cfg(test)]
mod vanished {
    use super::*;
    use pf_traffic::TrafficError;

    #[test]
    fn query_failure_reclaims_and_surfaces() {
        let mut fx = fixture(1);
        let a = AgentId(0);
        fx.traffic.add_agent(a, &[fx.entry]).unwrap();
        let mut task = AgentTask::new(a, AgentKind::Truck);
        task.apply_task(None, &mut fx.sched, &mut fx.traffic).unwrap();
        let dest = task.destination().copied().unwrap();
        let pending_before = fx.sched.pending_count(DestKind::Crane);

        fx.traffic.remove_agent(a).unwrap();

        match task.check_task_start(&mut fx.sched, &mut fx.traffic, 10.0) {
            Err(FleetError::Traffic(TrafficError::AgentVanished(id))) => assert_eq!(id, a),
            other => panic!("expected AgentVanished, got {other:?}"),
        }
        // Sole bucket occupant gone: the destination is back in circulation.
        assert!(fx.sched.ongoing_agents(dest.kind, dest.id).is_empty());
        assert_eq!(fx.sched.pending_count(DestKind::Crane), pending_before + 1);
        assert!(task.destination().is_none());
    }
}
