//! terminal — port fleet dispatch demo.
//!
//! Four trucks shuttle containers between the crane yard and the gantry
//! yard of a synthetic terminal, crossing one arbitrated junction on every
//! leg.  Per-tick fleet metrics and the task log land in `output/terminal/`.

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use pf_core::{AgentId, AgentKind, DestKind, Point2};
use pf_dispatch::scheduler::DispatchConfig;
use pf_junction::JunctionConfig;
use pf_sim::{CsvMetricsObserver, FleetSimBuilder};
use pf_traffic::MicroTraffic;

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const TRUCK_COUNT: u32 = 4;
const SEED: u64 = 42;
const TOTAL_TICKS: u64 = 600;
// Enough berths for the whole fleet to start on the crane side at once.
const BERTHS_PER_EDGE: usize = 4;
const JUNCTION_RADIUS_M: f32 = 30.0;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== terminal — port fleet dispatch ===");
    println!("Trucks: {TRUCK_COUNT}  |  Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!();

    // 1. Build the terminal network.
    let terminal = build_network();
    println!("Terminal network: 8 junction arms, crane yard west, gantry yard east");

    // 2. Dispatch configuration: berths on the crane and gantry edges.
    let dispatch = DispatchConfig {
        crane_edges: vec![terminal.crane],
        gantry_edges: vec![terminal.gantry],
        other_edges: vec![],
        points_per_edge: BERTHS_PER_EDGE,
        seed: SEED,
    };

    // 3. Build the sim with the central junction arbitrated.
    let mut sim = FleetSimBuilder::new(MicroTraffic::new(terminal.network), dispatch)
        .junction(JunctionConfig {
            center: Point2::new(0.0, 0.0),
            radius: JUNCTION_RADIUS_M,
            arm_edges: terminal.arms,
        })
        .dwell_ticks(10)
        .build()?;

    // 4. Spawn the fleet, half on each side of the terminal.
    let spawn_edges = [
        terminal.crane_return,
        terminal.gantry_return,
        terminal.crane_return,
        terminal.gantry_return,
    ];
    for i in 0..TRUCK_COUNT {
        sim.spawn_agent(AgentId(i), AgentKind::Truck, spawn_edges[i as usize % 4])?;
    }

    // 5. Set up metrics output.
    std::fs::create_dir_all("output/terminal")?;
    let mut observer = CsvMetricsObserver::new(Path::new("output/terminal"))?;

    // 6. Run.
    let t0 = Instant::now();
    sim.macro_step(TOTAL_TICKS, &mut observer)?;
    let elapsed = t0.elapsed();
    observer.finish()?;

    // 7. Report.
    println!();
    println!("Ran {TOTAL_TICKS} ticks in {elapsed:.2?}");
    for kind in [DestKind::Crane, DestKind::Gantry] {
        for i in 0..BERTHS_PER_EDGE as u32 {
            let id = pf_core::DestId(i);
            match sim.destination_service_log(kind, id) {
                Some(log) => println!(
                    "  {kind} berth {i}: last served by agent {} at {}",
                    log.agent.0, log.finished_at
                ),
                None => println!("  {kind} berth {i}: never served"),
            }
        }
    }
    println!("Metrics written to output/terminal/");
    Ok(())
}
