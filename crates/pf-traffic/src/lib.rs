//! `pf-traffic` — the simulation-collaborator boundary for `port_fleet`.
//!
//! The dispatch core never talks to a motion simulator directly; everything
//! goes through the [`TrafficControl`] trait, which mirrors the query/command
//! surface of a microscopic traffic simulator (current edge, position, speed
//! commands, route assignment, waiting time, shortest paths).
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`network`]  | `RoadNetwork` (edge graph with per-edge lanes), builder  |
//! | [`router`]   | `Router` trait, `DijkstraRouter`                         |
//! | [`control`]  | `TrafficControl` trait, `SpeedCommand`                   |
//! | [`micro`]    | `MicroTraffic` — deterministic constant-speed simulator  |
//! | [`error`]    | `TrafficError`, `TrafficResult<T>`                       |
//!
//! `MicroTraffic` implements no car-following and no collision model; it
//! exists so tests, demos, and policy experiments have a deterministic
//! collaborator with the same interface a full simulator would expose.

pub mod control;
pub mod error;
pub mod micro;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use control::{SpeedCommand, TrafficControl};
pub use error::{TrafficError, TrafficResult};
pub use micro::MicroTraffic;
pub use network::{LaneSpec, RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Router};
