//! `pf-core` — foundational types for the `port_fleet` dispatch framework.
//!
//! This crate is a dependency of every other `pf-*` crate.  It intentionally
//! has no `pf-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `LaneId`, `DestId`     |
//! | [`geo`]         | `Point2`, polyline sampling                           |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SimRng` (seeded, reproducible)                       |
//! | [`kind`]        | `AgentKind`, `DestKind` enums                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Point2;
pub use ids::{AgentId, DestId, EdgeId, LaneId, NodeId};
pub use kind::{AgentKind, DestKind};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
