//! `pf-sim` — the tick driver tying the fleet together.
//!
//! # Crate layout
//!
//! | Module       | Contents                                       |
//! |--------------|------------------------------------------------|
//! | [`sim`]      | `FleetSim`, `FleetConfig`                      |
//! | [`builder`]  | `FleetSimBuilder`                              |
//! | [`observer`] | `FleetObserver`, `TickSummary`, `NoopObserver` |
//! | [`csv`]      | `CsvMetricsObserver`                           |
//! | [`error`]    | `SimError`, `SimResult<T>`                     |
//!
//! # Example
//!
//! ```rust,ignore
//! let traffic = MicroTraffic::new(network);
//! let mut sim = FleetSimBuilder::new(traffic, dispatch_config)
//!     .junction(junction_config)
//!     .build()?;
//! sim.spawn_agent(AgentId(0), AgentKind::Truck, entry_edge)?;
//! sim.macro_step(600, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod csv;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::FleetSimBuilder;
pub use csv::CsvMetricsObserver;
pub use error::{SimError, SimResult};
pub use observer::{FleetObserver, NoopObserver, TickSummary};
pub use sim::{FleetConfig, FleetSim};
