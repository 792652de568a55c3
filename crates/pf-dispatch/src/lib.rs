//! `pf-dispatch` — destination registry and task scheduler.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`destination`] | `Destination`, `ServiceRecord`, `DestinationRegistry` |
//! | [`scheduler`]   | `Scheduler`, `DispatchConfig`, `TaskSpec`             |
//! | [`error`]       | `DispatchError`, `DispatchResult<T>`                  |
//!
//! # Task model (summary)
//!
//! Destinations are fixed service points (berths) interpolated along
//! configured edges at startup.  Per destination kind the scheduler keeps a
//! `pending` pool of assignable ids and `ongoing` buckets mapping an id to
//! the agents currently routed to it (multi-berth: a bucket may hold several
//! agents, FIFO by assignment).  Dispatch alternates each agent between the
//! crane side and the gantry side, refilling the pending pool from the free
//! id space when it runs dry, up to a bounded number of expansions.

pub mod destination;
pub mod error;
pub mod scheduler;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use destination::{Destination, DestinationRegistry, ServiceRecord};
pub use error::{DispatchError, DispatchResult};
pub use scheduler::{DispatchConfig, Scheduler, TaskSpec, MAX_EXPAND_ATTEMPTS};
