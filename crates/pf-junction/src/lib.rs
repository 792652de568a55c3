//! `pf-junction` — conflict arbitration for the terminal's central junction.
//!
//! # Crate layout
//!
//! | Module       | Contents                                 |
//! |--------------|------------------------------------------|
//! | [`conflict`] | `Movement`, `ConflictTable`              |
//! | [`arbiter`]  | `JunctionArbiter`, `JunctionConfig`      |
//! | [`error`]    | `JunctionError`, `JunctionResult<T>`     |
//!
//! The junction has no traffic lights.  Instead, every agent entering the
//! arbitration radius on an inbound arm is halted and registered as a
//! request; once per tick the arbiter admits the oldest requests whose
//! movements conflict with nothing currently crossing, and releases them.

pub mod arbiter;
pub mod conflict;
pub mod error;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use arbiter::{JunctionArbiter, JunctionConfig};
pub use conflict::{ConflictTable, Movement};
pub use error::{JunctionError, JunctionResult};
