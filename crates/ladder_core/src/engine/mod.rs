//! Ladder aggregation and target-allocation engine.
//!
//! # Responsibility
//! - Aggregate atomic rungs into anchored blocks and back.
//! - Map completion to display intensity.
//! - Resolve selections and plan target fan-out writes.
//!
//! # Invariants
//! - Pure, synchronous data transformation: no I/O, no shared state.
//! - Block totals always equal the sums over their atomic rungs.

pub mod aggregate;
pub mod completion;
pub mod fan_out;
pub mod resolve;
