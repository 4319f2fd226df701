//! Ladder domain model.
//!
//! # Responsibility
//! - Define canonical rung, block, bond and selection records.
//! - Keep money in `Decimal` and calendar dates in `NaiveDate`.
//!
//! # Invariants
//! - Atomic rungs are identified by their year string.
//! - Blocks are derived views and are never persisted.

pub mod bond;
pub mod rung;
pub mod selection;
