//! Rung store contracts and reference implementations.
//!
//! # Responsibility
//! - Define the data contract between the engine and the store that owns
//!   rungs, bonds and targets.
//! - Derive the atomic ladder from bond holdings and stored targets.
//!
//! # Invariants
//! - Writes validate input before touching storage.
//! - Stores never return blocks; aggregation is the engine's job.

pub mod overview;
pub mod sqlite;

use crate::db::DbError;
use crate::model::bond::{Bond, BondValidationError, NewBond};
use crate::model::rung::AtomicRung;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store failure for ladder reads and writes.
#[derive(Debug)]
pub enum StoreError {
    Validation(BondValidationError),
    Db(DbError),
    /// Rung ids are plain year strings.
    InvalidRungId(String),
    NegativeTarget(Decimal),
    DuplicateBond(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidRungId(id) => write!(f, "invalid rung id `{id}`: expected a year"),
            Self::NegativeTarget(value) => {
                write!(f, "target_amount cannot be negative, got {value}")
            }
            Self::DuplicateBond(id) => write!(f, "bond already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ladder data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BondValidationError> for StoreError {
    fn from(value: BondValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Atomic rungs plus the bonds attached to them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LadderOverview {
    /// Ascending by year.
    pub rungs: Vec<AtomicRung>,
    pub bonds: Vec<Bond>,
}

/// Store interface consumed by the ladder service.
pub trait LadderStore {
    fn list_rungs(&self) -> StoreResult<Vec<AtomicRung>>;
    fn list_bonds(&self) -> StoreResult<Vec<Bond>>;
    /// Upserts the explicit target of one atomic rung.
    fn update_target(&self, rung_id: &str, target_amount: Decimal) -> StoreResult<()>;
    fn create_bond(&self, bond: &NewBond) -> StoreResult<Bond>;

    fn load_overview(&self) -> StoreResult<LadderOverview> {
        Ok(LadderOverview {
            rungs: self.list_rungs()?,
            bonds: self.list_bonds()?,
        })
    }
}

impl<S: LadderStore + ?Sized> LadderStore for &S {
    fn list_rungs(&self) -> StoreResult<Vec<AtomicRung>> {
        (**self).list_rungs()
    }

    fn list_bonds(&self) -> StoreResult<Vec<Bond>> {
        (**self).list_bonds()
    }

    fn update_target(&self, rung_id: &str, target_amount: Decimal) -> StoreResult<()> {
        (**self).update_target(rung_id, target_amount)
    }

    fn create_bond(&self, bond: &NewBond) -> StoreResult<Bond> {
        (**self).create_bond(bond)
    }
}
