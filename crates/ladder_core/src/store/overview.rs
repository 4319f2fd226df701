//! Atomic ladder derivation from bond holdings.
//!
//! # Invariants
//! - No bonds means no rungs.
//! - Every year in `[min(floor_year, first maturity), last maturity +
//!   shoulder_years]` has exactly one rung.
//! - `current_amount` is the sum of face values maturing in that year.
//! - The year range is clamped to chrono's calendar.

use crate::model::bond::Bond;
use crate::model::rung::{normalize_target, AtomicRung};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Builds ascending atomic rungs for `bonds`, applying stored `targets`
/// keyed by rung id.
pub fn derive_rungs(
    bonds: &[Bond],
    targets: &HashMap<String, Decimal>,
    floor_year: i32,
    shoulder_years: u32,
) -> Vec<AtomicRung> {
    let maturity_years = bonds.iter().map(Bond::maturity_year);
    let (Some(first), Some(last)) = (maturity_years.clone().min(), maturity_years.max()) else {
        return Vec::new();
    };

    let start_year = floor_year.min(first).max(NaiveDate::MIN.year());
    let end_year = last
        .saturating_add(i32::try_from(shoulder_years).unwrap_or(i32::MAX))
        .min(NaiveDate::MAX.year());

    let mut rungs: BTreeMap<i32, AtomicRung> = BTreeMap::new();
    for year in start_year..=end_year {
        let Some(mut rung) = AtomicRung::for_year(year) else {
            continue;
        };
        rung.target_amount = targets.get(&rung.id).copied().and_then(normalize_target);
        rungs.insert(year, rung);
    }

    for bond in bonds {
        if let Some(rung) = rungs.get_mut(&bond.maturity_year()) {
            rung.current_amount += bond.face_value;
        }
    }

    rungs.into_values().collect()
}
