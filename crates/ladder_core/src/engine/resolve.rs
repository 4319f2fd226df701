//! Selection resolution against the atomic layer.
//!
//! # Responsibility
//! - Rebuild the detail view of an atomic rung or a block from the full rung
//!   and bond collections.
//!
//! # Invariants
//! - Aggregate totals are always sums over the whole block range, never the
//!   representative rung's own values.
//! - A range without atomic rungs resolves to `None`, not a zeroed record.
//! - Aggregate bonds are concatenated in ascending rung-year order.

use crate::engine::completion::CompletionView;
use crate::model::bond::Bond;
use crate::model::rung::AtomicRung;
use crate::model::selection::Selection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Detail view of an opened rung or block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSelection {
    pub selection: Selection,
    /// Rung used for labels: the rung at the start year, else the earliest
    /// rung in range.
    pub representative: AtomicRung,
    /// Ids of the atomic rungs covered, ascending by year.
    pub rung_ids: Vec<String>,
    /// Sum of effective targets over the range.
    pub target_amount: Decimal,
    /// Sum of current amounts over the range.
    pub current_amount: Decimal,
    pub bonds: Vec<Bond>,
}

impl ResolvedSelection {
    pub fn span_years(&self) -> i32 {
        self.selection.span_years()
    }

    /// Heading label: `2036` for atomic rungs, `2034-2036` for blocks.
    pub fn label(&self) -> String {
        let years = self.selection.years();
        if self.selection.is_aggregate() {
            format!("{}-{}", years.start(), years.end())
        } else {
            years.start().to_string()
        }
    }

    pub fn bond_face_total(&self) -> Decimal {
        self.bonds.iter().map(|bond| bond.face_value).sum()
    }

    pub fn yearly_income(&self) -> Decimal {
        self.bonds.iter().map(Bond::yearly_income).sum()
    }

    /// Completion of the aggregate target.
    ///
    /// `target_amount` already includes defaults, so no fallback applies.
    pub fn completion(&self) -> CompletionView {
        CompletionView::new(self.current_amount, Some(self.target_amount), Decimal::ZERO)
    }
}

/// Resolves `selection` to its detail view.
///
/// Returns `None` when no atomic rung exists in the selected range.
pub fn resolve_selection(
    selection: Selection,
    rungs: &[AtomicRung],
    bonds: &[Bond],
    default_target: Decimal,
) -> Option<ResolvedSelection> {
    let years = selection.years();
    let mut in_range: Vec<&AtomicRung> = rungs
        .iter()
        .filter(|rung| years.contains(&rung.year))
        .collect();
    if in_range.is_empty() {
        return None;
    }
    in_range.sort_by_key(|rung| rung.year);

    let representative = in_range
        .iter()
        .find(|rung| rung.year == selection.start_year())
        .or_else(|| in_range.first())
        .copied()?
        .clone();

    let by_rung = bonds_by_rung(bonds);
    let resolved_bonds = in_range
        .iter()
        .flat_map(|rung| {
            by_rung
                .get(rung.id.as_str())
                .map(|list| list.as_slice())
                .unwrap_or_default()
        })
        .map(|bond| (*bond).clone())
        .collect();

    Some(ResolvedSelection {
        selection,
        representative,
        rung_ids: in_range.iter().map(|rung| rung.id.clone()).collect(),
        target_amount: in_range
            .iter()
            .map(|rung| rung.effective_target(default_target))
            .sum(),
        current_amount: in_range.iter().map(|rung| rung.current_amount).sum(),
        bonds: resolved_bonds,
    })
}

/// Groups bonds by `rung_id`, preserving input order within each rung.
pub fn bonds_by_rung(bonds: &[Bond]) -> HashMap<&str, Vec<&Bond>> {
    let mut map: HashMap<&str, Vec<&Bond>> = HashMap::new();
    for bond in bonds {
        map.entry(bond.rung_id.as_str()).or_default().push(bond);
    }
    map
}
