//! Rung domain model.
//!
//! # Responsibility
//! - Define the atomic per-year rung shared by store, engine and views.
//! - Define the synthetic multi-year block produced by zoomed-out views.
//!
//! # Invariants
//! - An unset target is `None`; zero or negative store values never become
//!   a financial target.
//! - `current_amount` is never negative.
//! - `Block` values are never persisted; they live for one render pass.

use crate::model::selection::{BlockSpan, Selection};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Returns the target used for completion and aggregation.
///
/// A missing or non-positive target falls back to `default_target`.
pub fn effective_target(target: Option<Decimal>, default_target: Decimal) -> Decimal {
    match target {
        Some(value) if value > Decimal::ZERO => value,
        _ => default_target,
    }
}

/// One calendar year's savings target and filled amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicRung {
    /// Year in decimal string form; foreign key for `Bond::rung_id`.
    pub id: String,
    pub year: i32,
    /// Inclusive first day of the rung.
    pub start_date: NaiveDate,
    /// Inclusive last day of the rung.
    pub end_date: NaiveDate,
    /// Explicit target, `None` when the default applies.
    pub target_amount: Option<Decimal>,
    /// Sum of face values of bonds maturing in this year.
    pub current_amount: Decimal,
}

impl AtomicRung {
    /// Creates a calendar-year rung (Jan 1 through Dec 31) without a target.
    ///
    /// Returns `None` when `year` is outside chrono's supported date range.
    pub fn for_year(year: i32) -> Option<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end_date = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self {
            id: year.to_string(),
            year,
            start_date,
            end_date,
            target_amount: None,
            current_amount: Decimal::ZERO,
        })
    }

    /// Sets the target from a raw store value, normalizing `<= 0` to unset.
    pub fn with_raw_target(mut self, raw: Decimal) -> Self {
        self.target_amount = normalize_target(raw);
        self
    }

    /// Returns this rung's target, falling back to `default_target`.
    pub fn effective_target(&self, default_target: Decimal) -> Decimal {
        effective_target(self.target_amount, default_target)
    }

    pub fn selection(&self) -> Selection {
        Selection::Atomic { year: self.year }
    }
}

/// Maps a raw store target to the explicit optional form.
pub fn normalize_target(raw: Decimal) -> Option<Decimal> {
    if raw > Decimal::ZERO {
        Some(raw)
    } else {
        None
    }
}

/// Synthetic aggregate of consecutive atomic rungs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub span: BlockSpan,
    /// First year covered by the block, congruent to the span's anchor.
    pub year: i32,
    /// Start of the earliest contained rung.
    pub start_date: NaiveDate,
    /// End of the latest contained rung.
    pub end_date: NaiveDate,
    /// Sum of effective per-year targets of contained rungs.
    pub target_amount: Decimal,
    /// Sum of contained rung current amounts.
    pub current_amount: Decimal,
    /// Number of atomic rungs that fell inside the block.
    pub rung_count: usize,
}

impl Block {
    pub fn selection(&self) -> Selection {
        Selection::Aggregate {
            span: self.span,
            start_year: self.year,
        }
    }

    /// Last year covered by the block range (inclusive), saturating at
    /// `i32::MAX`.
    pub fn end_year(&self) -> i32 {
        self.year.saturating_add(self.span.years() - 1)
    }
}

/// One row of a rendered ladder at any zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LadderRow {
    Atomic(AtomicRung),
    Block(Block),
}

impl LadderRow {
    /// Selection id for this row; string form via `Display`.
    pub fn selection(&self) -> Selection {
        match self {
            Self::Atomic(rung) => rung.selection(),
            Self::Block(block) => block.selection(),
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            Self::Atomic(rung) => rung.year,
            Self::Block(block) => block.year,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Atomic(rung) => rung.start_date,
            Self::Block(block) => block.start_date,
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        match self {
            Self::Atomic(rung) => rung.end_date,
            Self::Block(block) => block.end_date,
        }
    }

    pub fn current_amount(&self) -> Decimal {
        match self {
            Self::Atomic(rung) => rung.current_amount,
            Self::Block(block) => block.current_amount,
        }
    }

    /// Target shown for this row.
    ///
    /// Blocks already carry the sum of effective targets; atomic rungs fall
    /// back to `default_target` when unset.
    pub fn effective_target(&self, default_target: Decimal) -> Decimal {
        match self {
            Self::Atomic(rung) => rung.effective_target(default_target),
            Self::Block(block) => block.target_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{effective_target, AtomicRung};
    use rust_decimal::Decimal;

    #[test]
    fn effective_target_falls_back_for_unset_and_non_positive() {
        let default = Decimal::from(20_000);
        assert_eq!(effective_target(None, default), default);
        assert_eq!(effective_target(Some(Decimal::ZERO), default), default);
        assert_eq!(effective_target(Some(Decimal::from(-5)), default), default);
        assert_eq!(
            effective_target(Some(Decimal::from(9_000)), default),
            Decimal::from(9_000)
        );
    }

    #[test]
    fn for_year_spans_whole_calendar_year() {
        let rung = AtomicRung::for_year(2036).expect("2036 is a valid year");
        assert_eq!(rung.id, "2036");
        assert_eq!(rung.start_date.to_string(), "2036-01-01");
        assert_eq!(rung.end_date.to_string(), "2036-12-31");
        assert_eq!(rung.target_amount, None);
    }

    #[test]
    fn raw_zero_target_is_normalized_to_unset() {
        let rung = AtomicRung::for_year(2040)
            .expect("valid year")
            .with_raw_target(Decimal::ZERO);
        assert_eq!(rung.target_amount, None);
    }
}
