//! Target fan-out from an edited selection to atomic rung writes.
//!
//! # Responsibility
//! - Validate an edited target before any write is planned.
//! - Split a block target evenly over every atomic year of the block.
//!
//! # Invariants
//! - Amounts are whole cents; every share but the first is the block target
//!   divided by the span, truncated to cents.
//! - The first year absorbs the residual cents, so the planned writes always
//!   sum to the (cent-rounded) input exactly.
//! - Invalid input yields an error and no writes; a plan is never empty.

use crate::model::selection::Selection;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CENT_DECIMALS: u32 = 2;

/// One target update for an atomic rung.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWrite {
    pub rung_id: String,
    pub year: i32,
    pub target_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FanOutError {
    /// NaN or infinite boundary input.
    NonFinite(f64),
    /// Finite input outside the representable decimal range.
    OutOfRange(f64),
    Negative(Decimal),
    /// Selection covering years outside the calendar range.
    YearOutOfRange(Selection),
}

impl Display for FanOutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(value) => write!(f, "target amount must be finite, got {value}"),
            Self::OutOfRange(value) => write!(f, "target amount {value} is out of range"),
            Self::Negative(value) => write!(f, "target amount cannot be negative, got {value}"),
            Self::YearOutOfRange(selection) => {
                write!(f, "selection {selection} is outside the supported year range")
            }
        }
    }
}

impl Error for FanOutError {}

/// Converts an edited form value into a cent-rounded target.
pub fn target_from_input(amount: f64) -> Result<Decimal, FanOutError> {
    if !amount.is_finite() {
        return Err(FanOutError::NonFinite(amount));
    }
    let value = Decimal::from_f64(amount).ok_or(FanOutError::OutOfRange(amount))?;
    if value < Decimal::ZERO {
        return Err(FanOutError::Negative(value));
    }
    Ok(to_cents(value))
}

/// Plans the atomic writes for an edited selection target.
///
/// Atomic selections produce one write. Aggregates produce one write per
/// year of the block, whether or not the store currently has a rung there.
pub fn plan_target_writes(
    selection: Selection,
    target_amount: Decimal,
) -> Result<Vec<TargetWrite>, FanOutError> {
    if !selection.is_in_calendar_range() {
        return Err(FanOutError::YearOutOfRange(selection));
    }
    if target_amount < Decimal::ZERO {
        return Err(FanOutError::Negative(target_amount));
    }
    let total = to_cents(target_amount);

    match selection {
        Selection::Atomic { year } => Ok(vec![TargetWrite {
            rung_id: year.to_string(),
            year,
            target_amount: total,
        }]),
        Selection::Aggregate { span, .. } => {
            let shares = split_evenly(total, span.years());
            Ok(selection
                .years()
                .zip(shares)
                .map(|(year, share)| TargetWrite {
                    rung_id: year.to_string(),
                    year,
                    target_amount: share,
                })
                .collect())
        }
    }
}

/// Splits `total` into `parts` cent amounts; the first part takes the residual.
pub fn split_evenly(total: Decimal, parts: i32) -> Vec<Decimal> {
    if parts <= 0 {
        return Vec::new();
    }
    let divisor = Decimal::from(parts);
    let share = (total / divisor).round_dp_with_strategy(CENT_DECIMALS, RoundingStrategy::ToZero);
    let residual = total - share * divisor;

    let mut shares = vec![share; parts as usize];
    if let Some(first) = shares.first_mut() {
        *first += residual;
    }
    shares
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
