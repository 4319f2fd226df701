//! Engine and store configuration.
//!
//! # Responsibility
//! - Hold the business constants that pin block boundaries and defaults.
//! - Load overrides from JSON with every field defaulted.
//!
//! # Invariants
//! - `default_rung_target` is strictly positive after validation.
//! - Anchors never change between aggregation calls of one process.
//! - Validated horizons, shoulders and years stay within chrono's date range.

use crate::model::selection::BlockSpan;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_RUNG_TARGET: i64 = 20_000;
pub const DEFAULT_THREE_YEAR_ANCHOR: i32 = 2034;
pub const DEFAULT_FIVE_YEAR_ANCHOR: i32 = 2035;
pub const DEFAULT_FLOOR_YEAR: i32 = 2034;
pub const DEFAULT_SHOULDER_YEARS: u32 = 4;
pub const DEFAULT_INCOME_CURRENCY: &str = "USD";
pub const DEFAULT_INCOME_HORIZON_DAYS: u32 = 365 * 30;
pub const MAX_SHOULDER_YEARS: u32 = 50;
pub const MAX_INCOME_HORIZON_DAYS: u32 = 36_525;

/// Reference years block start years are congruent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAnchors {
    pub three: i32,
    pub five: i32,
}

impl Default for BlockAnchors {
    fn default() -> Self {
        Self {
            three: DEFAULT_THREE_YEAR_ANCHOR,
            five: DEFAULT_FIVE_YEAR_ANCHOR,
        }
    }
}

impl BlockAnchors {
    pub fn for_span(&self, span: BlockSpan) -> i32 {
        match span {
            BlockSpan::Three => self.three,
            BlockSpan::Five => self.five,
        }
    }
}

/// Ladder-wide settings shared by service, engine and store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Target used for any rung without an explicit positive target.
    pub default_rung_target: Decimal,
    pub anchors: BlockAnchors,
    /// Earliest year the derived ladder always includes.
    pub floor_year: i32,
    /// Extra empty rungs after the last maturity year.
    pub shoulder_years: u32,
    /// Only cashflows in this currency feed the income report.
    pub income_currency: String,
    /// Default income window length when no end date is given.
    pub income_horizon_days: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            default_rung_target: Decimal::from(DEFAULT_RUNG_TARGET),
            anchors: BlockAnchors::default(),
            floor_year: DEFAULT_FLOOR_YEAR,
            shoulder_years: DEFAULT_SHOULDER_YEARS,
            income_currency: DEFAULT_INCOME_CURRENCY.to_string(),
            income_horizon_days: DEFAULT_INCOME_HORIZON_DAYS,
        }
    }
}

impl LadderConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_rung_target <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveDefaultTarget(
                self.default_rung_target,
            ));
        }
        if self.income_currency.trim().is_empty() {
            return Err(ConfigError::EmptyIncomeCurrency);
        }
        if self.income_horizon_days == 0 {
            return Err(ConfigError::ZeroIncomeHorizon);
        }
        if self.income_horizon_days > MAX_INCOME_HORIZON_DAYS {
            return Err(ConfigError::IncomeHorizonTooLong(self.income_horizon_days));
        }
        if self.shoulder_years > MAX_SHOULDER_YEARS {
            return Err(ConfigError::ShoulderTooWide(self.shoulder_years));
        }
        for (field, year) in [
            ("floor_year", self.floor_year),
            ("anchors.three", self.anchors.three),
            ("anchors.five", self.anchors.five),
        ] {
            if !(NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year) {
                return Err(ConfigError::YearOutOfRange { field, year });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    NonPositiveDefaultTarget(Decimal),
    EmptyIncomeCurrency,
    ZeroIncomeHorizon,
    IncomeHorizonTooLong(u32),
    ShoulderTooWide(u32),
    YearOutOfRange { field: &'static str, year: i32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid ladder config: {err}"),
            Self::NonPositiveDefaultTarget(value) => {
                write!(f, "default_rung_target must be positive, got {value}")
            }
            Self::EmptyIncomeCurrency => write!(f, "income_currency cannot be empty"),
            Self::ZeroIncomeHorizon => write!(f, "income_horizon_days must be at least 1"),
            Self::IncomeHorizonTooLong(days) => write!(
                f,
                "income_horizon_days must be at most {MAX_INCOME_HORIZON_DAYS}, got {days}"
            ),
            Self::ShoulderTooWide(years) => write!(
                f,
                "shoulder_years must be at most {MAX_SHOULDER_YEARS}, got {years}"
            ),
            Self::YearOutOfRange { field, year } => {
                write!(f, "{field} {year} is outside the supported calendar range")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
