//! Bond holding model.
//!
//! # Responsibility
//! - Define bond holdings attached to atomic rungs.
//! - Validate bond-creation requests before they reach a store.
//!
//! # Invariants
//! - `Bond::rung_id` equals the id of the rung for the bond's maturity year.
//! - `maturity_date` is strictly after `issue_date`.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Coupon payment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
}

impl CouponFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Self::Annual => 1,
            Self::SemiAnnual => 2,
            Self::Quarterly => 4,
        }
    }

    pub fn months_between_payments(self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "ANNUAL",
            Self::SemiAnnual => "SEMI_ANNUAL",
            Self::Quarterly => "QUARTERLY",
        }
    }

    /// Case-insensitive inverse of [`CouponFrequency::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ANNUAL" => Some(Self::Annual),
            "SEMI_ANNUAL" => Some(Self::SemiAnnual),
            "QUARTERLY" => Some(Self::Quarterly),
            _ => None,
        }
    }
}

/// Holding contributing to exactly one atomic rung.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub id: String,
    pub ticker: Option<String>,
    pub issuer: String,
    pub currency: String,
    pub face_value: Decimal,
    /// Annual rate as a fraction (`0.04` is 4%).
    pub coupon_rate: Decimal,
    pub coupon_frequency: CouponFrequency,
    pub issue_date: NaiveDate,
    pub maturity_date: NaiveDate,
    /// Id of the atomic rung for the maturity year.
    pub rung_id: String,
}

impl Bond {
    /// Income per year at the stated coupon rate.
    pub fn yearly_income(&self) -> Decimal {
        self.face_value * self.coupon_rate
    }

    pub fn maturity_year(&self) -> i32 {
        self.maturity_date.year()
    }
}

/// Bond creation request accepted by a ladder store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBond {
    /// Caller-chosen id; synthesized from issuer and maturity when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    pub issuer: String,
    pub currency: String,
    pub face_value: Decimal,
    pub coupon_rate: Decimal,
    pub coupon_frequency: CouponFrequency,
    pub issue_date: NaiveDate,
    pub maturity_date: NaiveDate,
}

impl NewBond {
    /// Validates request invariants before persistence.
    pub fn validate(&self) -> Result<(), BondValidationError> {
        if self.issuer.trim().is_empty() {
            return Err(BondValidationError::EmptyIssuer);
        }
        if self.currency.trim().is_empty() {
            return Err(BondValidationError::EmptyCurrency);
        }
        if self.face_value <= Decimal::ZERO {
            return Err(BondValidationError::NonPositiveFaceValue(self.face_value));
        }
        if self.coupon_rate < Decimal::ZERO {
            return Err(BondValidationError::NegativeCouponRate(self.coupon_rate));
        }
        if self.maturity_date <= self.issue_date {
            return Err(BondValidationError::MaturityNotAfterIssue {
                issue: self.issue_date,
                maturity: self.maturity_date,
            });
        }
        if matches!(&self.id, Some(id) if id.trim().is_empty()) {
            return Err(BondValidationError::EmptyId);
        }
        Ok(())
    }

    /// Returns the caller id, or `bond-{maturity year}-{issuer slug}`.
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) => id.trim().to_string(),
            None => format!(
                "bond-{}-{}",
                self.maturity_date.year(),
                issuer_slug(&self.issuer)
            ),
        }
    }

    /// Rung id the bond will attach to.
    pub fn rung_id(&self) -> String {
        self.maturity_date.year().to_string()
    }

    /// Materializes the stored bond record.
    pub fn into_bond(self) -> Bond {
        let id = self.resolved_id();
        let rung_id = self.rung_id();
        Bond {
            id,
            ticker: self.ticker.filter(|ticker| !ticker.trim().is_empty()),
            issuer: self.issuer.trim().to_string(),
            currency: self.currency.trim().to_ascii_uppercase(),
            face_value: self.face_value,
            coupon_rate: self.coupon_rate,
            coupon_frequency: self.coupon_frequency,
            issue_date: self.issue_date,
            maturity_date: self.maturity_date,
            rung_id,
        }
    }
}

fn issuer_slug(issuer: &str) -> String {
    WHITESPACE_RE
        .replace_all(issuer.trim(), "-")
        .to_lowercase()
}

/// Bond request validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondValidationError {
    EmptyIssuer,
    EmptyCurrency,
    EmptyId,
    NonPositiveFaceValue(Decimal),
    NegativeCouponRate(Decimal),
    MaturityNotAfterIssue {
        issue: NaiveDate,
        maturity: NaiveDate,
    },
}

impl Display for BondValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIssuer => write!(f, "bond issuer cannot be empty"),
            Self::EmptyCurrency => write!(f, "bond currency cannot be empty"),
            Self::EmptyId => write!(f, "bond id cannot be blank when provided"),
            Self::NonPositiveFaceValue(value) => {
                write!(f, "face_value must be positive, got {value}")
            }
            Self::NegativeCouponRate(value) => {
                write!(f, "coupon_rate cannot be negative, got {value}")
            }
            Self::MaturityNotAfterIssue { issue, maturity } => write!(
                f,
                "maturity_date ({maturity}) must be after issue_date ({issue})"
            ),
        }
    }
}

impl Error for BondValidationError {}
