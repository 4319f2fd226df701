//! Zoom levels and selection identity.
//!
//! # Responsibility
//! - Model the atomic/aggregate duality as a tagged variant.
//! - Encode and decode the boundary string form (`"2036"`, `"3Y-2034"`).
//!
//! # Invariants
//! - `decode(encode(selection)) == selection` for every selection.
//! - A recognized aggregate prefix with a malformed suffix is an error, never
//!   silently treated as atomic.
//! - Decoded selections cover only years representable as calendar dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

const THREE_YEAR_PREFIX: &str = "3Y-";
const FIVE_YEAR_PREFIX: &str = "5Y-";

/// Width of a synthetic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSpan {
    Three,
    Five,
}

impl BlockSpan {
    pub fn years(self) -> i32 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Three => THREE_YEAR_PREFIX,
            Self::Five => FIVE_YEAR_PREFIX,
        }
    }
}

/// Ladder zoom level in years per rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomStep {
    One,
    Three,
    Five,
}

impl ZoomStep {
    pub fn years(self) -> i32 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Five => 5,
        }
    }

    /// Returns the block span for aggregated zoom levels, `None` for `One`.
    pub fn block_span(self) -> Option<BlockSpan> {
        match self {
            Self::One => None,
            Self::Three => Some(BlockSpan::Three),
            Self::Five => Some(BlockSpan::Five),
        }
    }

    /// One step toward finer rows (5 -> 3 -> 1), saturating at `One`.
    pub fn zoom_in(self) -> Self {
        match self {
            Self::Five => Self::Three,
            Self::Three | Self::One => Self::One,
        }
    }

    /// One step toward coarser rows (1 -> 3 -> 5), saturating at `Five`.
    pub fn zoom_out(self) -> Self {
        match self {
            Self::One => Self::Three,
            Self::Three | Self::Five => Self::Five,
        }
    }

    pub fn from_years(years: i32) -> Option<Self> {
        match years {
            1 => Some(Self::One),
            3 => Some(Self::Three),
            5 => Some(Self::Five),
            _ => None,
        }
    }
}

/// Identity of a rendered rung a user can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selection {
    /// One atomic rung, named by its year.
    Atomic { year: i32 },
    /// A block of `span` years starting at `start_year`.
    Aggregate { span: BlockSpan, start_year: i32 },
}

impl Selection {
    /// Number of atomic years covered.
    pub fn span_years(&self) -> i32 {
        match self {
            Self::Atomic { .. } => 1,
            Self::Aggregate { span, .. } => span.years(),
        }
    }

    pub fn start_year(&self) -> i32 {
        match self {
            Self::Atomic { year } => *year,
            Self::Aggregate { start_year, .. } => *start_year,
        }
    }

    /// Last covered year, `None` when it does not fit in `i32`.
    pub fn end_year(&self) -> Option<i32> {
        self.start_year().checked_add(self.span_years() - 1)
    }

    /// Inclusive atomic year range named by this selection.
    ///
    /// Saturates at `i32::MAX`; decoded selections never reach it.
    pub fn years(&self) -> RangeInclusive<i32> {
        let start = self.start_year();
        start..=self.end_year().unwrap_or(i32::MAX)
    }

    /// Whether every covered year is a representable calendar year.
    pub fn is_in_calendar_range(&self) -> bool {
        let Some(end) = self.end_year() else {
            return false;
        };
        NaiveDate::MIN.year() <= self.start_year() && end <= NaiveDate::MAX.year()
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate { .. })
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atomic { year } => write!(f, "{year}"),
            Self::Aggregate { span, start_year } => write!(f, "{}{start_year}", span.prefix()),
        }
    }
}

/// Decode failure for a selection id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionParseError {
    /// Input is empty or whitespace.
    Empty,
    /// `3Y-`/`5Y-` prefix followed by a non-numeric start year.
    MalformedAggregate(String),
    /// No aggregate prefix and the id is not a year.
    MalformedAtomic(String),
    /// Well-formed id covering years outside the calendar range.
    YearOutOfRange(String),
}

impl Display for SelectionParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "selection id cannot be empty"),
            Self::MalformedAggregate(id) => {
                write!(f, "malformed aggregate selection id `{id}`: start year is not numeric")
            }
            Self::MalformedAtomic(id) => {
                write!(f, "malformed rung selection id `{id}`: expected a year")
            }
            Self::YearOutOfRange(id) => {
                write!(f, "selection id `{id}` is outside the supported year range")
            }
        }
    }
}

impl Error for SelectionParseError {}

impl FromStr for Selection {
    type Err = SelectionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(SelectionParseError::Empty);
        }

        let mut selection = None;
        for span in [BlockSpan::Three, BlockSpan::Five] {
            if let Some(suffix) = value.strip_prefix(span.prefix()) {
                let start_year = parse_year(suffix)
                    .ok_or_else(|| SelectionParseError::MalformedAggregate(value.to_string()))?;
                selection = Some(Self::Aggregate { span, start_year });
                break;
            }
        }

        let selection = match selection {
            Some(selection) => selection,
            None => {
                let year = parse_year(value)
                    .ok_or_else(|| SelectionParseError::MalformedAtomic(value.to_string()))?;
                Self::Atomic { year }
            }
        };

        if !selection.is_in_calendar_range() {
            return Err(SelectionParseError::YearOutOfRange(value.to_string()));
        }
        Ok(selection)
    }
}

impl TryFrom<String> for Selection {
    type Error = SelectionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.to_string()
    }
}

// Digits only: `i32::from_str` alone would accept a leading `+`.
fn parse_year(value: &str) -> Option<i32> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
