//! Completion fraction and visual intensity mapping.
//!
//! # Invariants
//! - The fraction is always within `[0, 1]`.
//! - The color ramp is red -> magenta over `[0, 0.5]` and magenta -> blue
//!   over `(0.5, 1]`, continuous at `0.5`.

use crate::model::rung::effective_target;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const LOW_BAND_UPPER: f64 = 0.33;
const MID_BAND_UPPER: f64 = 0.66;

/// Fraction of the effective target that is filled, clamped to `[0, 1]`.
pub fn completion_fraction(
    current_amount: Decimal,
    target_amount: Option<Decimal>,
    default_target: Decimal,
) -> f64 {
    let target = effective_target(target_amount, default_target);
    if target <= Decimal::ZERO {
        return 0.0;
    }
    let ratio = current_amount
        .checked_div(target)
        .and_then(|value| value.to_f64())
        .unwrap_or(0.0);
    clamp_unit(ratio)
}

/// Display percentage rounded to the nearest integer.
pub fn completion_percent(fraction: f64) -> u8 {
    (clamp_unit(fraction) * 100.0).round() as u8
}

/// Percentage snapped to the nearest multiple of ten.
pub fn fill_bucket(fraction: f64) -> u8 {
    let percent = clamp_unit(fraction) * 100.0;
    ((percent / 10.0).round() * 10.0).clamp(0.0, 100.0) as u8
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    pub const MAGENTA: Self = Self {
        r: 255,
        g: 0,
        b: 255,
    };
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };

    /// CSS functional notation, e.g. `rgb(255, 0, 255)`.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Maps a completion fraction onto the red -> magenta -> blue ramp.
pub fn completion_color(fraction: f64) -> Rgb {
    let t = clamp_unit(fraction);
    if t <= 0.5 {
        let local = t / 0.5;
        Rgb {
            r: 255,
            g: 0,
            b: channel(255.0 * local),
        }
    } else {
        let local = (t - 0.5) / 0.5;
        Rgb {
            r: channel(255.0 * (1.0 - local)),
            g: 0,
            b: 255,
        }
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Coarse completion category used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionBand {
    Low,
    Mid,
    High,
}

impl CompletionBand {
    pub fn from_fraction(fraction: f64) -> Self {
        let t = clamp_unit(fraction);
        if t < LOW_BAND_UPPER {
            Self::Low
        } else if t < MID_BAND_UPPER {
            Self::Mid
        } else {
            Self::High
        }
    }
}

/// Everything a rung row needs to render its fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionView {
    pub fraction: f64,
    pub percent: u8,
    pub fill_bucket: u8,
    pub color: Rgb,
    pub band: CompletionBand,
}

impl CompletionView {
    pub fn new(current_amount: Decimal, target_amount: Option<Decimal>, default_target: Decimal) -> Self {
        Self::from_fraction(completion_fraction(
            current_amount,
            target_amount,
            default_target,
        ))
    }

    pub fn from_fraction(fraction: f64) -> Self {
        let fraction = clamp_unit(fraction);
        Self {
            fraction,
            percent: completion_percent(fraction),
            fill_bucket: fill_bucket(fraction),
            color: completion_color(fraction),
            band: CompletionBand::from_fraction(fraction),
        }
    }
}
