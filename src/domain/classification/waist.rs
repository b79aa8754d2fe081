//! Waist-to-height ratio calculation and banding.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{is_positive, round_to};
use super::units::LengthUnit;

/// Clinical waist-to-height ratio class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WhtrClass {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Increased health risks")]
    IncreasedRisk,
    #[serde(rename = "High health risks")]
    HighRisk,
}

impl WhtrClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::IncreasedRisk => "Increased health risks",
            Self::HighRisk => "High health risks",
        }
    }
}

impl fmt::Display for WhtrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Computes the waist-to-height ratio rounded to two decimals.
///
/// The waist value is read in the *height* unit: the waist step has no
/// unit of its own and shares the height selection. A waist or height
/// that is not positive counts as missing.
pub fn compute_whtr(waist: Option<f64>, height: Option<f64>, height_unit: LengthUnit) -> Option<f64> {
    let waist_cm = height_unit.to_cm(waist?);
    let height_cm = height_unit.to_cm(height?);
    if !is_positive(waist_cm) || !is_positive(height_cm) {
        return None;
    }
    Some(round_to(waist_cm / height_cm, 2))
}

/// Bands a waist-to-height ratio: below 0.5 healthy, below 0.6 increased
/// risk, otherwise high risk.
pub fn classify_whtr(ratio: f64) -> WhtrClass {
    if ratio < 0.5 {
        WhtrClass::Healthy
    } else if ratio < 0.6 {
        WhtrClass::IncreasedRisk
    } else {
        WhtrClass::HighRisk
    }
}
