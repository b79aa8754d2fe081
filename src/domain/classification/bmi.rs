//! Body-mass index calculation and banding.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{is_positive, round_to};
use super::units::{LengthUnit, WeightUnit};

/// Ethnic groups for which lower BMI thresholds are clinically indicated.
pub const LOWER_THRESHOLD_ETHNICITIES: [&str; 3] = [
    "Asian (e.g., South Asian, Chinese)",
    "Black (e.g., African, Caribbean)",
    "Middle Eastern",
];

const UNDERWEIGHT_UPPER: f64 = 18.5;

/// Which set of BMI thresholds applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdGroup {
    #[default]
    Standard,
    Lower,
}

impl ThresholdGroup {
    /// Maps a recorded ethnicity answer to its threshold group.
    ///
    /// Missing or unrecognised answers use the standard thresholds.
    pub fn from_ethnicity(ethnicity: Option<&str>) -> Self {
        match ethnicity {
            Some(value) if LOWER_THRESHOLD_ETHNICITIES.iter().any(|g| value.contains(g)) => {
                Self::Lower
            }
            _ => Self::Standard,
        }
    }

    /// Lower bounds of the overweight and obesity I/II/III bands.
    fn thresholds(&self) -> [f64; 4] {
        match self {
            Self::Standard => [25.0, 30.0, 35.0, 40.0],
            Self::Lower => [23.0, 27.5, 32.5, 37.5],
        }
    }
}

/// Clinical BMI class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BmiClass {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Healthy weight")]
    HealthyWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obesity Class I")]
    ObesityClassI,
    #[serde(rename = "Obesity Class II")]
    ObesityClassII,
    #[serde(rename = "Obesity Class III")]
    ObesityClassIII,
}

impl BmiClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::HealthyWeight => "Healthy weight",
            Self::Overweight => "Overweight",
            Self::ObesityClassI => "Obesity Class I",
            Self::ObesityClassII => "Obesity Class II",
            Self::ObesityClassIII => "Obesity Class III",
        }
    }
}

impl fmt::Display for BmiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Computes BMI rounded to one decimal place.
///
/// Returns `None` when either measurement is missing or not positive
/// once normalized.
pub fn compute_bmi(
    weight: Option<f64>,
    weight_unit: WeightUnit,
    height: Option<f64>,
    height_unit: LengthUnit,
) -> Option<f64> {
    let weight_kg = weight_unit.to_kg(weight?);
    let height_m = height_unit.to_meters(height?);
    if !is_positive(weight_kg) || !is_positive(height_m) {
        return None;
    }
    Some(round_to(weight_kg / (height_m * height_m), 1))
}

/// Bands a BMI value.
///
/// Bands are left-closed and right-open, so a value exactly on a
/// threshold belongs to the higher band. Below 18.5 is underweight for
/// every group.
pub fn classify_bmi(bmi: f64, group: ThresholdGroup) -> BmiClass {
    let [overweight, obesity_1, obesity_2, obesity_3] = group.thresholds();
    let bands = [
        (UNDERWEIGHT_UPPER, BmiClass::HealthyWeight),
        (overweight, BmiClass::Overweight),
        (obesity_1, BmiClass::ObesityClassI),
        (obesity_2, BmiClass::ObesityClassII),
        (obesity_3, BmiClass::ObesityClassIII),
    ];

    bands
        .iter()
        .take_while(|(lower, _)| bmi >= *lower)
        .last()
        .map(|(_, class)| *class)
        .unwrap_or(BmiClass::Underweight)
}
