//! Measurement units and per-category unit selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

const KG_PER_LB: f64 = 0.453592;
const METERS_PER_INCH: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Measurement category a number-with-unit step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementCategory {
    Weight,
    Height,
}

impl MeasurementCategory {
    /// Units selectable for this category, default first.
    pub fn units(&self) -> &'static [Unit] {
        match self {
            Self::Weight => &[Unit::Kg, Unit::Lbs],
            Self::Height => &[Unit::Cm, Unit::In],
        }
    }
}

impl fmt::Display for MeasurementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight => write!(f, "weight"),
            Self::Height => write!(f, "height"),
        }
    }
}

/// Weight unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Converts a weight in this unit to kilograms.
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lbs => value * KG_PER_LB,
        }
    }
}

/// Linear unit used for height and, by extension, waist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    In,
}

impl LengthUnit {
    /// Converts a length in this unit to meters.
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            Self::Cm => value / 100.0,
            Self::In => value * METERS_PER_INCH,
        }
    }

    /// Converts a length in this unit to centimeters.
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::In => value * CM_PER_INCH,
        }
    }
}

/// Any unit a user can pick, regardless of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lbs,
    Cm,
    In,
}

impl Unit {
    pub fn category(&self) -> MeasurementCategory {
        match self {
            Self::Kg | Self::Lbs => MeasurementCategory::Weight,
            Self::Cm | Self::In => MeasurementCategory::Height,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
            Self::Cm => "cm",
            Self::In => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "lbs" | "lb" => Ok(Self::Lbs),
            "cm" => Ok(Self::Cm),
            "in" | "inch" | "inches" => Ok(Self::In),
            other => Err(ValidationError::invalid_format(
                "unit",
                format!("unknown unit '{}'", other),
            )),
        }
    }
}

impl From<WeightUnit> for Unit {
    fn from(unit: WeightUnit) -> Self {
        match unit {
            WeightUnit::Kg => Self::Kg,
            WeightUnit::Lbs => Self::Lbs,
        }
    }
}

impl From<LengthUnit> for Unit {
    fn from(unit: LengthUnit) -> Self {
        match unit {
            LengthUnit::Cm => Self::Cm,
            LengthUnit::In => Self::In,
        }
    }
}

/// The unit currently selected for every measurement category.
///
/// Every category always has an entry; defaults are kg and cm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSelection {
    pub weight: WeightUnit,
    pub height: LengthUnit,
}

impl UnitSelection {
    /// Selection with explicit units.
    pub fn new(weight: WeightUnit, height: LengthUnit) -> Self {
        Self { weight, height }
    }

    /// Selects `unit` for `category`.
    ///
    /// Fails when the unit does not measure that category (e.g. cm for weight).
    pub fn select(&mut self, category: MeasurementCategory, unit: Unit) -> Result<(), ValidationError> {
        match (category, unit) {
            (MeasurementCategory::Weight, Unit::Kg) => self.weight = WeightUnit::Kg,
            (MeasurementCategory::Weight, Unit::Lbs) => self.weight = WeightUnit::Lbs,
            (MeasurementCategory::Height, Unit::Cm) => self.height = LengthUnit::Cm,
            (MeasurementCategory::Height, Unit::In) => self.height = LengthUnit::In,
            (category, unit) => {
                return Err(ValidationError::invalid_format(
                    "unit",
                    format!("'{}' is not a {} unit", unit, category),
                ))
            }
        }
        Ok(())
    }

    /// Unit currently selected for `category`.
    pub fn unit_for(&self, category: MeasurementCategory) -> Unit {
        match category {
            MeasurementCategory::Weight => self.weight.into(),
            MeasurementCategory::Height => self.height.into(),
        }
    }
}
