//! Classification module - pure clinical classification of measurements.
//!
//! Normalizes raw measurements to metric units and bands them into
//! clinical categories. Every function here is deterministic and free of
//! side effects; results are recomputed on demand and never stored in
//! interview state.
//!
//! - `bmi` - body-mass index and its class, with ethnicity-adjusted thresholds
//! - `waist` - waist-to-height ratio and its class
//! - `units` - measurement units and the per-category unit selection

mod bmi;
mod units;
mod waist;

pub use bmi::{classify_bmi, compute_bmi, BmiClass, ThresholdGroup, LOWER_THRESHOLD_ETHNICITIES};
pub use units::{LengthUnit, MeasurementCategory, Unit, UnitSelection, WeightUnit};
pub use waist::{classify_whtr, compute_whtr, WhtrClass};

use serde::{Deserialize, Serialize};

/// Raw inputs to classification, already converted to numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationInput {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub waist: Option<f64>,
    pub ethnicity: Option<String>,
    pub units: UnitSelection,
}

/// Derived measurements and their classes.
///
/// `None` means the value could not be classified because a measurement
/// was missing or not positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub bmi: Option<f64>,
    pub bmi_class: Option<BmiClass>,
    pub whtr: Option<f64>,
    pub whtr_class: Option<WhtrClass>,
    pub threshold_group: ThresholdGroup,
}

impl ClassificationResult {
    /// Classifies the given measurements.
    pub fn classify(input: &ClassificationInput) -> Self {
        let units = input.units;
        let threshold_group = ThresholdGroup::from_ethnicity(input.ethnicity.as_deref());

        let bmi = compute_bmi(input.weight, units.weight, input.height, units.height);
        let whtr = compute_whtr(input.waist, input.height, units.height);

        Self {
            bmi,
            bmi_class: bmi.map(|value| classify_bmi(value, threshold_group)),
            whtr,
            whtr_class: whtr.map(classify_whtr),
            threshold_group,
        }
    }
}

/// False for zero, negatives and NaN.
pub(crate) fn is_positive(value: f64) -> bool {
    value > 0.0
}

/// Rounds half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(weight: Option<f64>, height: Option<f64>, waist: Option<f64>) -> ClassificationInput {
        ClassificationInput {
            weight,
            height,
            waist,
            ethnicity: None,
            units: UnitSelection::default(),
        }
    }

    #[test]
    fn classifies_complete_measurements() {
        let result = ClassificationResult::classify(&input(Some(70.0), Some(175.0), Some(80.0)));

        assert_eq!(result.bmi, Some(22.9));
        assert_eq!(result.bmi_class, Some(BmiClass::HealthyWeight));
        assert_eq!(result.whtr, Some(0.46));
        assert_eq!(result.whtr_class, Some(WhtrClass::Healthy));
    }

    #[test]
    fn whtr_is_independent_of_missing_weight() {
        let result = ClassificationResult::classify(&input(None, Some(160.0), Some(80.0)));

        assert_eq!(result.bmi, None);
        assert_eq!(result.bmi_class, None);
        assert_eq!(result.whtr_class, Some(WhtrClass::IncreasedRisk));
    }

    #[test]
    fn ethnicity_drives_threshold_group() {
        let mut data = input(Some(75.0), Some(170.0), None);
        data.ethnicity = Some("Black (e.g., African, Caribbean)".to_string());

        let result = ClassificationResult::classify(&data);

        assert_eq!(result.bmi, Some(26.0));
        assert_eq!(result.threshold_group, ThresholdGroup::Lower);
        assert_eq!(result.bmi_class, Some(BmiClass::Overweight));
    }

    #[test]
    fn imperial_selection_is_applied() {
        let mut data = input(Some(154.0), Some(69.0), Some(34.5));
        data.units = UnitSelection::new(WeightUnit::Lbs, LengthUnit::In);

        let result = ClassificationResult::classify(&data);

        assert_eq!(result.bmi, Some(22.7));
        assert_eq!(result.whtr, Some(0.5));
    }

    #[test]
    fn classify_is_idempotent() {
        let data = input(Some(98.0), Some(181.0), Some(102.0));
        assert_eq!(
            ClassificationResult::classify(&data),
            ClassificationResult::classify(&data)
        );
    }

    #[test]
    fn round_to_half_away_from_zero() {
        assert_eq!(round_to(22.857, 1), 22.9);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(0.4638, 2), 0.46);
    }
}
