//! # BMI Calculator
//!
//! `BMI = weight (kg) / height (m)²`, classified on the WHO adult scale.
//! Imperial input (pounds, feet + inches) is converted to metric first.

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;
use crate::units::{Centimeters, Feet, Inches, Kilograms, Meters, Pounds, UnitSystem};

/// Upper bound of the WHO "normal" range used for BMI Prime
pub const BMI_PRIME_REFERENCE: f64 = 25.0;

/// WHO adult weight status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn of(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

pub fn bmi(weight: Kilograms, height: Meters) -> CalcResult<f64> {
    if height.0 <= 0.0 {
        return Err(CalcError::division_by_zero("height"));
    }
    Ok(weight.0 / (height.0 * height.0))
}

/// Weight range that keeps BMI within 18.5 to 24.9 at this height.
pub fn healthy_range(height: Meters) -> (Kilograms, Kilograms) {
    let h2 = height.0 * height.0;
    (Kilograms(18.5 * h2), Kilograms(24.9 * h2))
}

fn read_body(inputs: &InputSnapshot, system: UnitSystem) -> CalcResult<(Kilograms, Meters)> {
    match system {
        UnitSystem::Metric => {
            let weight = Kilograms(inputs.positive("weightKg")?);
            let height: Meters = Centimeters(inputs.positive("heightCm")?).into();
            Ok((weight, height))
        }
        UnitSystem::Imperial => {
            let weight: Kilograms = Pounds(inputs.positive("weightLb")?).into();
            let feet: Meters = Feet(inputs.non_negative("heightFt")?).into();
            let inches: Centimeters = Inches(inputs.non_negative("heightIn")?).into();
            let height = feet + inches.into();
            Ok((weight, height))
        }
    }
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let system: UnitSystem = inputs.choice("unitSystem")?;
    let (weight, height) = read_body(inputs, system)?;

    let value = bmi(weight, height)?;
    let category = BmiCategory::of(value);
    let label = ctx.t.option("category", category.key());
    let (low, high) = healthy_range(height);

    let results = ctx
        .results()
        .fixed("bmi", value, 1)
        .text("category", category.key(), label.clone())
        .fixed("bmiPrime", value / BMI_PRIME_REFERENCE, 2);
    let results = match system {
        UnitSystem::Metric => results
            .with_unit("healthyWeightMin", low.0, 1, "kg")
            .with_unit("healthyWeightMax", high.0, 1, "kg"),
        UnitSystem::Imperial => results
            .with_unit("healthyWeightMin", Pounds::from(low).0, 1, "lb")
            .with_unit("healthyWeightMax", Pounds::from(high).0, 1, "lb"),
    };

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("bmi", results.shown("bmi")),
            ("category", &label.to_lowercase()),
            ("min", results.shown("healthyWeightMin")),
            ("max", results.shown("healthyWeightMax")),
        ],
    );
    Ok(results.summary(summary).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run, run_in};
    use crate::locale::Locale;

    fn metric(kg: f64, cm: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("unitSystem", "metric")
            .with("weightKg", kg)
            .with("heightCm", cm)
    }

    #[test]
    fn test_metric_bmi() {
        let results = run("bmi", metric(70.0, 175.0));
        assert!(results.is_valid);
        assert!((results.number("bmi").unwrap() - 22.857).abs() < 1e-3);
        assert_eq!(results.formatted("bmi"), Some("22.9"));
        assert_eq!(results.values["category"].as_text(), Some("normal"));
    }

    #[test]
    fn test_imperial_matches_metric() {
        let inputs = InputSnapshot::new()
            .with("unitSystem", "imperial")
            .with("weightLb", 154.324)
            .with("heightFt", 5.0)
            .with("heightIn", 9.0);
        let imperial = run("bmi", inputs);
        let metric = run("bmi", metric(70.0, 175.26));
        assert!((imperial.number("bmi").unwrap() - metric.number("bmi").unwrap()).abs() < 1e-3);
        assert!(imperial.formatted("healthyWeightMin").unwrap().ends_with(" lb"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(BmiCategory::of(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::of(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::of(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::of(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_healthy_range() {
        let (low, high) = healthy_range(Meters(2.0));
        assert!(approx(low.0, 74.0));
        assert!(approx(high.0, 99.6));
    }

    #[test]
    fn test_zero_height_is_invalid() {
        assert!(!run("bmi", metric(70.0, 0.0)).is_valid);
        assert!(bmi(Kilograms(70.0), Meters(0.0)).is_err());
    }

    #[test]
    fn test_german_decimal_comma() {
        let results = run_in("bmi", metric(70.0, 175.0), Locale::De);
        assert_eq!(results.formatted("bmi"), Some("22,9"));
    }
}
