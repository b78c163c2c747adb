//! # TDEE Calculator
//!
//! Basal metabolic rate by the Mifflin-St Jeor equation,
//!
//! ```text
//! BMR = 10·kg + 6.25·cm − 5·age + s      s = +5 (male), −161 (female)
//! ```
//!
//! multiplied by an activity factor to get total daily energy expenditure.

use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;
use crate::units::{Centimeters, Kilograms};

/// Daily kcal offset for a ~0.5 kg/week change
pub const WEEKLY_HALF_KG_KCAL: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(CalcError::invalid_input("sex", other, "Unknown sex")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "veryActive" => Ok(ActivityLevel::VeryActive),
            other => Err(CalcError::invalid_input("activity", other, "Unknown activity level")),
        }
    }
}

/// Mifflin-St Jeor BMR in kcal/day.
pub fn mifflin_st_jeor(sex: Sex, weight: Kilograms, height: Centimeters, age: f64) -> f64 {
    let offset = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * weight.0 + 6.25 * height.0 - 5.0 * age + offset
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let sex: Sex = inputs.choice("sex")?;
    let activity: ActivityLevel = inputs.choice("activity")?;
    let age = inputs.positive("age")?;
    let weight = Kilograms(inputs.positive("weightKg")?);
    let height = Centimeters(inputs.positive("heightCm")?);

    let bmr = mifflin_st_jeor(sex, weight, height, age);
    if bmr <= 0.0 {
        return Err(CalcError::invalid_input("weightKg", weight.0.to_string(), "Measurements give no positive BMR"));
    }
    let tdee = bmr * activity.factor();

    let results = ctx
        .results()
        .with_unit("tdee", tdee.round(), 0, "kcal")
        .with_unit("bmr", bmr.round(), 0, "kcal")
        .with_unit("weightLoss", (tdee - WEEKLY_HALF_KG_KCAL).max(bmr).round(), 0, "kcal")
        .with_unit("weightGain", (tdee + WEEKLY_HALF_KG_KCAL).round(), 0, "kcal");

    let summary = ctx.t.format(
        "summary.default",
        &[("tdee", results.shown("tdee")), ("bmr", results.shown("bmr"))],
    );
    Ok(results.summary(summary).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run};

    fn person(sex: &str, age: f64, kg: f64, cm: f64, activity: &str) -> InputSnapshot {
        InputSnapshot::new()
            .with("sex", sex)
            .with("age", age)
            .with("weightKg", kg)
            .with("heightCm", cm)
            .with("activity", activity)
    }

    #[test]
    fn test_mifflin_reference_values() {
        let male = mifflin_st_jeor(Sex::Male, Kilograms(80.0), Centimeters(180.0), 30.0);
        assert!(approx(male, 1780.0));
        let female = mifflin_st_jeor(Sex::Female, Kilograms(60.0), Centimeters(165.0), 25.0);
        assert!(approx(female, 1345.25));
    }

    #[test]
    fn test_tdee_applies_activity_factor() {
        let results = run("tdee", person("male", 30.0, 80.0, 180.0, "moderate"));
        assert!(results.is_valid);
        assert_eq!(results.number("bmr"), Some(1780.0));
        assert_eq!(results.number("tdee"), Some(2759.0));
        assert_eq!(results.formatted("tdee"), Some("2,759 kcal"));
        assert_eq!(results.number("weightGain"), Some(3259.0));
    }

    #[test]
    fn test_loss_target_never_below_bmr() {
        let results = run("tdee", person("female", 25.0, 50.0, 155.0, "sedentary"));
        let bmr = results.number("bmr").unwrap();
        assert!(results.number("weightLoss").unwrap() >= bmr);
    }

    #[test]
    fn test_unknown_activity_is_invalid() {
        assert!(!run("tdee", person("male", 30.0, 80.0, 180.0, "couch")).is_valid);
    }
}
