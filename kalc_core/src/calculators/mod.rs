//! # Calculator Evaluators
//!
//! The computational half of each calculator unit. Every module follows the
//! same pattern:
//!
//! - a mode/option enum parsed from the unit's discriminant input
//! - small pure functions holding the closed-form arithmetic
//! - `calculate(inputs, ctx) -> CalcResult<CalculatorResults>`
//!
//! Evaluators return `Err` for bad input; [`crate::engine`] turns that into an
//! invalid result so callers never see it.
//!
//! ## Available Calculators
//!
//! - [`percentage`] - three percentage modes (math)
//! - [`fraction`] - fraction arithmetic (math)
//! - [`grade`] - weighted / average / final-exam grades (everyday)
//! - [`tip`] - tip and bill split (everyday)
//! - [`raid`] - RAID capacity, fault tolerance and IOPS (technology)
//! - [`bmi`] - body mass index (health)
//! - [`tdee`] - BMR and daily energy expenditure (health)
//! - [`weight_goal`] - goal date from today (health)
//! - [`compound_interest`] - compound growth with contributions (finance)
//! - [`loan`] - amortized loan payment (finance)
//! - [`length`] - length unit conversion (conversion)
//! - [`paint`] - paint needed for walls (home)

pub mod bmi;
pub mod compound_interest;
pub mod fraction;
pub mod grade;
pub mod length;
pub mod loan;
pub mod paint;
pub mod percentage;
pub mod raid;
pub mod tdee;
pub mod tip;
pub mod weight_goal;

use serde::{Deserialize, Serialize};

use crate::engine::EvalContext;
use crate::errors::CalcResult;
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

/// Every compiled-in evaluator.
///
/// Dispatch is a plain match; the catalog's unit files and this enum are
/// checked against each other by [`crate::catalog::Catalog::problems`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculatorKind {
    Percentage,
    Fraction,
    Grade,
    Tip,
    Raid,
    Bmi,
    Tdee,
    WeightGoal,
    CompoundInterest,
    Loan,
    Length,
    Paint,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 12] = [
        CalculatorKind::Percentage,
        CalculatorKind::Fraction,
        CalculatorKind::Grade,
        CalculatorKind::Tip,
        CalculatorKind::Raid,
        CalculatorKind::Bmi,
        CalculatorKind::Tdee,
        CalculatorKind::WeightGoal,
        CalculatorKind::CompoundInterest,
        CalculatorKind::Loan,
        CalculatorKind::Length,
        CalculatorKind::Paint,
    ];

    /// Catalog id
    pub fn id(&self) -> &'static str {
        match self {
            CalculatorKind::Percentage => "percentage",
            CalculatorKind::Fraction => "fraction",
            CalculatorKind::Grade => "grade",
            CalculatorKind::Tip => "tip",
            CalculatorKind::Raid => "raid",
            CalculatorKind::Bmi => "bmi",
            CalculatorKind::Tdee => "tdee",
            CalculatorKind::WeightGoal => "weight-goal",
            CalculatorKind::CompoundInterest => "compound-interest",
            CalculatorKind::Loan => "loan",
            CalculatorKind::Length => "length",
            CalculatorKind::Paint => "paint",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Units whose declared purpose reads the current date.
    pub fn uses_current_date(&self) -> bool {
        matches!(self, CalculatorKind::WeightGoal)
    }

    pub fn calculate(&self, inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
        match self {
            CalculatorKind::Percentage => percentage::calculate(inputs, ctx),
            CalculatorKind::Fraction => fraction::calculate(inputs, ctx),
            CalculatorKind::Grade => grade::calculate(inputs, ctx),
            CalculatorKind::Tip => tip::calculate(inputs, ctx),
            CalculatorKind::Raid => raid::calculate(inputs, ctx),
            CalculatorKind::Bmi => bmi::calculate(inputs, ctx),
            CalculatorKind::Tdee => tdee::calculate(inputs, ctx),
            CalculatorKind::WeightGoal => weight_goal::calculate(inputs, ctx),
            CalculatorKind::CompoundInterest => compound_interest::calculate(inputs, ctx),
            CalculatorKind::Loan => loan::calculate(inputs, ctx),
            CalculatorKind::Length => length::calculate(inputs, ctx),
            CalculatorKind::Paint => paint::calculate(inputs, ctx),
        }
    }
}

/// Shared fixtures for evaluator tests.
#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;

    use crate::catalog::Catalog;
    use crate::engine::{evaluate, EvalContext};
    use crate::inputs::InputSnapshot;
    use crate::locale::Locale;
    use crate::results::CalculatorResults;

    pub fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// Evaluate `id` through the engine with defaults overlaid by `inputs`.
    pub fn run(id: &str, inputs: InputSnapshot) -> CalculatorResults {
        run_in(id, inputs, Locale::En)
    }

    pub fn run_in(id: &str, inputs: InputSnapshot, locale: Locale) -> CalculatorResults {
        let config = Catalog::embedded().unwrap().config(id).unwrap();
        let mut snapshot = config.default_snapshot();
        snapshot.merge(&inputs);
        evaluate(config, &snapshot, &EvalContext::new(config, locale, day()))
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }
}
