//! # Grade Calculator
//!
//! - `weighted`: `Σ score·weight / Σ weight` over up to five rows
//! - `average`: plain mean of the scores entered
//! - `finalNeeded`: score required on a final exam worth `finalWeight`% to
//!   reach `targetGrade`, given the current grade
//!
//! Letter grades use the plus/minus scale on the rounded average.

use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::format::format_trimmed;
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

/// Number of score rows the form offers.
pub const ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeMode {
    Weighted,
    Average,
    FinalNeeded,
}

impl FromStr for GradeMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted" => Ok(GradeMode::Weighted),
            "average" => Ok(GradeMode::Average),
            "finalNeeded" => Ok(GradeMode::FinalNeeded),
            other => Err(CalcError::invalid_input("mode", other, "Unknown grade mode")),
        }
    }
}

/// Lower bounds of each letter on the rounded percentage.
const SCALE: [(f64, &str); 12] = [
    (97.0, "A+"),
    (93.0, "A"),
    (90.0, "A-"),
    (87.0, "B+"),
    (83.0, "B"),
    (80.0, "B-"),
    (77.0, "C+"),
    (73.0, "C"),
    (70.0, "C-"),
    (67.0, "D+"),
    (63.0, "D"),
    (60.0, "D-"),
];

/// Letter grade for a percentage, rounded to the nearest whole point first.
pub fn letter_grade(percent: f64) -> &'static str {
    let rounded = percent.round();
    SCALE
        .iter()
        .find(|(floor, _)| rounded >= *floor)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

/// Weighted mean of `(score, weight)` pairs.
pub fn weighted_average(rows: &[(f64, f64)]) -> CalcResult<f64> {
    let total_weight: f64 = rows.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return Err(CalcError::division_by_zero("weight1"));
    }
    Ok(rows.iter().map(|(s, w)| s * w).sum::<f64>() / total_weight)
}

/// Score needed on the final. May exceed 100 or fall below 0.
pub fn final_needed(current: f64, target: f64, final_weight_percent: f64) -> CalcResult<f64> {
    if final_weight_percent <= 0.0 {
        return Err(CalcError::division_by_zero("finalWeight"));
    }
    let w = final_weight_percent / 100.0;
    Ok((target - current * (1.0 - w)) / w)
}

/// How reachable a required final score is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Secured,
    Achievable,
    OutOfReach,
}

impl Outlook {
    pub fn of(needed: f64) -> Self {
        if needed <= 0.0 {
            Outlook::Secured
        } else if needed <= 100.0 {
            Outlook::Achievable
        } else {
            Outlook::OutOfReach
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Outlook::Secured => "secured",
            Outlook::Achievable => "achievable",
            Outlook::OutOfReach => "outOfReach",
        }
    }
}

/// Rows where every requested column is filled in. Partially filled rows
/// are skipped.
fn rows(inputs: &InputSnapshot, weighted: bool) -> CalcResult<Vec<(f64, f64)>> {
    let mut rows = Vec::with_capacity(ROWS);
    for i in 1..=ROWS {
        let score = inputs.optional_number(&format!("score{i}"))?;
        let weight = if weighted {
            inputs.optional_number(&format!("weight{i}"))?
        } else {
            Some(1.0)
        };
        if let (Some(score), Some(weight)) = (score, weight) {
            if weight < 0.0 {
                let field = format!("weight{i}");
                return Err(CalcError::invalid_input(field, weight.to_string(), "Weight cannot be negative"));
            }
            rows.push((score, weight));
        }
    }
    if rows.is_empty() {
        return Err(CalcError::missing_field("score1"));
    }
    Ok(rows)
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let mode: GradeMode = inputs.choice("mode")?;

    match mode {
        GradeMode::Weighted | GradeMode::Average => {
            let weighted = mode == GradeMode::Weighted;
            let rows = rows(inputs, weighted)?;
            let average = weighted_average(&rows)?;
            let letter = letter_grade(average);

            let mut results = ctx
                .results()
                .number("average", average, 2)
                .text("letterGrade", letter, letter)
                .integer("count", rows.len() as f64);
            if weighted {
                let total: f64 = rows.iter().map(|(_, w)| w).sum();
                results = results.number("totalWeight", total, 2);
            }
            let summary = ctx.t.format(
                "summary.average",
                &[("average", results.shown("average")), ("letter", letter)],
            );
            Ok(results.summary(summary).build())
        }
        GradeMode::FinalNeeded => {
            let current = inputs.number("currentGrade")?;
            let target = inputs.number("targetGrade")?;
            let weight = inputs.number("finalWeight")?;
            let needed = final_needed(current, target, weight)?;
            let outlook = Outlook::of(needed);
            let label = ctx.t.option("outlook", outlook.key());

            let results = ctx
                .results()
                .number("neededScore", needed, 2)
                .text("outlook", outlook.key(), label.clone())
                .text("targetLetter", letter_grade(target), letter_grade(target));
            let summary = ctx.t.format(
                "summary.finalNeeded",
                &[
                    ("needed", results.shown("neededScore")),
                    ("target", &format_trimmed(target, 2, ctx.locale())),
                    ("outlook", &label),
                ],
            );
            Ok(results.summary(summary).build())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run};
    use crate::inputs::InputValue;

    fn weighted(rows: &[(f64, f64)]) -> InputSnapshot {
        let mut inputs = InputSnapshot::new().with("mode", "weighted");
        for i in 1..=ROWS {
            let (score, weight) = match rows.get(i - 1) {
                Some((s, w)) => (InputValue::Number(*s), InputValue::Number(*w)),
                None => (InputValue::Null, InputValue::Null),
            };
            inputs.set(format!("score{i}"), score);
            inputs.set(format!("weight{i}"), weight);
        }
        inputs
    }

    #[test]
    fn test_weighted_example() {
        let results = run("grade", weighted(&[(92.0, 20.0), (78.0, 30.0), (85.0, 50.0)]));
        assert!(results.is_valid);
        assert!(approx(results.number("average").unwrap(), 84.3));
        assert_eq!(results.formatted("average"), Some("84.3"));
        assert_eq!(results.values["letterGrade"].as_text(), Some("B"));
        assert_eq!(results.number("totalWeight"), Some(100.0));
    }

    #[test]
    fn test_zero_total_weight_is_invalid() {
        let results = run("grade", weighted(&[(90.0, 0.0), (80.0, 0.0)]));
        assert!(!results.is_valid);
    }

    #[test]
    fn test_no_rows_is_invalid() {
        let results = run("grade", weighted(&[]));
        assert!(!results.is_valid);
    }

    #[test]
    fn test_partial_rows_skipped() {
        let inputs = weighted(&[(90.0, 1.0), (70.0, 1.0)]).with("score3", 10.0);
        let results = run("grade", inputs);
        assert!(approx(results.number("average").unwrap(), 80.0));
        assert_eq!(results.number("count"), Some(2.0));
    }

    #[test]
    fn test_average_mode_ignores_weights() {
        let inputs = weighted(&[(90.0, 10.0), (70.0, 90.0)]).with("mode", "average");
        let results = run("grade", inputs);
        assert!(approx(results.number("average").unwrap(), 80.0));
        assert_eq!(results.values["letterGrade"].as_text(), Some("B-"));
        assert!(!results.values.contains_key("totalWeight"));
    }

    #[test]
    fn test_final_needed() {
        let inputs = InputSnapshot::new()
            .with("mode", "finalNeeded")
            .with("currentGrade", 85.0)
            .with("targetGrade", 90.0)
            .with("finalWeight", 25.0);
        let results = run("grade", inputs);
        assert!(results.is_valid);
        assert!(approx(results.number("neededScore").unwrap(), 105.0));
        assert_eq!(results.values["outlook"].as_text(), Some("outOfReach"));
    }

    #[test]
    fn test_letter_scale_boundaries() {
        assert_eq!(letter_grade(96.5), "A+");
        assert_eq!(letter_grade(96.4), "A");
        assert_eq!(letter_grade(90.0), "A-");
        assert_eq!(letter_grade(82.6), "B");
        assert_eq!(letter_grade(82.4), "B-");
        assert_eq!(letter_grade(60.0), "D-");
        assert_eq!(letter_grade(59.4), "F");
        assert_eq!(letter_grade(-5.0), "F");
    }

    #[test]
    fn test_outlook() {
        assert_eq!(Outlook::of(-3.0), Outlook::Secured);
        assert_eq!(Outlook::of(100.0), Outlook::Achievable);
        assert_eq!(Outlook::of(100.1), Outlook::OutOfReach);
    }
}
