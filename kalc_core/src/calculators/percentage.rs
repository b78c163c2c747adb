//! # Percentage Calculator
//!
//! Three independent modes selected by the `mode` input:
//!
//! - `whatIsXPercentOfY`: `answer = percentValue / 100 * ofValue`
//! - `xIsWhatPercentOfY`: `answer = isValue / totalValue * 100`
//! - `percentageChange`: `change = (toValue - fromValue) / |fromValue| * 100`
//!
//! The first two are inverses of each other.

use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::format::format_trimmed;
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageMode {
    WhatIsXPercentOfY,
    XIsWhatPercentOfY,
    PercentageChange,
}

impl FromStr for PercentageMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatIsXPercentOfY" => Ok(PercentageMode::WhatIsXPercentOfY),
            "xIsWhatPercentOfY" => Ok(PercentageMode::XIsWhatPercentOfY),
            "percentageChange" => Ok(PercentageMode::PercentageChange),
            other => Err(CalcError::invalid_input("mode", other, "Unknown percentage mode")),
        }
    }
}

/// Direction of a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Increase,
    Decrease,
    NoChange,
}

impl ChangeDirection {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            ChangeDirection::Increase
        } else if change < 0.0 {
            ChangeDirection::Decrease
        } else {
            ChangeDirection::NoChange
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ChangeDirection::Increase => "increase",
            ChangeDirection::Decrease => "decrease",
            ChangeDirection::NoChange => "noChange",
        }
    }
}

/// `percent`% of `of`.
pub fn percent_of(percent: f64, of: f64) -> f64 {
    percent / 100.0 * of
}

/// What percent `part` is of `total`.
pub fn what_percent(part: f64, total: f64) -> CalcResult<f64> {
    if total == 0.0 {
        return Err(CalcError::division_by_zero("totalValue"));
    }
    Ok(part / total * 100.0)
}

/// Signed percentage change from `from` to `to`, relative to `|from|`.
pub fn percent_change(from: f64, to: f64) -> CalcResult<f64> {
    if from == 0.0 {
        return Err(CalcError::division_by_zero("fromValue"));
    }
    Ok((to - from) / from.abs() * 100.0)
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let mode: PercentageMode = inputs.choice("mode")?;
    let locale = ctx.locale();
    let show = |n: f64| format_trimmed(n, 2, locale);

    match mode {
        PercentageMode::WhatIsXPercentOfY => {
            let percent = inputs.number("percentValue")?;
            let of = inputs.number("ofValue")?;
            let answer = percent_of(percent, of);

            let results = ctx.results().number("answer", answer, 2);
            let summary = ctx.t.format(
                "summary.whatIsXPercentOfY",
                &[("percent", &show(percent)), ("of", &show(of)), ("answer", results.shown("answer"))],
            );
            Ok(results.summary(summary).build())
        }
        PercentageMode::XIsWhatPercentOfY => {
            let part = inputs.number("isValue")?;
            let total = inputs.number("totalValue")?;
            let answer = what_percent(part, total)?;

            let results = ctx.results().percent("answer", answer, 2);
            let summary = ctx.t.format(
                "summary.xIsWhatPercentOfY",
                &[("is", &show(part)), ("total", &show(total)), ("answer", results.shown("answer"))],
            );
            Ok(results.summary(summary).build())
        }
        PercentageMode::PercentageChange => {
            let from = inputs.number("fromValue")?;
            let to = inputs.number("toValue")?;
            let change = percent_change(from, to)?;
            let direction = ChangeDirection::of(change);
            let label = ctx.t.option("direction", direction.key());

            let results = ctx
                .results()
                .percent("answer", change.abs(), 2)
                .percent("change", change, 2)
                .text("direction", direction.key(), label.clone());
            let summary = ctx.t.format(
                "summary.percentageChange",
                &[
                    ("from", &show(from)),
                    ("to", &show(to)),
                    ("answer", results.shown("answer")),
                    ("direction", &label.to_lowercase()),
                ],
            );
            Ok(results.summary(summary).build())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run, run_in};
    use crate::inputs::{InputSnapshot, InputValue};
    use crate::locale::Locale;
    use crate::schema::ResultFormat;
    use proptest::prelude::*;

    fn what_is(percent: f64, of: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("mode", "whatIsXPercentOfY")
            .with("percentValue", percent)
            .with("ofValue", of)
    }

    fn x_is_what(part: f64, total: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("mode", "xIsWhatPercentOfY")
            .with("isValue", part)
            .with("totalValue", total)
    }

    fn change(from: f64, to: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("mode", "percentageChange")
            .with("fromValue", from)
            .with("toValue", to)
    }

    #[test]
    fn test_what_is_25_percent_of_120() {
        let results = run("percentage", what_is(25.0, 120.0));
        assert!(results.is_valid);
        assert_eq!(results.number("answer"), Some(30.0));
        assert_eq!(results.formatted("answer"), Some("30"));
        assert_eq!(results.summary, "25% of 120 is 30");
    }

    #[test]
    fn test_42_is_what_percent_of_50() {
        let results = run("percentage", x_is_what(42.0, 50.0));
        assert!(results.is_valid);
        assert!(approx(results.number("answer").unwrap(), 84.0));
        assert_eq!(results.formatted("answer"), Some("84.00%"));
    }

    #[test]
    fn test_change_80_to_100() {
        let results = run("percentage", change(80.0, 100.0));
        assert!(results.is_valid);
        assert!(approx(results.number("change").unwrap(), 25.0));
        assert_eq!(results.values["direction"].as_text(), Some("increase"));
        assert_eq!(results.formatted("change"), Some("25.00%"));
    }

    #[test]
    fn test_decrease_and_no_change() {
        let results = run("percentage", change(100.0, 75.0));
        assert!(approx(results.number("change").unwrap(), -25.0));
        assert!(approx(results.number("answer").unwrap(), 25.0));
        assert_eq!(results.values["direction"].as_text(), Some("decrease"));

        let results = run("percentage", change(10.0, 10.0));
        assert_eq!(results.values["direction"].as_text(), Some("noChange"));
    }

    #[test]
    fn test_negative_base_uses_magnitude() {
        // -50 -> -25 is a rise of half the base
        let results = run("percentage", change(-50.0, -25.0));
        assert!(approx(results.number("change").unwrap(), 50.0));
    }

    #[test]
    fn test_division_by_zero_guards() {
        let results = run("percentage", change(0.0, 100.0));
        assert!(!results.is_valid);
        assert!(results.values.is_empty());

        let results = run("percentage", x_is_what(5.0, 0.0));
        assert!(!results.is_valid);
    }

    #[test]
    fn test_null_input_is_invalid() {
        let inputs = what_is(25.0, 120.0).with("ofValue", InputValue::Null);
        let results = run("percentage", inputs);
        assert!(!results.is_valid);
        assert!(results.formatted.is_empty());
    }

    #[test]
    fn test_hidden_inputs_ignored() {
        // totalValue belongs to another mode; nulling it must not matter
        let inputs = what_is(10.0, 10.0).with("totalValue", InputValue::Null);
        assert!(run("percentage", inputs).is_valid);
    }

    #[test]
    fn test_answer_format_follows_mode() {
        let results = run("percentage", what_is(25.0, 120.0));
        assert_eq!(results.formats["answer"], ResultFormat::Number);

        let results = run("percentage", x_is_what(42.0, 50.0));
        assert_eq!(results.formats["answer"], ResultFormat::Percent);

        let results = run("percentage", change(80.0, 100.0));
        assert_eq!(results.formats["answer"], ResultFormat::Percent);
        assert_eq!(results.formats["direction"], ResultFormat::Text);
    }

    #[test]
    fn test_spanish_formatting() {
        let results = run_in("percentage", what_is(12.5, 10_000.0), Locale::Es);
        assert_eq!(results.formatted("answer"), Some("1.250"));
        assert_eq!(results.summary, "El 12,5% de 10.000 es 1.250");
    }

    proptest! {
        #[test]
        fn prop_modes_are_inverse(percent in -500.0f64..500.0, of in 0.01f64..1_000_000.0) {
            let answer = percent_of(percent, of);
            let back = what_percent(answer, of).unwrap();
            prop_assert!((back - percent).abs() < 1e-6 * percent.abs().max(1.0));
        }

        #[test]
        fn prop_change_matches_direction(from in -1000.0f64..1000.0, to in -1000.0f64..1000.0) {
            prop_assume!(from != 0.0);
            let change = percent_change(from, to).unwrap();
            let expected = if to > from { ChangeDirection::Increase } else if to < from { ChangeDirection::Decrease } else { ChangeDirection::NoChange };
            prop_assert_eq!(ChangeDirection::of(change), expected);
        }
    }
}
