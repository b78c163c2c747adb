//! # Length Converter
//!
//! Converts between metric and imperial length units through meters.

use crate::engine::EvalContext;
use crate::errors::CalcResult;
use crate::format::format_trimmed;
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;
use crate::units::{LengthUnit, Meters};

/// Convert `value` from one unit to another.
pub fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    if from == to {
        return value;
    }
    to.from_meters(from.to_meters(value))
}

/// Fractional digits worth showing for a converted value. Small magnitudes
/// (1 mm in miles) would otherwise print as zero.
pub fn display_decimals(value: f64) -> usize {
    let magnitude = value.abs();
    if magnitude == 0.0 || magnitude >= 1.0 {
        6
    } else {
        let leading_zeros = (-magnitude.log10()).floor() as usize;
        (leading_zeros + 6).min(15)
    }
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let value = inputs.non_negative("value")?;
    let from: LengthUnit = inputs.choice("fromUnit")?;
    let to: LengthUnit = inputs.choice("toUnit")?;

    let converted = convert(value, from, to);
    let meters: Meters = from.to_meters(value);
    let factor = convert(1.0, from, to);

    let results = ctx
        .results()
        .with_unit("converted", converted, display_decimals(converted), to.symbol())
        .with_unit("meters", meters.0, display_decimals(meters.0), "m")
        .number("factor", factor, display_decimals(factor));

    let input = format!("{} {}", format_trimmed(value, display_decimals(value), ctx.locale()), from.symbol());
    let summary = ctx.t.format(
        "summary.default",
        &[("input", &input), ("converted", results.shown("converted"))],
    );
    Ok(results.summary(summary).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run};
    use proptest::prelude::*;

    fn length(value: f64, from: &str, to: &str) -> InputSnapshot {
        InputSnapshot::new()
            .with("value", value)
            .with("fromUnit", from)
            .with("toUnit", to)
    }

    #[test]
    fn test_exact_definitions() {
        assert!(approx(convert(1.0, LengthUnit::Mi, LengthUnit::Km), 1.609344));
        assert!(approx(convert(12.0, LengthUnit::In, LengthUnit::Ft), 1.0));
        assert!(approx(convert(3.0, LengthUnit::Ft, LengthUnit::Yd), 1.0));
        assert!(approx(convert(2.54, LengthUnit::Cm, LengthUnit::In), 1.0));
    }

    #[test]
    fn test_small_values_stay_visible() {
        let results = run("length", length(1.0, "mm", "mi"));
        assert!(results.is_valid);
        let shown = results.formatted("converted").unwrap();
        assert!(shown.starts_with("0.000000621"), "{shown}");
        assert!(shown.ends_with(" mi"));
    }

    #[test]
    fn test_summary() {
        let results = run("length", length(5.0, "km", "m"));
        assert_eq!(results.formatted("converted"), Some("5,000 m"));
        assert_eq!(results.summary, "5 km = 5,000 m");
    }

    #[test]
    fn test_unknown_unit_is_invalid() {
        assert!(!run("length", length(1.0, "furlong", "m")).is_valid);
    }

    proptest! {
        #[test]
        fn prop_round_trip_through_any_unit(value in 0.0f64..1e6, a in 0usize..8, b in 0usize..8) {
            let (from, to) = (LengthUnit::ALL[a], LengthUnit::ALL[b]);
            let back = convert(convert(value, from, to), to, from);
            prop_assert!((back - value).abs() <= 1e-9 * value.max(1.0));
        }
    }
}
