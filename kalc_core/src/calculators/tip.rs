//! # Tip Calculator
//!
//! Tip on a bill and the split between diners, optionally rounding each
//! share up to a whole amount.

use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    None,
    /// Round each person's share up to the next whole unit
    PerPerson,
}

impl FromStr for Rounding {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Rounding::None),
            "perPerson" => Ok(Rounding::PerPerson),
            other => Err(CalcError::invalid_input("rounding", other, "Unknown rounding")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub tip: f64,
    pub total: f64,
    pub per_person: f64,
    pub tip_per_person: f64,
}

pub fn split(bill: f64, tip_percent: f64, people: u32, rounding: Rounding) -> CalcResult<Split> {
    if people == 0 {
        return Err(CalcError::division_by_zero("people"));
    }
    let n = people as f64;
    let base_tip = bill * tip_percent / 100.0;
    let per_person = match rounding {
        Rounding::None => (bill + base_tip) / n,
        // 1e-9 keeps an exact 25.00 share from rounding to 26
        Rounding::PerPerson => ((bill + base_tip) / n - 1e-9).ceil(),
    };
    let total = per_person * n;
    let tip = total - bill;
    Ok(Split {
        tip,
        total,
        per_person,
        tip_per_person: tip / n,
    })
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let bill = inputs.non_negative("billAmount")?;
    let tip_percent = inputs.non_negative("tipPercent")?;
    let people = inputs.integer("people")?;
    let people = u32::try_from(people)
        .map_err(|_| CalcError::invalid_input("people", people.to_string(), "Number of people must be positive"))?;
    let rounding: Rounding = inputs.choice("rounding")?;

    let split = split(bill, tip_percent, people, rounding)?;
    let effective = if bill > 0.0 { split.tip / bill * 100.0 } else { tip_percent };

    let results = ctx
        .results()
        .currency("perPerson", split.per_person)
        .currency("tipAmount", split.tip)
        .currency("totalAmount", split.total)
        .currency("tipPerPerson", split.tip_per_person)
        .percent("effectiveTip", effective, 1);

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("total", results.shown("totalAmount")),
            ("people", &people.to_string()),
            ("share", results.shown("perPerson")),
        ],
    );
    Ok(results.summary(summary).build())
}
