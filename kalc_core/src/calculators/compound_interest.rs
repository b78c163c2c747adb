//! # Compound Interest Calculator
//!
//! Future value of a principal compounded `n` times a year at annual rate `r`
//! for `t` years, plus a contribution `C` paid at the end of every
//! compounding period:
//!
//! ```text
//! FV = P·(1 + r/n)^(n·t) + C·((1 + r/n)^(n·t) − 1) / (r/n)
//! ```
//!
//! At `r = 0` the annuity term degenerates to `C·n·t`.

use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compounding {
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl Compounding {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Compounding::Annually => 1,
            Compounding::SemiAnnually => 2,
            Compounding::Quarterly => 4,
            Compounding::Monthly => 12,
            Compounding::Daily => 365,
        }
    }
}

impl FromStr for Compounding {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annually" => Ok(Compounding::Annually),
            "semiAnnually" => Ok(Compounding::SemiAnnually),
            "quarterly" => Ok(Compounding::Quarterly),
            "monthly" => Ok(Compounding::Monthly),
            "daily" => Ok(Compounding::Daily),
            other => Err(CalcError::invalid_input("compounding", other, "Unknown compounding frequency")),
        }
    }
}

/// Breakdown of a compounded balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    /// Annual yield after compounding, as a fraction
    pub effective_rate: f64,
}

pub fn grow(principal: f64, annual_rate_percent: f64, years: u32, compounding: Compounding, contribution: f64) -> Growth {
    let n = compounding.periods_per_year() as f64;
    let periods = n * years as f64;
    let rate = annual_rate_percent / 100.0 / n;

    let (final_balance, effective_rate) = if rate == 0.0 {
        (principal + contribution * periods, 0.0)
    } else {
        let factor = (1.0 + rate).powf(periods);
        (
            principal * factor + contribution * (factor - 1.0) / rate,
            (1.0 + rate).powf(n) - 1.0,
        )
    };
    let total_contributions = principal + contribution * periods;

    Growth {
        final_balance,
        total_contributions,
        total_interest: final_balance - total_contributions,
        effective_rate,
    }
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let principal = inputs.non_negative("principal")?;
    let rate = inputs.number("annualRate")?;
    let years = inputs.integer("years")?;
    let years = u32::try_from(years)
        .map_err(|_| CalcError::invalid_input("years", years.to_string(), "Years must be a whole positive number"))?;
    let compounding: Compounding = inputs.choice("compounding")?;
    let contribution = inputs.non_negative("contribution")?;

    let growth = grow(principal, rate, years, compounding, contribution);

    let results = ctx
        .results()
        .currency("finalBalance", growth.final_balance)
        .currency("totalContributions", growth.total_contributions)
        .currency("totalInterest", growth.total_interest)
        .percent("effectiveRate", growth.effective_rate * 100.0, 3);

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("years", &years.to_string()),
            ("balance", results.shown("finalBalance")),
            ("interest", results.shown("totalInterest")),
        ],
    );
    Ok(results.summary(summary).build())
}
