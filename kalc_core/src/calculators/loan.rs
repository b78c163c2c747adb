//! # Loan Calculator
//!
//! Fixed-rate amortized loan repaid in equal monthly installments:
//!
//! ```text
//! M = P·i / (1 − (1 + i)^−n)       i = annual rate / 12, n = months
//! ```
//!
//! An interest-free loan is repaid as `P / n`.

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

pub const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repayment {
    pub monthly_payment: f64,
    pub payments: u32,
    pub total_paid: f64,
    pub total_interest: f64,
    /// Interest share of the first installment
    pub first_interest: f64,
}

pub fn monthly_payment(principal: f64, annual_rate_percent: f64, months: u32) -> CalcResult<f64> {
    if months == 0 {
        return Err(CalcError::division_by_zero("termYears"));
    }
    let i = annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64;
    if i == 0.0 {
        return Ok(principal / months as f64);
    }
    Ok(principal * i / (1.0 - (1.0 + i).powi(-(months as i32))))
}

pub fn repay(principal: f64, annual_rate_percent: f64, years: u32) -> CalcResult<Repayment> {
    let payments = years * MONTHS_PER_YEAR;
    let monthly = monthly_payment(principal, annual_rate_percent, payments)?;
    let total_paid = monthly * payments as f64;
    Ok(Repayment {
        monthly_payment: monthly,
        payments,
        total_paid,
        total_interest: total_paid - principal,
        first_interest: principal * annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64,
    })
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let principal = inputs.positive("loanAmount")?;
    let rate = inputs.non_negative("annualRate")?;
    let years = inputs.integer("termYears")?;
    let years = u32::try_from(years)
        .ok()
        .filter(|y| *y > 0)
        .ok_or_else(|| CalcError::invalid_input("termYears", years.to_string(), "Term must be at least one year"))?;

    let loan = repay(principal, rate, years)?;

    let results = ctx
        .results()
        .currency("monthlyPayment", loan.monthly_payment)
        .currency("totalPaid", loan.total_paid)
        .currency("totalInterest", loan.total_interest)
        .integer("payments", loan.payments as f64)
        .currency("firstInterest", loan.first_interest);

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("payment", results.shown("monthlyPayment")),
            ("payments", results.shown("payments")),
            ("interest", results.shown("totalInterest")),
        ],
    );
    Ok(results.summary(summary).build())
}
