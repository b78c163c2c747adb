//! # Fraction Calculator
//!
//! Exact rational arithmetic on `i64` numerators and denominators. Every
//! result is reduced by the greatest common divisor and carries its sign on
//! the numerator. Arithmetic is checked; overflow is reported as invalid
//! input rather than wrapping.

use std::fmt;
use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Simplify,
    ToDecimal,
}

impl FractionOp {
    /// Operations that take a second fraction.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            FractionOp::Add | FractionOp::Subtract | FractionOp::Multiply | FractionOp::Divide
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            FractionOp::Add => "+",
            FractionOp::Subtract => "−",
            FractionOp::Multiply => "×",
            FractionOp::Divide => "÷",
            FractionOp::Simplify | FractionOp::ToDecimal => "",
        }
    }
}

impl FromStr for FractionOp {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(FractionOp::Add),
            "subtract" => Ok(FractionOp::Subtract),
            "multiply" => Ok(FractionOp::Multiply),
            "divide" => Ok(FractionOp::Divide),
            "simplify" => Ok(FractionOp::Simplify),
            "toDecimal" => Ok(FractionOp::ToDecimal),
            other => Err(CalcError::invalid_input("operation", other, "Unknown fraction operation")),
        }
    }
}

/// A reduced fraction with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    num: i64,
    den: i64,
}

impl Fraction {
    /// Build and reduce `num/den`. `field` names the denominator input for
    /// error reporting.
    pub fn new(num: i64, den: i64, field: &str) -> CalcResult<Self> {
        if den == 0 {
            return Err(CalcError::division_by_zero(field));
        }
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i64;
        let (mut num, mut den) = (num / divisor, den / divisor);
        if den < 0 {
            num = num.checked_neg().ok_or_else(|| overflow(field))?;
            den = den.checked_neg().ok_or_else(|| overflow(field))?;
        }
        Ok(Fraction { num, den })
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn add(self, other: Fraction) -> CalcResult<Fraction> {
        let num = checked(self.num.checked_mul(other.den))?
            .checked_add(checked(other.num.checked_mul(self.den))?)
            .ok_or_else(|| overflow("result"))?;
        Fraction::new(num, checked(self.den.checked_mul(other.den))?, "result")
    }

    pub fn subtract(self, other: Fraction) -> CalcResult<Fraction> {
        let negated = Fraction {
            num: checked(other.num.checked_neg())?,
            den: other.den,
        };
        self.add(negated)
    }

    pub fn multiply(self, other: Fraction) -> CalcResult<Fraction> {
        Fraction::new(
            checked(self.num.checked_mul(other.num))?,
            checked(self.den.checked_mul(other.den))?,
            "result",
        )
    }

    pub fn divide(self, other: Fraction) -> CalcResult<Fraction> {
        if other.num == 0 {
            return Err(CalcError::division_by_zero("numerator2"));
        }
        Fraction::new(
            checked(self.num.checked_mul(other.den))?,
            checked(self.den.checked_mul(other.num))?,
            "result",
        )
    }

    /// Mixed-number form, e.g. `1 1/3`. Proper fractions print as-is.
    pub fn mixed(&self) -> String {
        let whole = self.num / self.den;
        let rest = (self.num % self.den).abs();
        if whole == 0 || rest == 0 {
            return self.to_string();
        }
        format!("{whole} {rest}/{}", self.den)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn checked(value: Option<i64>) -> CalcResult<i64> {
    value.ok_or_else(|| overflow("result"))
}

fn overflow(field: &str) -> CalcError {
    CalcError::invalid_input(field, "overflow", "Result is too large to represent exactly")
}

fn read_fraction(inputs: &InputSnapshot, num: &str, den: &str) -> CalcResult<Fraction> {
    Fraction::new(inputs.integer(num)?, inputs.integer(den)?, den)
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let op: FractionOp = inputs.choice("operation")?;
    let first = read_fraction(inputs, "numerator1", "denominator1")?;
    let second = if op.is_binary() {
        Some(read_fraction(inputs, "numerator2", "denominator2")?)
    } else {
        None
    };

    let result = match (op, second) {
        (FractionOp::Add, Some(second)) => first.add(second)?,
        (FractionOp::Subtract, Some(second)) => first.subtract(second)?,
        (FractionOp::Multiply, Some(second)) => first.multiply(second)?,
        (FractionOp::Divide, Some(second)) => first.divide(second)?,
        _ => first,
    };
    let shown = result.to_string();

    let results = ctx
        .results()
        .fraction("result", shown.clone())
        .integer("numerator", result.numerator() as f64)
        .integer("denominator", result.denominator() as f64)
        .number("decimal", result.to_f64(), 6)
        .text("mixedNumber", result.mixed(), result.mixed());

    // As typed, before reduction
    let typed = format!("{}/{}", inputs.integer("numerator1")?, inputs.integer("denominator1")?);
    let summary = match (op, second) {
        (FractionOp::Simplify, _) => ctx.t.format("summary.simplify", &[("input", &typed), ("result", &shown)]),
        (FractionOp::ToDecimal, _) => ctx.t.format(
            "summary.toDecimal",
            &[("input", &typed), ("decimal", results.shown("decimal"))],
        ),
        (_, Some(second)) => ctx.t.format(
            "summary.binary",
            &[
                ("left", &first.to_string()),
                ("op", op.symbol()),
                ("right", &second.to_string()),
                ("result", &shown),
            ],
        ),
        (_, None) => shown.clone(),
    };
    Ok(results.summary(summary).build())
}
