//! # Weight Goal Calculator
//!
//! Days needed to move from the current weight to a goal at a steady weekly
//! rate, and the calendar date that lands on counted from
//! [`EvalContext::today`]. This is the one unit whose output depends on the
//! current date.

use chrono::Days;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;
use crate::units::{Kilograms, Pounds, UnitSystem};

/// Approximate energy content of 1 kg of body fat
pub const KCAL_PER_KG: f64 = 7700.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalDirection {
    Lose,
    Gain,
    Maintain,
}

impl GoalDirection {
    pub fn key(&self) -> &'static str {
        match self {
            GoalDirection::Lose => "lose",
            GoalDirection::Gain => "gain",
            GoalDirection::Maintain => "maintain",
        }
    }
}

/// Timeline of a weight change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalPlan {
    pub direction: GoalDirection,
    pub change: Kilograms,
    pub weeks: f64,
    /// Whole days, rounded up
    pub days: u64,
    /// Daily calorie deficit (or surplus) needed to hold the rate
    pub daily_kcal: f64,
}

pub fn plan(current: Kilograms, goal: Kilograms, weekly_rate: Kilograms) -> CalcResult<GoalPlan> {
    if weekly_rate.0 <= 0.0 {
        return Err(CalcError::division_by_zero("weeklyRate"));
    }
    let delta = goal.0 - current.0;
    let direction = if delta < 0.0 {
        GoalDirection::Lose
    } else if delta > 0.0 {
        GoalDirection::Gain
    } else {
        GoalDirection::Maintain
    };
    let weeks = delta.abs() / weekly_rate.0;
    let daily_kcal = match direction {
        GoalDirection::Maintain => 0.0,
        _ => weekly_rate.0 * KCAL_PER_KG / 7.0,
    };
    Ok(GoalPlan {
        direction,
        change: Kilograms(delta.abs()),
        weeks,
        // Unit conversion can leave 140.00000000000003 days
        days: (weeks * 7.0 - 1e-9).ceil().max(0.0) as u64,
        daily_kcal,
    })
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let system: UnitSystem = inputs.choice("unitSystem")?;
    let to_kg = |id: &str| -> CalcResult<Kilograms> {
        let value = inputs.positive(id)?;
        Ok(match system {
            UnitSystem::Metric => Kilograms(value),
            UnitSystem::Imperial => Pounds(value).into(),
        })
    };
    let current = to_kg("currentWeight")?;
    let goal = to_kg("goalWeight")?;
    let rate = to_kg("weeklyRate")?;

    let plan = plan(current, goal, rate)?;
    let goal_date = ctx
        .today
        .checked_add_days(Days::new(plan.days))
        .ok_or_else(|| CalcError::invalid_input("weeklyRate", rate.0.to_string(), "Goal date is out of range"))?;

    let (change, unit) = match system {
        UnitSystem::Metric => (plan.change.0, "kg"),
        UnitSystem::Imperial => (Pounds::from(plan.change).0, "lb"),
    };
    let label = ctx.t.option("direction", plan.direction.key());

    let results = ctx
        .results()
        .date("goalDate", goal_date)
        .fixed("weeksNeeded", plan.weeks, 1)
        .integer("daysNeeded", plan.days as f64)
        .with_unit("totalChange", change, 1, unit)
        .with_unit("dailyCalories", plan.daily_kcal.round(), 0, "kcal")
        .text("direction", plan.direction.key(), label.clone());

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("direction", &label),
            ("change", results.shown("totalChange")),
            ("date", results.shown("goalDate")),
            ("days", results.shown("daysNeeded")),
        ],
    );
    Ok(results.summary(summary).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, day, run};
    use crate::catalog::Catalog;
    use crate::engine::{evaluate, EvalContext};
    use crate::locale::Locale;
    use chrono::NaiveDate;

    fn metric(current: f64, goal: f64, rate: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("unitSystem", "metric")
            .with("currentWeight", current)
            .with("goalWeight", goal)
            .with("weeklyRate", rate)
    }

    #[test]
    fn test_goal_date_from_today() {
        // 10 kg at 0.5 kg/week = 20 weeks = 140 days after 2025-01-15
        let results = run("weight-goal", metric(90.0, 80.0, 0.5));
        assert!(results.is_valid);
        assert_eq!(results.values["goalDate"].as_text(), Some("2025-06-04"));
        assert_eq!(results.formatted("goalDate"), Some("Jun 4, 2025"));
        assert_eq!(results.number("daysNeeded"), Some(140.0));
        assert_eq!(results.values["direction"].as_text(), Some("lose"));
        assert_eq!(results.number("dailyCalories"), Some(550.0));
    }

    #[test]
    fn test_output_follows_the_date() {
        let catalog = Catalog::embedded().unwrap();
        let config = catalog.config("weight-goal").unwrap();
        let mut inputs = config.default_snapshot();
        inputs.merge(&metric(70.0, 71.0, 0.25));

        let later = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let a = evaluate(config, &inputs, &EvalContext::new(config, Locale::En, day()));
        let b = evaluate(config, &inputs, &EvalContext::new(config, Locale::En, later));
        assert_eq!(a.values["goalDate"].as_text(), Some("2025-02-12"));
        assert_eq!(b.values["goalDate"].as_text(), Some("2025-03-01"));
    }

    #[test]
    fn test_maintain() {
        let results = run("weight-goal", metric(70.0, 70.0, 0.5));
        assert_eq!(results.values["direction"].as_text(), Some("maintain"));
        assert_eq!(results.number("daysNeeded"), Some(0.0));
        assert_eq!(results.number("dailyCalories"), Some(0.0));
    }

    #[test]
    fn test_imperial_reports_pounds() {
        let inputs = InputSnapshot::new()
            .with("unitSystem", "imperial")
            .with("currentWeight", 200.0)
            .with("goalWeight", 180.0)
            .with("weeklyRate", 1.0);
        let results = run("weight-goal", inputs);
        assert!(approx(results.number("totalChange").unwrap(), 20.0));
        assert_eq!(results.number("daysNeeded"), Some(140.0));
    }

    #[test]
    fn test_zero_rate_is_invalid() {
        assert!(plan(Kilograms(80.0), Kilograms(70.0), Kilograms(0.0)).is_err());
    }
}
