//! # Evaluation Engine
//!
//! Generic driver for every calculator unit: builds input snapshots from a
//! config, runs the unit's evaluator, and enforces the output contract.
//!
//! ## Contract
//!
//! - Evaluation never fails from the caller's point of view. Missing inputs,
//!   out-of-range values and divisions by zero all come back as
//!   [`CalculatorResults::invalid`].
//! - Every result id the config declares (and whose `show_when` holds) is
//!   present in both `values` and `formatted` of a valid result.
//! - The output depends only on the snapshot, the locale and
//!   [`EvalContext::today`].
//!
//! ## Example
//!
//! ```rust
//! use kalc_core::engine::Engine;
//! use kalc_core::inputs::InputSnapshot;
//! use kalc_core::locale::Locale;
//!
//! let engine = Engine::embedded().unwrap();
//! let inputs = InputSnapshot::new()
//!     .with("mode", "whatIsXPercentOfY")
//!     .with("percentValue", 25.0)
//!     .with("ofValue", 120.0);
//!
//! let results = engine.evaluate("percentage", &inputs, Locale::En).unwrap();
//! assert!(results.is_valid);
//! assert_eq!(results.formatted("answer"), Some("30"));
//! ```

use chrono::{Local, NaiveDate};
use tracing::{debug, error};

use crate::calculators::CalculatorKind;
use crate::catalog::Catalog;
use crate::errors::{CalcError, CalcResult};
use crate::i18n::Translator;
use crate::inputs::InputSnapshot;
use crate::locale::Locale;
use crate::results::{CalculatorResults, ResultsBuilder, ResultValue};
use crate::schema::CalculatorConfig;

/// Everything an evaluator may depend on besides its inputs.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub t: Translator<'a>,
    /// Current date, for units whose purpose is a date computation
    pub today: NaiveDate,
}

impl<'a> EvalContext<'a> {
    pub fn new(config: &'a CalculatorConfig, locale: Locale, today: NaiveDate) -> Self {
        EvalContext {
            t: Translator::new(config, locale),
            today,
        }
    }

    /// Context dated with the local wall-clock date.
    pub fn for_today(config: &'a CalculatorConfig, locale: Locale) -> Self {
        Self::new(config, locale, Local::now().date_naive())
    }

    pub fn locale(&self) -> Locale {
        self.t.locale()
    }

    /// Fresh results builder in this context's locale.
    pub fn results(&self) -> ResultsBuilder {
        ResultsBuilder::new(self.locale())
    }
}

/// Evaluate one unit. Never fails: every error becomes an invalid result.
pub fn evaluate(config: &CalculatorConfig, inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalculatorResults {
    match try_evaluate(config, inputs, ctx) {
        Ok(results) => results,
        Err(err) if err.is_input_error() => {
            debug!(calculator = %config.id, code = err.error_code(), "invalid input: {err}");
            CalculatorResults::invalid()
        }
        Err(err) => {
            error!(calculator = %config.id, code = err.error_code(), "evaluation failed: {err}");
            CalculatorResults::invalid()
        }
    }
}

/// Evaluate one unit, surfacing the reason when the result is invalid.
pub fn try_evaluate(
    config: &CalculatorConfig,
    inputs: &InputSnapshot,
    ctx: &EvalContext<'_>,
) -> CalcResult<CalculatorResults> {
    let kind = CalculatorKind::from_id(&config.id).ok_or_else(|| CalcError::unknown_calculator(&config.id))?;
    config.check_inputs(inputs)?;
    let results = kind.calculate(inputs, ctx)?;
    check_output(config, inputs, &results)?;
    Ok(results)
}

/// Output contract: declared visible results are all present in their
/// declared format, numbers are finite, and `values`/`formatted` share their
/// keys.
fn check_output(config: &CalculatorConfig, inputs: &InputSnapshot, results: &CalculatorResults) -> CalcResult<()> {
    for field in config.visible_results(inputs) {
        if !results.values.contains_key(&field.id) || !results.formatted.contains_key(&field.id) {
            return Err(CalcError::Internal {
                message: format!("'{}' did not populate declared result '{}'", config.id, field.id),
            });
        }
        let emitted = results.formats.get(&field.id);
        if emitted != Some(&field.format) {
            return Err(CalcError::Internal {
                message: format!(
                    "'{}' result '{}' is declared {:?} but was emitted as {:?}",
                    config.id, field.id, field.format, emitted
                ),
            });
        }
    }
    for (id, value) in &results.values {
        if let ResultValue::Number(n) = value {
            if !n.is_finite() {
                return Err(CalcError::invalid_input(id, n.to_string(), "Result is not a finite number"));
            }
        }
        if !results.formatted.contains_key(id) {
            return Err(CalcError::Internal {
                message: format!("'{}' result '{id}' has no formatted string", config.id),
            });
        }
    }
    Ok(())
}

/// Catalog-backed front door used by the CLI and exporters.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'c> {
    catalog: &'c Catalog,
}

impl Engine<'static> {
    /// Engine over the compiled-in catalog.
    pub fn embedded() -> CalcResult<Self> {
        Ok(Engine {
            catalog: Catalog::embedded()?,
        })
    }
}

impl<'c> Engine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Engine { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn config(&self, id: &str) -> CalcResult<&'c CalculatorConfig> {
        self.catalog.config(id)
    }

    /// Defaults, then the optional preset, then `overrides`.
    pub fn snapshot(&self, id: &str, preset: Option<&str>, overrides: &InputSnapshot) -> CalcResult<InputSnapshot> {
        let config = self.config(id)?;
        let mut snapshot = match preset {
            Some(name) => config.preset_snapshot(name)?,
            None => config.default_snapshot(),
        };
        snapshot.merge(overrides);
        Ok(snapshot)
    }

    /// Evaluate against today's date. Errs only for an unknown id.
    pub fn evaluate(&self, id: &str, inputs: &InputSnapshot, locale: Locale) -> CalcResult<CalculatorResults> {
        let config = self.config(id)?;
        Ok(evaluate(config, inputs, &EvalContext::for_today(config, locale)))
    }

    /// Evaluate with an explicit date.
    pub fn evaluate_on(
        &self,
        id: &str,
        inputs: &InputSnapshot,
        locale: Locale,
        today: NaiveDate,
    ) -> CalcResult<CalculatorResults> {
        let config = self.config(id)?;
        Ok(evaluate(config, inputs, &EvalContext::new(config, locale, today)))
    }

    /// Like [`Engine::evaluate_on`] but returns the reason for invalid input.
    pub fn explain(
        &self,
        id: &str,
        inputs: &InputSnapshot,
        locale: Locale,
        today: NaiveDate,
    ) -> CalcResult<CalculatorResults> {
        let config = self.config(id)?;
        try_evaluate(config, inputs, &EvalContext::new(config, locale, today))
    }
}
