//! # Calculator Results
//!
//! Output of one evaluation: raw values for chaining and export, formatted
//! strings for display, a one-line summary, and a validity flag.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "values": { "answer": 30.0 },
//!   "formatted": { "answer": "30" },
//!   "summary": "25% of 120 is 30",
//!   "is_valid": true,
//!   "formats": { "answer": "number" }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::locale::Locale;
use crate::schema::ResultFormat;

/// A raw result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl ResultValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResultValue::Number(n) => Some(*n),
            ResultValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultValue::Text(s) => Some(s),
            ResultValue::Number(_) => None,
        }
    }
}

/// Evaluation output.
///
/// When `is_valid` is false the maps and summary are empty and nothing
/// should be rendered as a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorResults {
    pub values: BTreeMap<String, ResultValue>,
    pub formatted: BTreeMap<String, String>,
    pub summary: String,
    pub is_valid: bool,
    /// Display format each result was emitted with, checked by the engine
    /// against the unit's declared `format`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formats: BTreeMap<String, ResultFormat>,
}

impl CalculatorResults {
    /// The empty, invalid result.
    pub fn invalid() -> Self {
        CalculatorResults {
            values: BTreeMap::new(),
            formatted: BTreeMap::new(),
            summary: String::new(),
            is_valid: false,
            formats: BTreeMap::new(),
        }
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        self.values.get(id).and_then(ResultValue::as_number)
    }

    pub fn formatted(&self, id: &str) -> Option<&str> {
        self.formatted.get(id).map(String::as_str)
    }
}

/// Collects result values and their formatted strings for one locale.
///
/// Every setter writes `values` and `formatted` under the same id, which keeps
/// the two maps keyed identically.
#[derive(Debug, Clone)]
pub struct ResultsBuilder {
    locale: Locale,
    values: BTreeMap<String, ResultValue>,
    formatted: BTreeMap<String, String>,
    formats: BTreeMap<String, ResultFormat>,
    summary: String,
}

impl ResultsBuilder {
    pub fn new(locale: Locale) -> Self {
        ResultsBuilder {
            locale,
            values: BTreeMap::new(),
            formatted: BTreeMap::new(),
            formats: BTreeMap::new(),
            summary: String::new(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn put(mut self, id: &str, value: ResultValue, display: String, format: ResultFormat) -> Self {
        self.values.insert(id.to_string(), value);
        self.formatted.insert(id.to_string(), display);
        self.formats.insert(id.to_string(), format);
        self
    }

    /// Number shown with up to `max_decimals`, trailing zeros dropped.
    pub fn number(self, id: &str, value: f64, max_decimals: usize) -> Self {
        let display = format::format_trimmed(value, max_decimals, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Number)
    }

    /// Number shown with exactly `decimals`.
    pub fn fixed(self, id: &str, value: f64, decimals: usize) -> Self {
        let display = format::format_fixed(value, decimals, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Number)
    }

    /// Whole number.
    pub fn integer(self, id: &str, value: f64) -> Self {
        let display = format::format_integer(value, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Integer)
    }

    /// Percentage with exactly `decimals`.
    pub fn percent(self, id: &str, value: f64, decimals: usize) -> Self {
        let display = format::format_percent(value, decimals, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Percent)
    }

    /// Monetary amount.
    pub fn currency(self, id: &str, value: f64) -> Self {
        let display = format::format_currency(value, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Currency)
    }

    /// Number followed by a unit suffix.
    pub fn with_unit(self, id: &str, value: f64, max_decimals: usize, unit: &str) -> Self {
        let display = format::format_with_unit(value, max_decimals, unit, self.locale);
        self.put(id, ResultValue::Number(value), display, ResultFormat::Number)
    }

    /// Text result. `raw` is the machine value (e.g. an option key), `display`
    /// the localized label.
    pub fn text(self, id: &str, raw: impl Into<String>, display: impl Into<String>) -> Self {
        self.put(id, ResultValue::Text(raw.into()), display.into(), ResultFormat::Text)
    }

    /// Fraction in `n/d` form; the same string is value and display.
    pub fn fraction(self, id: &str, shown: impl Into<String>) -> Self {
        let shown = shown.into();
        self.put(id, ResultValue::Text(shown.clone()), shown, ResultFormat::Fraction)
    }

    /// Calendar date: ISO `YYYY-MM-DD` as the value, localized for display.
    pub fn date(self, id: &str, date: NaiveDate) -> Self {
        let display = format::format_date(date, self.locale);
        self.put(id, ResultValue::Text(date.format("%Y-%m-%d").to_string()), display, ResultFormat::Date)
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Formatted string already recorded for `id`, for use in summaries.
    pub fn shown(&self, id: &str) -> &str {
        self.formatted.get(id).map(String::as_str).unwrap_or_default()
    }

    pub fn build(self) -> CalculatorResults {
        CalculatorResults {
            values: self.values,
            formatted: self.formatted,
            summary: self.summary,
            is_valid: true,
            formats: self.formats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keys_match() {
        let results = ResultsBuilder::new(Locale::En)
            .number("answer", 30.0, 2)
            .percent("rate", 84.0, 2)
            .text("direction", "increase", "Increase")
            .summary("done")
            .build();

        assert!(results.is_valid);
        assert_eq!(
            results.values.keys().collect::<Vec<_>>(),
            results.formatted.keys().collect::<Vec<_>>()
        );
        assert_eq!(results.formatted("answer"), Some("30"));
        assert_eq!(results.formatted("rate"), Some("84.00%"));
        assert_eq!(results.number("answer"), Some(30.0));
        assert_eq!(results.formats["answer"], ResultFormat::Number);
        assert_eq!(results.formats["rate"], ResultFormat::Percent);
        assert_eq!(results.formats["direction"], ResultFormat::Text);
    }

    #[test]
    fn test_invalid_is_empty() {
        let results = CalculatorResults::invalid();
        assert!(!results.is_valid);
        assert!(results.values.is_empty());
        assert!(results.formatted.is_empty());
        assert!(results.summary.is_empty());
    }

    #[test]
    fn test_results_serialization() {
        let results = ResultsBuilder::new(Locale::En).number("answer", 12.0, 2).build();
        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains("\"answer\":12.0"));
        assert!(json.contains("\"is_valid\":true"));
    }
}
