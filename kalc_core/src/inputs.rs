//! # Input Snapshots
//!
//! A snapshot of every input's current raw value, keyed by input id. This is
//! the only thing an evaluator reads besides its [`EvalContext`].
//!
//! ## JSON Example
//!
//! ```json
//! { "mode": "whatIsXPercentOfY", "percentValue": 25, "ofValue": 120, "isValue": null }
//! ```
//!
//! [`EvalContext`]: crate::engine::EvalContext

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Raw value of a single input field.
///
/// `Null` means "not yet entered" and is what the JSON `null` deserializes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum InputValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl InputValue {
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line style value: `null`/empty clears, numbers become
    /// `Number`, anything else is `Text`.
    pub fn parse_loose(raw: &str) -> InputValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return InputValue::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => InputValue::Number(n),
            _ => InputValue::Text(trimmed.to_string()),
        }
    }

    /// Loose equality used by visibility predicates: numbers compare by value,
    /// text compares exactly, and a numeric input matches its textual form
    /// (`10` matches `"10"`).
    pub fn matches(&self, other: &InputValue) -> bool {
        match (self, other) {
            (InputValue::Number(a), InputValue::Number(b)) => (a - b).abs() < f64::EPSILON,
            (InputValue::Text(a), InputValue::Text(b)) => a == b,
            (InputValue::Number(n), InputValue::Text(t)) | (InputValue::Text(t), InputValue::Number(n)) => {
                t.parse::<f64>().map(|v| (v - n).abs() < f64::EPSILON).unwrap_or(false)
            }
            (InputValue::Null, InputValue::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Null => f.write_str("null"),
            InputValue::Number(n) => write!(f, "{n}"),
            InputValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<i64> for InputValue {
    fn from(n: i64) -> Self {
        InputValue::Number(n as f64)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

impl<T: Into<InputValue>> From<Option<T>> for InputValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(InputValue::Null)
    }
}

/// Current values of a calculator's inputs.
///
/// Typed accessors return `CalcError` for missing or malformed values, so
/// evaluators can use `?` and let the engine turn the failure into an
/// invalid result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSnapshot {
    values: BTreeMap<String, InputValue>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    ///
    /// ```rust
    /// use kalc_core::inputs::InputSnapshot;
    ///
    /// let inputs = InputSnapshot::new()
    ///     .with("mode", "whatIsXPercentOfY")
    ///     .with("percentValue", 25.0)
    ///     .with("ofValue", 120.0);
    /// assert_eq!(inputs.number("ofValue").unwrap(), 120.0);
    /// ```
    pub fn with(mut self, id: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<InputValue>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&InputValue> {
        self.values.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay every value from `other` on top of this snapshot.
    pub fn merge(&mut self, other: &InputSnapshot) {
        for (id, value) in &other.values {
            self.values.insert(id.clone(), value.clone());
        }
    }

    /// Required finite number. Numeric text (`"12.5"`) is accepted.
    pub fn number(&self, id: &str) -> CalcResult<f64> {
        match self.values.get(id) {
            None | Some(InputValue::Null) => Err(CalcError::missing_field(id)),
            Some(InputValue::Number(n)) if n.is_finite() => Ok(*n),
            Some(InputValue::Number(n)) => Err(CalcError::invalid_input(id, n.to_string(), "Value must be finite")),
            Some(InputValue::Text(t)) => t
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| CalcError::invalid_input(id, t.clone(), "Expected a number")),
        }
    }

    /// Optional number: `Ok(None)` when missing or null.
    pub fn optional_number(&self, id: &str) -> CalcResult<Option<f64>> {
        match self.values.get(id) {
            None | Some(InputValue::Null) => Ok(None),
            Some(_) => self.number(id).map(Some),
        }
    }

    /// Required number that must be strictly positive.
    pub fn positive(&self, id: &str) -> CalcResult<f64> {
        let n = self.number(id)?;
        if n <= 0.0 {
            return Err(CalcError::invalid_input(id, n.to_string(), "Value must be positive"));
        }
        Ok(n)
    }

    /// Required number that must be zero or greater.
    pub fn non_negative(&self, id: &str) -> CalcResult<f64> {
        let n = self.number(id)?;
        if n < 0.0 {
            return Err(CalcError::invalid_input(id, n.to_string(), "Value cannot be negative"));
        }
        Ok(n)
    }

    /// Required whole number.
    pub fn integer(&self, id: &str) -> CalcResult<i64> {
        let n = self.number(id)?;
        if n.fract() != 0.0 || n.abs() > i64::MAX as f64 / 2.0 {
            return Err(CalcError::invalid_input(id, n.to_string(), "Expected a whole number"));
        }
        Ok(n as i64)
    }

    /// Required text value (select options, free text). Numbers are rendered
    /// to text so numeric select options like `"10"` work either way.
    pub fn text(&self, id: &str) -> CalcResult<String> {
        match self.values.get(id) {
            None | Some(InputValue::Null) => Err(CalcError::missing_field(id)),
            Some(InputValue::Text(t)) if t.trim().is_empty() => Err(CalcError::missing_field(id)),
            Some(InputValue::Text(t)) => Ok(t.trim().to_string()),
            Some(InputValue::Number(n)) => Ok(n.to_string()),
        }
    }

    /// Parse a text input into an enum discriminant.
    pub fn choice<T>(&self, id: &str) -> CalcResult<T>
    where
        T: std::str::FromStr,
    {
        let raw = self.text(id)?;
        raw.parse::<T>()
            .map_err(|_| CalcError::invalid_input(id, raw.clone(), "Unknown option"))
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for InputSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = InputSnapshot::new();
        for (k, v) in iter {
            snapshot.set(k, v);
        }
        snapshot
    }
}
