//! # Calculator Config Schema
//!
//! The declarative half of a calculator unit: identity, presets, localized
//! text, input fields, result fields and references. Configs are authored as
//! TOML under `catalog/units/` and are immutable once loaded.
//!
//! ## Structure
//!
//! ```text
//! CalculatorConfig
//! ├── id, category, icon
//! ├── presets: Vec<Preset>            named input snapshots
//! ├── inputs: Vec<InputField>         field schema + visibility predicates
//! ├── results: Vec<ResultField>       output ids, roles, formats
//! ├── references: Vec<Reference>      bibliography
//! └── t: Locale -> LocalizedContent   labels, help, FAQ, SEO, cards
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::inputs::{InputSnapshot, InputValue};
use crate::locale::{locale_map, Locale};

// ============================================================================
// Categories
// ============================================================================

/// Catalog section a calculator is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Finance,
    Health,
    Math,
    Conversion,
    Everyday,
    Technology,
    Home,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Finance,
        Category::Health,
        Category::Math,
        Category::Conversion,
        Category::Everyday,
        Category::Technology,
        Category::Home,
    ];

    /// Machine key, as used in catalog files
    pub fn key(&self) -> &'static str {
        match self {
            Category::Finance => "finance",
            Category::Health => "health",
            Category::Math => "math",
            Category::Conversion => "conversion",
            Category::Everyday => "everyday",
            Category::Technology => "technology",
            Category::Home => "home",
        }
    }

    /// English display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Finance => "Finance",
            Category::Health => "Health",
            Category::Math => "Math",
            Category::Conversion => "Conversion",
            Category::Everyday => "Everyday",
            Category::Technology => "Technology",
            Category::Home => "Home",
        }
    }

    /// Listing order (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            Category::Finance => 1,
            Category::Health => 2,
            Category::Math => 3,
            Category::Conversion => 4,
            Category::Everyday => 5,
            Category::Technology => 6,
            Category::Home => 7,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("category", s, "Unknown category"))
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// What kind of control an input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Number,
    Select,
    Text,
    Date,
}

/// Visibility predicate: the field is shown only while `field` currently
/// holds one of `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWhen {
    pub field: String,
    pub equals: Vec<InputValue>,
}

impl ShowWhen {
    pub fn is_satisfied(&self, inputs: &InputSnapshot) -> bool {
        let current = inputs.get(&self.field).cloned().unwrap_or_default();
        self.equals.iter().any(|v| v.matches(&current))
    }

    /// True if no snapshot can satisfy both predicates.
    pub fn is_disjoint(&self, other: &ShowWhen) -> bool {
        self.field == other.field && !self.equals.iter().any(|a| other.equals.iter().any(|b| a.matches(b)))
    }
}

/// One input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub id: String,
    pub kind: InputKind,
    #[serde(default)]
    pub default: InputValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Unit label shown next to the control (e.g. "kg", "TB")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Allowed values for `select` inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Optional inputs may stay null without invalidating the result
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

fn default_required() -> bool {
    true
}

// ============================================================================
// Results
// ============================================================================

/// How prominently a result is displayed. Ordered primary first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultRole {
    Primary,
    Secondary,
    Detail,
}

/// Display format of a result.
///
/// The engine rejects an evaluation that emits a result in any other format
/// than the one declared for it. Exporters render the raw value by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Number,
    Integer,
    Percent,
    Currency,
    Text,
    Fraction,
    Date,
}

/// One declared output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultField {
    pub id: String,
    pub role: ResultRole,
    pub format: ResultFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

// ============================================================================
// Presets, references, localized content
// ============================================================================

/// A named quick-start input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub values: InputSnapshot,
}

/// Bibliographic reference backing a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoCard {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationSection {
    pub title: String,
    pub body: String,
}

/// Everything user-visible for one locale.
///
/// `messages` holds dotted keys: `inputs.<id>`, `inputs.<id>.help`,
/// `options.<input>.<value>`, `results.<id>`, `presets.<name>`, `summary.*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedContent {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub seo: Seo,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub info_cards: Vec<InfoCard>,
    #[serde(default)]
    pub education: Vec<EducationSection>,
}

// ============================================================================
// Calculator Config
// ============================================================================

/// Declarative definition of one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub id: String,
    pub category: Category,
    pub icon: String,
    #[serde(default)]
    pub presets: Vec<Preset>,
    pub inputs: Vec<InputField>,
    pub results: Vec<ResultField>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(with = "locale_map")]
    pub t: BTreeMap<Locale, LocalizedContent>,
}

impl CalculatorConfig {
    /// Parse a unit definition from TOML.
    pub fn from_toml(source: &str) -> CalcResult<Self> {
        toml::from_str(source).map_err(|e| CalcError::serialization(e.to_string()))
    }

    pub fn input(&self, id: &str) -> Option<&InputField> {
        self.inputs.iter().find(|f| f.id == id)
    }

    pub fn result(&self, id: &str) -> Option<&ResultField> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Localized bundle for `locale`, if the unit ships one.
    pub fn content(&self, locale: Locale) -> Option<&LocalizedContent> {
        self.t.get(&locale)
    }

    /// Snapshot holding every input's default value.
    pub fn default_snapshot(&self) -> InputSnapshot {
        self.inputs
            .iter()
            .map(|f| (f.id.clone(), f.default.clone()))
            .collect()
    }

    /// Defaults overlaid with the named preset.
    pub fn preset_snapshot(&self, name: &str) -> CalcResult<InputSnapshot> {
        let preset = self
            .preset(name)
            .ok_or_else(|| CalcError::invalid_input("preset", name, format!("No such preset in '{}'", self.id)))?;
        let mut snapshot = self.default_snapshot();
        snapshot.merge(&preset.values);
        Ok(snapshot)
    }

    pub fn is_input_visible(&self, field: &InputField, inputs: &InputSnapshot) -> bool {
        field.show_when.as_ref().map_or(true, |w| w.is_satisfied(inputs))
    }

    pub fn visible_inputs<'a>(&'a self, inputs: &'a InputSnapshot) -> impl Iterator<Item = &'a InputField> + 'a {
        self.inputs.iter().filter(move |f| self.is_input_visible(f, inputs))
    }

    pub fn visible_results<'a>(&'a self, inputs: &'a InputSnapshot) -> impl Iterator<Item = &'a ResultField> + 'a {
        self.results
            .iter()
            .filter(move |r| r.show_when.as_ref().map_or(true, |w| w.is_satisfied(inputs)))
    }

    /// Schema-level check that runs before any evaluation: visible required
    /// inputs must be present and within bounds, selects must hold a listed
    /// option.
    pub fn check_inputs(&self, inputs: &InputSnapshot) -> CalcResult<()> {
        for field in self.visible_inputs(inputs) {
            let value = inputs.get(&field.id).cloned().unwrap_or_default();
            if value.is_null() {
                if field.required {
                    return Err(CalcError::missing_field(&field.id));
                }
                continue;
            }
            match field.kind {
                InputKind::Number => {
                    let n = inputs.number(&field.id)?;
                    if let Some(min) = field.min {
                        if n < min {
                            return Err(CalcError::invalid_input(&field.id, n.to_string(), format!("Below minimum {min}")));
                        }
                    }
                    if let Some(max) = field.max {
                        if n > max {
                            return Err(CalcError::invalid_input(&field.id, n.to_string(), format!("Above maximum {max}")));
                        }
                    }
                }
                InputKind::Select => {
                    let raw = inputs.text(&field.id)?;
                    if !field.options.iter().any(|o| *o == raw) {
                        return Err(CalcError::invalid_input(&field.id, raw, "Not one of the listed options"));
                    }
                }
                InputKind::Text | InputKind::Date => {}
            }
        }
        Ok(())
    }

    /// Every schema invariant this config breaks, as readable messages.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let mut input_ids = BTreeSet::new();
        for field in &self.inputs {
            if !input_ids.insert(field.id.as_str()) {
                problems.push(format!("duplicate input id '{}'", field.id));
            }
        }
        // A result id may repeat only as per-mode variants that are never
        // visible together.
        for (i, result) in self.results.iter().enumerate() {
            for earlier in &self.results[..i] {
                if earlier.id != result.id {
                    continue;
                }
                let exclusive = match (&earlier.show_when, &result.show_when) {
                    (Some(a), Some(b)) => a.is_disjoint(b),
                    _ => false,
                };
                if !exclusive {
                    problems.push(format!("duplicate result id '{}'", result.id));
                }
            }
        }

        let check_predicate = |owner: &str, when: &ShowWhen, problems: &mut Vec<String>| {
            if when.field == owner {
                problems.push(format!("'{owner}' has a show_when on itself"));
            }
            match self.input(&when.field) {
                None => problems.push(format!("'{owner}' show_when references unknown input '{}'", when.field)),
                Some(target) if target.kind == InputKind::Select => {
                    for value in &when.equals {
                        if !target.options.iter().any(|o| value.matches(&InputValue::Text(o.clone()))) {
                            problems.push(format!(
                                "'{owner}' show_when value '{value}' is not an option of '{}'",
                                when.field
                            ));
                        }
                    }
                }
                Some(_) => {}
            }
            if when.equals.is_empty() {
                problems.push(format!("'{owner}' show_when lists no values"));
            }
        };

        for field in &self.inputs {
            if let Some(when) = &field.show_when {
                check_predicate(&field.id, when, &mut problems);
            }
            match field.kind {
                InputKind::Select => {
                    if field.options.is_empty() {
                        problems.push(format!("select '{}' has no options", field.id));
                    }
                    if let Some(default) = field.default.as_text() {
                        if !field.options.iter().any(|o| o == default) {
                            problems.push(format!("select '{}' default '{default}' is not an option", field.id));
                        }
                    }
                }
                InputKind::Number => {
                    if let (Some(min), Some(max)) = (field.min, field.max) {
                        if min > max {
                            problems.push(format!("input '{}' has min > max", field.id));
                        }
                    }
                    if let Some(n) = field.default.as_number() {
                        if field.min.is_some_and(|min| n < min) || field.max.is_some_and(|max| n > max) {
                            problems.push(format!("input '{}' default {n} is out of bounds", field.id));
                        }
                    } else if field.default.as_text().is_some() {
                        problems.push(format!("number input '{}' has a text default", field.id));
                    }
                }
                InputKind::Text | InputKind::Date => {}
            }
        }
        for result in &self.results {
            if let Some(when) = &result.show_when {
                check_predicate(&result.id, when, &mut problems);
            }
        }

        let mut preset_names = BTreeSet::new();
        for preset in &self.presets {
            if !preset_names.insert(preset.name.as_str()) {
                problems.push(format!("duplicate preset '{}'", preset.name));
            }
            for (key, _) in preset.values.iter() {
                if self.input(key).is_none() {
                    problems.push(format!("preset '{}' sets unknown input '{key}'", preset.name));
                }
            }
        }

        if !self.t.contains_key(&Locale::FALLBACK) {
            problems.push(format!("missing '{}' content bundle", Locale::FALLBACK));
        }
        for (locale, content) in &self.t {
            if content.name.trim().is_empty() {
                problems.push(format!("'{locale}' bundle has an empty name"));
            }
        }

        problems
    }

    /// Fail with every broken invariant if there are any.
    pub fn validate(&self) -> CalcResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CalcError::invalid_config(&self.id, problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
id = "sample"
category = "math"
icon = "calculator"

[[presets]]
name = "basic"
[presets.values]
mode = "double"
x = 4

[[inputs]]
id = "mode"
kind = "select"
default = "double"
options = ["double", "half"]

[[inputs]]
id = "x"
kind = "number"
default = 1
min = 0
max = 100
show_when = { field = "mode", equals = ["double"] }

[[inputs]]
id = "y"
kind = "number"
default = 2
show_when = { field = "mode", equals = ["half"] }

[[results]]
id = "answer"
role = "primary"
format = "number"

[t.en]
name = "Sample"
description = "A sample calculator"

[t.en.messages]
"inputs.x" = "X"
"#;

    fn sample() -> CalculatorConfig {
        CalculatorConfig::from_toml(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = sample();
        assert_eq!(config.id, "sample");
        assert_eq!(config.category, Category::Math);
        assert_eq!(config.inputs.len(), 3);
        assert_eq!(config.input("x").unwrap().default, InputValue::Number(1.0));
        assert!(config.content(Locale::En).is_some());
        assert!(config.content(Locale::Es).is_none());
        assert!(config.validate().is_ok(), "{:?}", config.problems());
    }

    #[test]
    fn test_visibility() {
        let config = sample();
        let inputs = config.default_snapshot();
        let visible: Vec<_> = config.visible_inputs(&inputs).map(|f| f.id.as_str()).collect();
        assert_eq!(visible, vec!["mode", "x"]);

        let inputs = inputs.with("mode", "half");
        let visible: Vec<_> = config.visible_inputs(&inputs).map(|f| f.id.as_str()).collect();
        assert_eq!(visible, vec!["mode", "y"]);
    }

    #[test]
    fn test_preset_snapshot() {
        let config = sample();
        let snapshot = config.preset_snapshot("basic").unwrap();
        assert_eq!(snapshot.number("x").unwrap(), 4.0);
        assert_eq!(snapshot.number("y").unwrap(), 2.0);
        assert!(config.preset_snapshot("nope").is_err());
    }

    #[test]
    fn test_check_inputs() {
        let config = sample();
        assert!(config.check_inputs(&config.default_snapshot()).is_ok());

        // Hidden inputs are not checked
        let inputs = config.default_snapshot().with("y", InputValue::Null);
        assert!(config.check_inputs(&inputs).is_ok());

        let inputs = config.default_snapshot().with("x", InputValue::Null);
        assert_eq!(config.check_inputs(&inputs), Err(CalcError::missing_field("x")));

        let inputs = config.default_snapshot().with("x", 500.0);
        assert!(config.check_inputs(&inputs).is_err());

        let inputs = config.default_snapshot().with("mode", "triple");
        assert!(config.check_inputs(&inputs).is_err());
    }

    #[test]
    fn test_unknown_show_when_field() {
        let mut config = sample();
        config.inputs[1].show_when = Some(ShowWhen {
            field: "missing".to_string(),
            equals: vec![InputValue::from("double")],
        });
        let problems = config.problems();
        assert!(problems.iter().any(|p| p.contains("unknown input 'missing'")));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_preset_and_default() {
        let mut config = sample();
        config.presets[0].values.set("zzz", 1.0);
        config.inputs[1].default = InputValue::Number(1000.0);
        let problems = config.problems();
        assert!(problems.iter().any(|p| p.contains("unknown input 'zzz'")));
        assert!(problems.iter().any(|p| p.contains("out of bounds")));
    }

    #[test]
    fn test_result_id_may_repeat_per_mode() {
        let mut config = sample();
        fn variant(format: ResultFormat, modes: &[&str]) -> ResultField {
            ResultField {
                id: "answer".to_string(),
                role: ResultRole::Primary,
                format,
                unit: None,
                show_when: Some(ShowWhen {
                    field: "mode".to_string(),
                    equals: modes.iter().map(|m| InputValue::from(*m)).collect(),
                }),
            }
        }
        config.results = vec![variant(ResultFormat::Number, &["double"]), variant(ResultFormat::Percent, &["half"])];
        assert!(config.problems().is_empty(), "{:?}", config.problems());

        let inputs = config.default_snapshot().with("mode", "half");
        let visible: Vec<_> = config.visible_results(&inputs).map(|r| r.format).collect();
        assert_eq!(visible, vec![ResultFormat::Percent]);

        // Overlapping variants would both be visible in "half"
        config.results[0] = variant(ResultFormat::Number, &["double", "half"]);
        assert!(config.problems().iter().any(|p| p.contains("duplicate result id 'answer'")));

        config.results[0].show_when = None;
        assert!(config.problems().iter().any(|p| p.contains("duplicate result id 'answer'")));
    }

    #[test]
    fn test_missing_fallback_bundle() {
        let mut config = sample();
        let en = config.t.remove(&Locale::En).unwrap();
        config.t.insert(Locale::Es, en);
        assert!(config.problems().iter().any(|p| p.contains("missing 'en'")));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Technology".parse::<Category>().unwrap(), Category::Technology);
        assert!("gardening".parse::<Category>().is_err());
    }
}
