//! # Result Export
//!
//! A [`Report`] is one evaluated calculator flattened into labelled rows:
//! the visible inputs as entered and the visible results as displayed.
//! Results are listed primary first, keeping declaration order within a
//! role. CSV is rendered here; PDF rendering lives in [`crate::pdf`].
//!
//! ## CSV Layout
//!
//! ```text
//! section,id,label,value,formatted
//! input,weightKg,Weight,70,70 kg
//! result,bmi,Body mass index,22.857142857142858,22.9
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::format_trimmed;
use crate::i18n::Translator;
use crate::inputs::{InputSnapshot, InputValue};
use crate::locale::Locale;
use crate::results::{CalculatorResults, ResultValue};
use crate::schema::{CalculatorConfig, InputKind, ResultFormat, ResultRole};

/// One labelled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub label: String,
    /// Raw value, as a machine would read it
    pub value: String,
    /// Display string in the report locale
    pub formatted: String,
    /// Headline result, emphasized by renderers
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,
}

/// An evaluated calculator ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub calculator: String,
    pub title: String,
    pub locale: Locale,
    pub date: NaiveDate,
    pub inputs: Vec<ReportRow>,
    pub results: Vec<ReportRow>,
    pub summary: String,
}

impl Report {
    /// Flatten an evaluation. Invalid results cannot be exported.
    pub fn build(
        config: &CalculatorConfig,
        inputs: &InputSnapshot,
        results: &CalculatorResults,
        locale: Locale,
        date: NaiveDate,
    ) -> CalcResult<Self> {
        if !results.is_valid {
            return Err(CalcError::invalid_input(
                &config.id,
                "invalid",
                "Cannot export an invalid result; check the inputs",
            ));
        }
        let t = Translator::new(config, locale);

        let input_rows = config
            .visible_inputs(inputs)
            .map(|field| {
                let value = inputs.get(&field.id).cloned().unwrap_or_default();
                let formatted = match (&value, field.kind) {
                    (InputValue::Null, _) => String::new(),
                    (_, InputKind::Select) => t.option(&field.id, &value.to_string()),
                    (InputValue::Number(n), _) => {
                        let number = format_trimmed(*n, 6, locale);
                        match &field.unit {
                            Some(unit) => format!("{number} {unit}"),
                            None => number,
                        }
                    }
                    (InputValue::Text(s), _) => s.clone(),
                };
                let raw = match value {
                    InputValue::Null => String::new(),
                    other => other.to_string(),
                };
                ReportRow {
                    id: field.id.clone(),
                    label: t.input_label(&field.id),
                    value: raw,
                    formatted,
                    primary: false,
                }
            })
            .collect();

        let mut visible: Vec<_> = config.visible_results(inputs).collect();
        visible.sort_by_key(|field| field.role);
        let result_rows = visible
            .into_iter()
            .filter_map(|field| {
                let value = results.values.get(&field.id)?;
                Some(ReportRow {
                    id: field.id.clone(),
                    label: t.result_label(&field.id),
                    value: raw_value(value, field.format),
                    formatted: results.formatted(&field.id).unwrap_or_default().to_string(),
                    primary: field.role == ResultRole::Primary,
                })
            })
            .collect();

        Ok(Report {
            calculator: config.id.clone(),
            title: t.name(),
            locale,
            date,
            inputs: input_rows,
            results: result_rows,
            summary: results.summary.clone(),
        })
    }

    /// RFC 4180 CSV with a header row, CRLF line endings.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("section,id,label,value,formatted\r\n");
        let sections = [("input", &self.inputs), ("result", &self.results)];
        for (section, rows) in sections {
            for row in rows {
                let fields = [section, &row.id, &row.label, &row.value, &row.formatted];
                let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
                out.push_str(&line.join(","));
                out.push_str("\r\n");
            }
        }
        out
    }
}

/// Machine-readable rendering of a result value. Integer results drop the
/// fraction the evaluator may have carried before rounding for display.
fn raw_value(value: &ResultValue, format: ResultFormat) -> String {
    match (value, format) {
        (ResultValue::Number(n), ResultFormat::Integer) => format!("{}", n.round() as i64),
        (ResultValue::Number(n), _) => n.to_string(),
        (ResultValue::Text(s), _) => s.clone(),
    }
}

/// Quote a field when it holds a comma, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{day, run_in};
    use crate::catalog::Catalog;

    fn bmi_report(locale: Locale) -> Report {
        let config = Catalog::embedded().unwrap().config("bmi").unwrap();
        let mut inputs = config.default_snapshot();
        inputs.merge(
            &InputSnapshot::new()
                .with("unitSystem", "metric")
                .with("weightKg", 70.0)
                .with("heightCm", 175.0),
        );
        let results = run_in("bmi", inputs.clone(), locale);
        Report::build(config, &inputs, &results, locale, day()).unwrap()
    }

    #[test]
    fn test_report_rows_follow_visibility() {
        let report = bmi_report(Locale::En);
        let ids: Vec<&str> = report.inputs.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"weightKg"));
        assert!(!ids.contains(&"weightLb"));
        assert_eq!(report.title, "BMI Calculator");
        assert!(report.results.iter().any(|r| r.id == "bmi" && r.formatted == "22.9"));
    }

    #[test]
    fn test_results_are_listed_primary_first() {
        // Declared detail first, so the order has to come from the roles
        let mut config = Catalog::embedded().unwrap().config("raid").unwrap().clone();
        config.results.reverse();
        let inputs = config.default_snapshot();
        let results = run_in("raid", inputs.clone(), Locale::En);
        let report = Report::build(&config, &inputs, &results, Locale::En, day()).unwrap();

        let roles: Vec<ResultRole> = report
            .results
            .iter()
            .map(|row| config.results.iter().find(|f| f.id == row.id).unwrap().role)
            .collect();
        assert!(roles.windows(2).all(|w| w[0] <= w[1]), "{roles:?}");
        assert_eq!(report.results[0].id, "usableCapacity");
        assert!(report.results[0].primary);
        assert!(report.results.iter().filter(|r| r.primary).count() < report.results.len());
        assert!(report.inputs.iter().all(|r| !r.primary));
    }

    #[test]
    fn test_raw_value_follows_format() {
        let iops = ResultValue::Number(1234.6);
        assert_eq!(raw_value(&iops, ResultFormat::Integer), "1235");
        assert_eq!(raw_value(&iops, ResultFormat::Number), "1234.6");
        let letter = ResultValue::Text("B+".into());
        assert_eq!(raw_value(&letter, ResultFormat::Text), "B+");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = bmi_report(Locale::En).to_csv();
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some("section,id,label,value,formatted"));
        assert!(csv.contains("\r\nresult,bmi,"));
        assert!(csv.ends_with("\r\n"));
    }

    #[test]
    fn test_csv_quotes_locale_decimals() {
        let csv = bmi_report(Locale::Es).to_csv();
        // Spanish decimals use a comma, so the formatted field gets quoted
        assert!(csv.contains(",\"22,9\"\r\n"), "{csv}");
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_invalid_results_are_refused() {
        let config = Catalog::embedded().unwrap().config("bmi").unwrap();
        let inputs = config.default_snapshot();
        let err = Report::build(config, &inputs, &CalculatorResults::invalid(), Locale::En, day());
        assert!(err.is_err());
    }
}
