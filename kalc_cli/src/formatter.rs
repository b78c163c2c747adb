//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use kalc_core::codegen::{Drift, DriftKind, WriteReport};
use kalc_core::i18n::Translator;
use kalc_core::inputs::{InputSnapshot, InputValue};
use kalc_core::registry::RegistryEntry;
use kalc_core::schema::{CalculatorConfig, InputField, InputKind};
use kalc_core::{CalculatorResults, Locale};

/// One row per calculator: id, category, localized name and path.
pub fn format_list(rows: &[(&RegistryEntry, &CalculatorConfig)], locale: Locale) -> String {
    let mut out = String::new();
    let id_width = rows.iter().map(|(e, _)| e.id.len()).max().unwrap_or(0);
    let names: Vec<String> = rows
        .iter()
        .map(|(_, config)| Translator::new(config, locale).name())
        .collect();
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

    for ((entry, _), name) in rows.iter().zip(&names) {
        let path = entry.path(locale).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<11}  {:<name_width$}  {}",
            entry.id,
            entry.category.key(),
            name,
            path
        );
    }
    let _ = writeln!(out, "\n{} calculator(s)", rows.len());
    out
}

/// Schema, presets and FAQ of one calculator.
pub fn format_config(config: &CalculatorConfig, entry: Option<&RegistryEntry>, locale: Locale) -> String {
    let t = Translator::new(config, locale);
    let mut out = String::new();

    let _ = writeln!(out, "{}", t.name());
    let _ = writeln!(out, "{}", "=".repeat(t.name().chars().count()));
    if let Some(content) = t.content() {
        let _ = writeln!(out, "{}", content.description);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "id:       {}", config.id);
    let _ = writeln!(out, "category: {}", config.category.key());
    if let Some(path) = entry.and_then(|e| e.path(locale)) {
        let _ = writeln!(out, "path:     {path}");
    }
    if !t.is_native() {
        let _ = writeln!(out, "note:     no {} translation, showing English", locale.native_name());
    }

    let _ = writeln!(out, "\nInputs:");
    for field in &config.inputs {
        let _ = writeln!(out, "  {:<20} {}", field.id, describe_input(field, &t));
    }

    let _ = writeln!(out, "\nResults:");
    for field in &config.results {
        let label = t.result_label(&field.id);
        let unit = field.unit.as_deref().map(|u| format!(" [{u}]")).unwrap_or_default();
        let mut parts = vec![format!("{:?}", field.format).to_lowercase(), format!("{:?}", field.role).to_lowercase()];
        if let Some(show) = &field.show_when {
            let values: Vec<String> = show.equals.iter().map(InputValue::to_string).collect();
            parts.push(format!("when {}={}", show.field, values.join("|")));
        }
        let _ = writeln!(out, "  {:<20} {label}{unit}; {}", field.id, parts.join("; "));
    }

    if !config.presets.is_empty() {
        let _ = writeln!(out, "\nPresets:");
        for preset in &config.presets {
            let values: Vec<String> = preset.values.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let _ = writeln!(out, "  {:<20} {}", preset.name, values.join(" "));
        }
    }

    if let Some(content) = t.content() {
        if !content.faqs.is_empty() {
            let _ = writeln!(out, "\nFAQ:");
            for faq in &content.faqs {
                let _ = writeln!(out, "  Q: {}", faq.question);
                let _ = writeln!(out, "  A: {}\n", faq.answer);
            }
        }
    }
    out
}

fn describe_input(field: &InputField, t: &Translator<'_>) -> String {
    let mut parts = vec![t.input_label(&field.id)];
    match field.kind {
        InputKind::Select => parts.push(format!("one of: {}", field.options.join(", "))),
        _ => {
            let range = match (field.min, field.max) {
                (Some(min), Some(max)) => Some(format!("{min}..{max}")),
                (Some(min), None) => Some(format!(">= {min}")),
                (None, Some(max)) => Some(format!("<= {max}")),
                (None, None) => None,
            };
            if let Some(range) = range {
                parts.push(range);
            }
        }
    }
    if let Some(unit) = &field.unit {
        parts.push(format!("[{unit}]"));
    }
    if !field.default.is_null() {
        parts.push(format!("default {}", field.default));
    }
    if !field.required {
        parts.push("optional".to_string());
    }
    if let Some(show) = &field.show_when {
        let values: Vec<String> = show.equals.iter().map(InputValue::to_string).collect();
        parts.push(format!("when {}={}", show.field, values.join("|")));
    }
    parts.join("; ")
}

/// Visible results with their labels, primary first, then the summary.
pub fn format_results(config: &CalculatorConfig, inputs: &InputSnapshot, results: &CalculatorResults, locale: Locale) -> String {
    let t = Translator::new(config, locale);
    let mut visible: Vec<_> = config.visible_results(inputs).collect();
    visible.sort_by_key(|field| field.role);
    let rows: Vec<(String, &str)> = visible
        .into_iter()
        .filter_map(|field| Some((t.result_label(&field.id), results.formatted(&field.id)?)))
        .collect();
    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{}", t.name());
    let _ = writeln!(out);
    for (label, value) in &rows {
        let pad = width - label.chars().count();
        let _ = writeln!(out, "  {label}{}  {value}", " ".repeat(pad));
    }
    if !results.summary.is_empty() {
        let _ = writeln!(out, "\n{}", results.summary);
    }
    out
}

pub fn format_write_report(report: &WriteReport, dir: &str) -> String {
    let mut out = String::new();
    for path in &report.written {
        let _ = writeln!(out, "  wrote {path}");
    }
    let _ = writeln!(
        out,
        "{} written, {} unchanged in {dir}",
        report.written.len(),
        report.unchanged.len()
    );
    out
}

pub fn format_drift(drift: &[Drift]) -> String {
    let mut out = String::new();
    for d in drift {
        let kind = match d.kind {
            DriftKind::Missing => "missing",
            DriftKind::Changed => "changed",
        };
        let _ = writeln!(out, "  {kind:<8} {}", d.path);
    }
    out
}
