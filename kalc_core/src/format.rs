//! # Number Formatting
//!
//! Locale-aware presentation of numeric results. Evaluators own formatting so
//! every consumer (terminal, CSV, PDF) shows the same strings.
//!
//! ```rust
//! use kalc_core::format::{format_fixed, format_trimmed};
//! use kalc_core::locale::Locale;
//!
//! assert_eq!(format_fixed(1234.5, 2, Locale::En), "1,234.50");
//! assert_eq!(format_trimmed(1234.5, 2, Locale::Es), "1.234,5");
//! ```

use chrono::NaiveDate;

use crate::locale::Locale;

/// Format with exactly `decimals` fractional digits and digit grouping.
pub fn format_fixed(value: f64, decimals: usize, locale: Locale) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let negative = value < 0.0 && raw.bytes().any(|b| b.is_ascii_digit() && b != b'0');

    let mut out = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale.thousands_separator()));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// Format with at most `max_decimals` fractional digits, dropping trailing zeros.
pub fn format_trimmed(value: f64, max_decimals: usize, locale: Locale) -> String {
    let fixed = format_fixed(value, max_decimals, locale);
    if max_decimals == 0 {
        return fixed;
    }
    let sep = locale.decimal_separator();
    let trimmed = fixed.trim_end_matches('0');
    trimmed.strip_suffix(sep).unwrap_or(trimmed).to_string()
}

/// Format a whole number (rounded) with grouping.
pub fn format_integer(value: f64, locale: Locale) -> String {
    format_fixed(value.round(), 0, locale)
}

/// Format a percentage with exactly `decimals` fractional digits, e.g. `84.00%`.
pub fn format_percent(value: f64, decimals: usize, locale: Locale) -> String {
    let number = format_fixed(value, decimals, locale);
    if locale.spaced_percent() {
        format!("{number} %")
    } else {
        format!("{number}%")
    }
}

/// Format a monetary amount with two decimals.
///
/// Amounts are unit-less in the catalog, so the symbol is always `$`; only
/// its placement and the separators follow the locale.
pub fn format_currency(value: f64, locale: Locale) -> String {
    let number = format_fixed(value.abs(), 2, locale);
    let sign = if value < 0.0 && number.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    match locale {
        Locale::En => format!("{sign}${number}"),
        _ => format!("{sign}{number} $"),
    }
}

/// Format a trimmed number followed by a unit suffix, e.g. `12 TB`.
pub fn format_with_unit(value: f64, max_decimals: usize, unit: &str, locale: Locale) -> String {
    format!("{} {}", format_trimmed(value, max_decimals, locale), unit)
}

/// Format a calendar date the way the locale writes it, e.g. `Mar 12, 2025`
/// or `12.03.2025`.
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    let pattern = match locale {
        Locale::En => "%b %-d, %Y",
        Locale::De => "%d.%m.%Y",
        Locale::Es | Locale::Pt | Locale::Fr => "%d/%m/%Y",
    };
    date.format(pattern).to_string()
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
