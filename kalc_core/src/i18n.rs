//! # Translation Lookup
//!
//! Resolves message keys for one calculator in one locale. Lookups return an
//! explicit `Option`; the only fallback policy lives in [`Translator::text`]:
//! active locale, then English, then a label derived from the key itself.
//!
//! ```rust
//! use kalc_core::catalog::Catalog;
//! use kalc_core::i18n::Translator;
//! use kalc_core::locale::Locale;
//!
//! let catalog = Catalog::embedded().unwrap();
//! let config = catalog.config("bmi").unwrap();
//! let t = Translator::new(config, Locale::Es);
//! assert_eq!(t.get("no.such.key"), None);
//! assert_eq!(t.text("no.such.key"), "Key");
//! ```

use crate::locale::Locale;
use crate::schema::{CalculatorConfig, LocalizedContent};

/// Message resolver bound to one config and locale.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    config: &'a CalculatorConfig,
    locale: Locale,
}

impl<'a> Translator<'a> {
    pub fn new(config: &'a CalculatorConfig, locale: Locale) -> Self {
        Translator { config, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Bundle for the active locale, falling back to English.
    pub fn content(&self) -> Option<&'a LocalizedContent> {
        self.config
            .content(self.locale)
            .or_else(|| self.config.content(Locale::FALLBACK))
    }

    /// True if the active locale ships its own bundle.
    pub fn is_native(&self) -> bool {
        self.config.content(self.locale).is_some()
    }

    /// Message for `key` in the active locale or English, if any.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        let lookup = |locale: Locale| {
            self.config
                .content(locale)
                .and_then(|c| c.messages.get(key))
                .map(String::as_str)
        };
        lookup(self.locale).or_else(|| lookup(Locale::FALLBACK))
    }

    /// Message for `key`, or a label derived from the key's last segment.
    pub fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(s) => s.to_string(),
            None => humanize_key(key),
        }
    }

    /// Message template for `key` with `{name}` placeholders filled in.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        fill_placeholders(&self.text(key), args)
    }

    /// Localized calculator name.
    pub fn name(&self) -> String {
        self.content()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| humanize_key(&self.config.id))
    }

    /// Localized label of a select option.
    pub fn option(&self, input: &str, value: &str) -> String {
        self.text(&format!("options.{input}.{value}"))
    }

    pub fn input_label(&self, input: &str) -> String {
        self.text(&format!("inputs.{input}"))
    }

    pub fn result_label(&self, result: &str) -> String {
        self.text(&format!("results.{result}"))
    }
}

/// Replace each `{name}` in `template` with its value.
pub fn fill_placeholders(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Derive a readable label from a message key: `inputs.driveCount` -> `Drive count`.
pub fn humanize_key(key: &str) -> String {
    let last = key.rsplit('.').next().unwrap_or(key);
    let mut words = String::with_capacity(last.len() + 4);
    for (i, ch) in last.chars().enumerate() {
        if ch == '-' || ch == '_' {
            words.push(' ');
        } else if ch.is_uppercase() && i > 0 {
            words.push(' ');
            words.extend(ch.to_lowercase());
        } else {
            words.push(ch);
        }
    }
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
