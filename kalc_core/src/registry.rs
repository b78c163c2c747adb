//! # Calculator Registry
//!
//! `catalog/registry.toml` lists every calculator's id, category, active flag
//! and localized URL slug. It is the single source of truth for routing; all
//! derived artifacts are regenerated from it (see [`crate::codegen`]).
//!
//! ## File Format
//!
//! ```toml
//! [[calculator]]
//! id = "bmi"
//! category = "health"
//! active = true
//! [calculator.slugs]
//! en = "bmi-calculator"
//! es = "calculadora-imc"
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::locale::{locale_map, Locale};
use crate::schema::{CalculatorConfig, Category};

/// Routing record for one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub category: Category,
    /// Inactive calculators stay in the registry but are not routable
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(with = "locale_map")]
    pub slugs: BTreeMap<Locale, String>,
}

fn default_active() -> bool {
    true
}

impl RegistryEntry {
    /// Entry for a new calculator with slugs derived from its localized names.
    ///
    /// Locales without a bundle reuse the English name, so every locale gets
    /// a slug.
    pub fn derived_from(config: &CalculatorConfig) -> Self {
        let english = config
            .content(Locale::FALLBACK)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| config.id.clone());
        let slugs = Locale::ALL
            .iter()
            .map(|locale| {
                let name = config.content(*locale).map(|c| c.name.as_str()).unwrap_or(&english);
                (*locale, slugify(name))
            })
            .collect();
        RegistryEntry {
            id: config.id.clone(),
            category: config.category,
            active: true,
            slugs,
        }
    }

    pub fn slug(&self, locale: Locale) -> Option<&str> {
        self.slugs.get(&locale).map(String::as_str)
    }

    /// Localized URL path, e.g. `/es/calculadora-imc`.
    pub fn path(&self, locale: Locale) -> Option<String> {
        self.slug(locale).map(|slug| format!("/{}/{}", locale.code(), slug))
    }
}

/// The full registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default, rename = "calculator")]
    pub entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn from_toml(source: &str) -> CalcResult<Self> {
        toml::from_str(source).map_err(|e| CalcError::serialization(format!("registry.toml: {e}")))
    }

    /// Serialize back to TOML, entries sorted by id.
    pub fn to_toml(&self) -> CalcResult<String> {
        let mut sorted = self.clone();
        sorted.entries.sort_by(|a, b| a.id.cmp(&b.id));
        let body = toml::to_string_pretty(&sorted).map_err(|e| CalcError::serialization(e.to_string()))?;
        Ok(format!(
            "# Calculator registry: id, category, active flag and localized slugs.\n\
             # Derived files are regenerated from this with `kalcufy sync`.\n\n{body}"
        ))
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Entries that are publicly routable, sorted by id.
    pub fn active(&self) -> Vec<&RegistryEntry> {
        let mut active: Vec<_> = self.entries.iter().filter(|e| e.active).collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    /// Find the entry routed at `slug` for `locale`.
    pub fn find_by_slug(&self, locale: Locale, slug: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.active && e.slug(locale) == Some(slug))
    }

    /// Add an entry; refuses duplicates.
    pub fn insert(&mut self, entry: RegistryEntry) -> CalcResult<()> {
        if self.contains(&entry.id) {
            return Err(CalcError::registry_mismatch(&entry.id, "already registered"));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Structural problems that do not need the unit sources: duplicate ids,
    /// missing or malformed slugs, slug collisions.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut ids = BTreeSet::new();
        let mut seen_slugs: BTreeMap<(Locale, &str), &str> = BTreeMap::new();

        for entry in &self.entries {
            if !ids.insert(entry.id.as_str()) {
                problems.push(format!("duplicate registry id '{}'", entry.id));
            }
            if !entry.active {
                continue;
            }
            for locale in Locale::ALL {
                match entry.slug(locale) {
                    None => problems.push(format!("'{}' has no '{locale}' slug", entry.id)),
                    Some(slug) if !is_valid_slug(slug) => {
                        problems.push(format!("'{}' has malformed '{locale}' slug '{slug}'", entry.id))
                    }
                    Some(slug) => {
                        if let Some(other) = seen_slugs.insert((locale, slug), entry.id.as_str()) {
                            problems.push(format!(
                                "'{locale}' slug '{slug}' is used by both '{other}' and '{}'",
                                entry.id
                            ));
                        }
                    }
                }
            }
        }
        problems
    }
}

/// Lowercase kebab-case ASCII.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Turn a display name into a URL slug: `Calculadora de Propina` ->
/// `calculadora-de-propina`. Common Latin diacritics are folded to ASCII.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        let folded = fold_diacritic(ch.to_lowercase().next().unwrap_or(ch));
        if folded.is_ascii_alphanumeric() {
            slug.push(folded);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ß' => 's',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[calculator]]
id = "tip"
category = "everyday"
[calculator.slugs]
en = "tip-calculator"
es = "calculadora-de-propina"
pt = "calculadora-de-gorjeta"
fr = "calculateur-de-pourboire"
de = "trinkgeldrechner"

[[calculator]]
id = "old"
category = "math"
active = false
[calculator.slugs]
en = "old"
"#;

    #[test]
    fn test_parse_registry() {
        let registry = Registry::from_toml(SAMPLE).unwrap();
        assert_eq!(registry.entries.len(), 2);
        let tip = registry.get("tip").unwrap();
        assert!(tip.active);
        assert_eq!(tip.path(Locale::Es).unwrap(), "/es/calculadora-de-propina");
        assert_eq!(registry.active().len(), 1);
        assert!(registry.problems().is_empty(), "{:?}", registry.problems());
    }

    #[test]
    fn test_find_by_slug_ignores_inactive() {
        let registry = Registry::from_toml(SAMPLE).unwrap();
        assert_eq!(registry.find_by_slug(Locale::De, "trinkgeldrechner").unwrap().id, "tip");
        assert!(registry.find_by_slug(Locale::En, "old").is_none());
    }

    #[test]
    fn test_slug_collision_detected() {
        let mut registry = Registry::from_toml(SAMPLE).unwrap();
        let mut clone = registry.get("tip").unwrap().clone();
        clone.id = "tip2".to_string();
        registry.insert(clone).unwrap();
        let problems = registry.problems();
        assert!(problems.iter().any(|p| p.contains("used by both 'tip' and 'tip2'")));
    }

    #[test]
    fn test_insert_refuses_duplicates() {
        let mut registry = Registry::from_toml(SAMPLE).unwrap();
        let tip = registry.get("tip").unwrap().clone();
        assert!(registry.insert(tip).is_err());
    }

    #[test]
    fn test_toml_roundtrip_sorted() {
        let registry = Registry::from_toml(SAMPLE).unwrap();
        let text = registry.to_toml().unwrap();
        let reparsed = Registry::from_toml(&text).unwrap();
        assert_eq!(reparsed.entries[0].id, "old");
        assert_eq!(reparsed.get("tip"), registry.get("tip"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Calculadora de Propina"), "calculadora-de-propina");
        assert_eq!(slugify("Calculadora de Índice de Masa Corporal (IMC)"), "calculadora-de-indice-de-masa-corporal-imc");
        assert_eq!(slugify("  RAID -- Rechner "), "raid-rechner");
        assert!(is_valid_slug(&slugify("Größe")));
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("bmi-calculator"));
        assert!(!is_valid_slug("BMI"));
        assert!(!is_valid_slug("-bmi"));
        assert!(!is_valid_slug("bmi--calc"));
        assert!(!is_valid_slug(""));
    }
}
