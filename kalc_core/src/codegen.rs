//! # Artifact Generation
//!
//! Everything the site consumes is derived from the catalog and regenerated
//! from scratch on every run:
//!
//! ```text
//! generated/
//! ├── registry.json              active entries: id, category, slugs
//! ├── calculators-config.json    per locale: slug, id, name, description, icon, category
//! ├── messages/<locale>.json     calculator names/descriptions, English stubs where missing
//! └── REGISTRY.md                human-readable catalog reference
//! ```
//!
//! Output is a pure function of the catalog (sorted maps, stable ordering),
//! so two runs over the same catalog produce identical bytes.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::errors::{CalcError, CalcResult};
use crate::file_io::{read_optional, write_atomic};
use crate::locale::Locale;
use crate::registry::RegistryEntry;
use crate::schema::{CalculatorConfig, Category};

pub const REGISTRY_JSON: &str = "registry.json";
pub const CONFIG_JSON: &str = "calculators-config.json";
pub const MESSAGES_DIR: &str = "messages";
pub const REGISTRY_MD: &str = "REGISTRY.md";

/// Rendered artifacts keyed by path relative to the output directory
/// (always `/`-separated).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedArtifacts {
    files: BTreeMap<String, String>,
}

impl GeneratedArtifacts {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Outcome of [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
}

/// How an on-disk artifact differs from what the catalog would generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    Missing,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub path: String,
    pub kind: DriftKind,
}

// ============================================================================
// JSON shapes
// ============================================================================

#[derive(Serialize)]
struct RegistryRow<'a> {
    id: &'a str,
    category: Category,
    slugs: BTreeMap<&'static str, &'a str>,
}

#[derive(Serialize)]
struct ConfigRow<'a> {
    slug: &'a str,
    id: &'a str,
    name: &'a str,
    description: &'a str,
    icon: &'a str,
    category: Category,
}

#[derive(Serialize)]
struct MessageBundle<'a> {
    calculators: BTreeMap<&'a str, CalculatorMessages<'a>>,
}

#[derive(Serialize)]
struct CalculatorMessages<'a> {
    name: &'a str,
    description: &'a str,
}

// ============================================================================
// Generation
// ============================================================================

/// Render every artifact for `catalog`.
///
/// Fails if an active registry entry has no unit config; run
/// [`Catalog::validate`] first for a full report.
pub fn generate(catalog: &Catalog) -> CalcResult<GeneratedArtifacts> {
    let active: Vec<(&RegistryEntry, &CalculatorConfig)> = catalog
        .registry
        .active()
        .into_iter()
        .map(|entry| {
            catalog
                .config(&entry.id)
                .map(|config| (entry, config))
                .map_err(|_| CalcError::registry_mismatch(&entry.id, "active entry has no unit file"))
        })
        .collect::<CalcResult<_>>()?;

    let mut files = BTreeMap::new();
    files.insert(REGISTRY_JSON.to_string(), registry_json(&active)?);
    files.insert(CONFIG_JSON.to_string(), config_json(&active)?);
    for locale in Locale::ALL {
        let (json, stubbed) = messages_json(&active, locale)?;
        if stubbed > 0 {
            debug!(locale = %locale, stubbed, "stubbed missing translations with English text");
        }
        files.insert(format!("{MESSAGES_DIR}/{}.json", locale.code()), json);
    }
    files.insert(REGISTRY_MD.to_string(), registry_markdown(catalog, &active));

    info!(files = files.len(), calculators = active.len(), "artifacts generated");
    Ok(GeneratedArtifacts { files })
}

/// Localized name and description, falling back to English.
fn localized(config: &CalculatorConfig, locale: Locale) -> Option<(&str, &str, bool)> {
    if let Some(content) = config.content(locale) {
        return Some((content.name.as_str(), content.description.as_str(), false));
    }
    config
        .content(Locale::FALLBACK)
        .map(|content| (content.name.as_str(), content.description.as_str(), true))
}

fn to_json<T: Serialize>(value: &T) -> CalcResult<String> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| CalcError::serialization(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

fn registry_json(active: &[(&RegistryEntry, &CalculatorConfig)]) -> CalcResult<String> {
    let rows: Vec<RegistryRow<'_>> = active
        .iter()
        .map(|(entry, _)| RegistryRow {
            id: &entry.id,
            category: entry.category,
            slugs: entry.slugs.iter().map(|(l, s)| (l.code(), s.as_str())).collect(),
        })
        .collect();
    to_json(&rows)
}

fn config_json(active: &[(&RegistryEntry, &CalculatorConfig)]) -> CalcResult<String> {
    let mut by_locale: BTreeMap<&'static str, Vec<ConfigRow<'_>>> = BTreeMap::new();
    for locale in Locale::ALL {
        let rows = active
            .iter()
            .filter_map(|(entry, config)| {
                let slug = entry.slug(locale)?;
                let (name, description, _) = localized(config, locale)?;
                Some(ConfigRow {
                    slug,
                    id: &config.id,
                    name,
                    description,
                    icon: &config.icon,
                    category: config.category,
                })
            })
            .collect();
        by_locale.insert(locale.code(), rows);
    }
    to_json(&by_locale)
}

/// Returns the JSON and how many calculators were stubbed.
fn messages_json(active: &[(&RegistryEntry, &CalculatorConfig)], locale: Locale) -> CalcResult<(String, usize)> {
    let mut stubbed = 0;
    let mut calculators = BTreeMap::new();
    for (_, config) in active {
        let Some((name, description, is_stub)) = localized(config, locale) else {
            continue;
        };
        if is_stub {
            stubbed += 1;
        }
        calculators.insert(config.id.as_str(), CalculatorMessages { name, description });
    }
    Ok((to_json(&MessageBundle { calculators })?, stubbed))
}

fn registry_markdown(catalog: &Catalog, active: &[(&RegistryEntry, &CalculatorConfig)]) -> String {
    let mut md = String::new();
    md.push_str("# Calculator Registry\n\n");
    md.push_str("Generated from `catalog/registry.toml` and `catalog/units/`. Do not edit by hand.\n\n");

    let mut categories: Vec<Category> = active.iter().map(|(e, _)| e.category).collect();
    categories.sort_by_key(|c| c.sort_order());
    categories.dedup();

    let _ = writeln!(md, "| Category | Calculators |");
    let _ = writeln!(md, "|----------|-------------|");
    for category in &categories {
        let count = active.iter().filter(|(e, _)| e.category == *category).count();
        let _ = writeln!(md, "| {} | {} |", category.display_name(), count);
    }

    for category in &categories {
        let _ = writeln!(md, "\n## {}\n", category.display_name());
        let _ = writeln!(md, "| ID | Name | Path (en) | Translations | Presets |");
        let _ = writeln!(md, "|----|------|-----------|--------------|---------|");
        for (entry, config) in active.iter().filter(|(e, _)| e.category == *category) {
            let name = localized(config, Locale::FALLBACK).map(|(n, _, _)| n).unwrap_or(&config.id);
            let translations: Vec<&str> = Locale::ALL
                .iter()
                .filter(|l| config.content(**l).is_some())
                .map(|l| l.code())
                .collect();
            let _ = writeln!(
                md,
                "| `{}` | {} | `{}` | {} | {} |",
                entry.id,
                name,
                entry.path(Locale::FALLBACK).unwrap_or_default(),
                translations.join(", "),
                config.presets.len()
            );
        }
    }

    let mut inactive: Vec<&str> = catalog
        .registry
        .entries
        .iter()
        .filter(|e| !e.active)
        .map(|e| e.id.as_str())
        .collect();
    if !inactive.is_empty() {
        inactive.sort_unstable();
        let _ = writeln!(md, "\n## Inactive\n");
        for id in inactive {
            let _ = writeln!(md, "- `{id}`");
        }
    }
    md
}

// ============================================================================
// Writing and drift detection
// ============================================================================

/// Write every artifact under `dir`, skipping files whose bytes already match.
pub fn write_artifacts(dir: &Path, artifacts: &GeneratedArtifacts) -> CalcResult<WriteReport> {
    let mut report = WriteReport::default();
    for (path, content) in artifacts.iter() {
        let target = dir.join(path);
        if read_optional(&target)?.as_deref() == Some(content.as_bytes()) {
            report.unchanged.push(path.to_string());
            continue;
        }
        write_atomic(&target, content.as_bytes())?;
        debug!(path, "artifact written");
        report.written.push(path.to_string());
    }
    info!(written = report.written.len(), unchanged = report.unchanged.len(), dir = %dir.display(), "artifacts synced");
    Ok(report)
}

/// Compare `dir` against `artifacts` without writing anything.
pub fn check_artifacts(dir: &Path, artifacts: &GeneratedArtifacts) -> CalcResult<Vec<Drift>> {
    let mut drift = Vec::new();
    for (path, content) in artifacts.iter() {
        let kind = match read_optional(&dir.join(path))? {
            None => Some(DriftKind::Missing),
            Some(bytes) if bytes != content.as_bytes() => Some(DriftKind::Changed),
            Some(_) => None,
        };
        if let Some(kind) = kind {
            drift.push(Drift {
                path: path.to_string(),
                kind,
            });
        }
    }
    Ok(drift)
}
