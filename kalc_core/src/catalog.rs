//! # Calculator Catalog
//!
//! The registry plus every unit config, loaded together so they can be
//! checked against each other and against the compiled-in evaluators.
//!
//! Two sources are supported:
//! - [`Catalog::embedded`]: the `catalog/` directory embedded at compile time,
//!   parsed once per process and shared read-only afterwards.
//! - [`Catalog::load_dir`]: an on-disk catalog, used by the maintenance
//!   commands that edit and regenerate it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use rust_embed::RustEmbed;
use tracing::debug;

use crate::calculators::CalculatorKind;
use crate::errors::{CalcError, CalcResult};
use crate::registry::Registry;
use crate::schema::CalculatorConfig;

/// File name of the registry inside a catalog directory
pub const REGISTRY_FILE: &str = "registry.toml";

/// Sub-directory holding one TOML file per unit
pub const UNITS_DIR: &str = "units";

#[derive(RustEmbed)]
#[folder = "catalog/"]
struct CatalogAssets;

static EMBEDDED: OnceCell<Catalog> = OnceCell::new();

/// Registry and unit configs, keyed by calculator id.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub registry: Registry,
    units: BTreeMap<String, CalculatorConfig>,
}

impl Catalog {
    /// Build a catalog from raw sources. `units` yields `(file stem, TOML)`;
    /// each file stem must equal the id declared inside it.
    pub fn from_sources<I>(registry_toml: &str, units: I) -> CalcResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let registry = Registry::from_toml(registry_toml)?;
        let mut configs = BTreeMap::new();
        for (stem, source) in units {
            let config = CalculatorConfig::from_toml(&source)
                .map_err(|e| CalcError::serialization(format!("{stem}.toml: {e}")))?;
            if config.id != stem {
                return Err(CalcError::invalid_config(
                    &config.id,
                    format!("declared in '{stem}.toml'; file name must match the id"),
                ));
            }
            if configs.insert(config.id.clone(), config).is_some() {
                return Err(CalcError::invalid_config(&stem, "defined twice"));
            }
        }
        debug!(units = configs.len(), entries = registry.entries.len(), "catalog parsed");
        Ok(Catalog {
            registry,
            units: configs,
        })
    }

    /// The compiled-in catalog, parsed on first use.
    pub fn embedded() -> CalcResult<&'static Catalog> {
        EMBEDDED.get_or_try_init(|| {
            let registry = CatalogAssets::get(REGISTRY_FILE)
                .ok_or_else(|| CalcError::file_error("read", REGISTRY_FILE, "not embedded"))?;
            let registry = utf8(REGISTRY_FILE, &registry.data)?;

            let mut units = Vec::new();
            for path in CatalogAssets::iter() {
                let Some(stem) = unit_stem(&path) else { continue };
                let file = CatalogAssets::get(&path)
                    .ok_or_else(|| CalcError::file_error("read", path.to_string(), "not embedded"))?;
                units.push((stem, utf8(&path, &file.data)?));
            }
            Catalog::from_sources(&registry, units)
        })
    }

    /// Load a catalog directory from disk (`registry.toml` + `units/*.toml`).
    pub fn load_dir(dir: &Path) -> CalcResult<Self> {
        let registry_path = dir.join(REGISTRY_FILE);
        let registry = fs::read_to_string(&registry_path)
            .map_err(|e| CalcError::file_error("read", registry_path.display().to_string(), e.to_string()))?;

        let units_dir = dir.join(UNITS_DIR);
        let entries = fs::read_dir(&units_dir)
            .map_err(|e| CalcError::file_error("list", units_dir.display().to_string(), e.to_string()))?;

        let mut units = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| CalcError::file_error("list", units_dir.display().to_string(), e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let source = fs::read_to_string(&path)
                .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
            units.push((stem, source));
        }
        units.sort();
        Catalog::from_sources(&registry, units)
    }

    /// Config for `id`.
    pub fn config(&self, id: &str) -> CalcResult<&CalculatorConfig> {
        self.units.get(id).ok_or_else(|| CalcError::unknown_calculator(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    /// All unit configs, sorted by id.
    pub fn configs(&self) -> impl Iterator<Item = &CalculatorConfig> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every problem in the catalog: per-unit schema violations, registry
    /// structure, and disagreement between registry, unit files and
    /// compiled-in evaluators.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = self.registry.problems();

        for config in self.units.values() {
            for p in config.problems() {
                problems.push(format!("{}: {p}", config.id));
            }
            if CalculatorKind::from_id(&config.id).is_none() {
                problems.push(format!("{}: no evaluator is compiled in for this unit", config.id));
            }
            match self.registry.get(&config.id) {
                None => problems.push(format!("{}: unit has no registry entry", config.id)),
                Some(entry) if entry.category != config.category => problems.push(format!(
                    "{}: registry category '{}' differs from unit category '{}'",
                    config.id, entry.category, config.category
                )),
                Some(_) => {}
            }
        }

        for entry in &self.registry.entries {
            if !self.units.contains_key(&entry.id) {
                problems.push(format!("{}: registry entry has no unit file", entry.id));
            }
        }

        problems
    }

    /// Fail if [`Catalog::problems`] reports anything.
    pub fn validate(&self) -> CalcResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CalcError::registry_mismatch("catalog", problems.join("; ")))
        }
    }
}

fn unit_stem(path: &str) -> Option<String> {
    let rest = path.strip_prefix(UNITS_DIR)?.strip_prefix('/')?;
    rest.strip_suffix(".toml").map(str::to_string)
}

fn utf8(path: &str, bytes: &[u8]) -> CalcResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| CalcError::serialization(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    #[test]
    fn test_embedded_catalog_is_consistent() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.len(), CalculatorKind::ALL.len());
        let problems = catalog.problems();
        assert!(problems.is_empty(), "catalog problems: {problems:#?}");
    }

    #[test]
    fn test_every_evaluator_has_a_unit() {
        let catalog = Catalog::embedded().unwrap();
        for kind in CalculatorKind::ALL {
            assert!(catalog.contains(kind.id()), "missing unit file for {}", kind.id());
        }
    }

    #[test]
    fn test_every_unit_ships_spanish() {
        let catalog = Catalog::embedded().unwrap();
        for config in catalog.configs() {
            assert!(config.content(Locale::Es).is_some(), "{} has no es bundle", config.id);
        }
    }

    #[test]
    fn test_unknown_calculator() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(
            catalog.config("nope").unwrap_err().error_code(),
            "UNKNOWN_CALCULATOR"
        );
    }

    #[test]
    fn test_file_name_must_match_id() {
        let unit = r#"
id = "real"
category = "math"
icon = "x"
inputs = []
results = []
[t.en]
name = "Real"
description = "Real"
"#;
        let err = Catalog::from_sources("", vec![("other".to_string(), unit.to_string())]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_orphans_reported() {
        let registry = r#"
[[calculator]]
id = "ghost"
category = "math"
[calculator.slugs]
en = "ghost"
es = "fantasma"
pt = "fantasma"
fr = "fantome"
de = "geist"
"#;
        let catalog = Catalog::from_sources(registry, Vec::new()).unwrap();
        let problems = catalog.problems();
        assert!(problems.iter().any(|p| p == "ghost: registry entry has no unit file"));
    }

    #[test]
    fn test_load_dir_matches_embedded() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog");
        let on_disk = Catalog::load_dir(&dir).unwrap();
        assert_eq!(&on_disk, Catalog::embedded().unwrap());
    }

    #[test]
    fn test_unit_stem() {
        assert_eq!(unit_stem("units/bmi.toml").as_deref(), Some("bmi"));
        assert_eq!(unit_stem("registry.toml"), None);
    }
}
