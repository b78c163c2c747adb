//! # Calculator Installation
//!
//! Brings a new unit into the catalog once its `units/<id>.toml` and its
//! evaluator exist:
//!
//! 1. validate the unit config
//! 2. add a registry entry with slugs derived from the localized names
//! 3. regenerate every artifact
//!
//! Missing sources are an error. After that each step is logged and a
//! failing step does not stop the run; the report says what happened.

use std::fmt;
use std::path::Path;

use tracing::{error, info, warn};

use crate::calculators::CalculatorKind;
use crate::catalog::{Catalog, REGISTRY_FILE, UNITS_DIR};
use crate::codegen::{generate, write_artifacts};
use crate::errors::{CalcError, CalcResult};
use crate::file_io::{read_text, write_atomic};
use crate::locale::Locale;
use crate::registry::{Registry, RegistryEntry};
use crate::schema::CalculatorConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done(String),
    Skipped(String),
    Failed(String),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Done(msg) => write!(f, "[ok]   {}: {msg}", self.name),
            StepOutcome::Skipped(msg) => write!(f, "[skip] {}: {msg}", self.name),
            StepOutcome::Failed(msg) => write!(f, "[fail] {}: {msg}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub id: String,
    pub steps: Vec<InstallStep>,
}

impl InstallReport {
    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(|s| s.outcome.is_failure())
    }

    fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Done(msg) => info!(step = name, id = %self.id, "{msg}"),
            StepOutcome::Skipped(msg) => warn!(step = name, id = %self.id, "skipped: {msg}"),
            StepOutcome::Failed(msg) => error!(step = name, id = %self.id, "failed: {msg}"),
        }
        self.steps.push(InstallStep { name, outcome });
    }
}

/// Install `id` into the catalog at `catalog_dir`, writing artifacts to
/// `output_dir`.
///
/// Errs only when the unit file or the evaluator is missing.
pub fn install(catalog_dir: &Path, output_dir: &Path, id: &str) -> CalcResult<InstallReport> {
    let unit_path = catalog_dir.join(UNITS_DIR).join(format!("{id}.toml"));
    if !unit_path.is_file() {
        return Err(CalcError::file_error("read", unit_path.display().to_string(), "unit file not found"));
    }
    if CalculatorKind::from_id(id).is_none() {
        return Err(CalcError::unknown_calculator(id));
    }

    let mut report = InstallReport {
        id: id.to_string(),
        steps: Vec::new(),
    };

    let config = match read_text(&unit_path).and_then(|source| CalculatorConfig::from_toml(&source)) {
        Ok(config) => {
            match config.validate() {
                Ok(()) => report.record("validate", StepOutcome::Done("unit config is valid".into())),
                Err(e) => report.record("validate", StepOutcome::Failed(e.to_string())),
            }
            Some(config)
        }
        Err(e) => {
            report.record("validate", StepOutcome::Failed(e.to_string()));
            None
        }
    };

    let outcome = match &config {
        Some(config) => ensure_registered(catalog_dir, config),
        None => StepOutcome::Skipped("unit config could not be parsed".into()),
    };
    report.record("registry", outcome);

    let outcome = match Catalog::load_dir(catalog_dir)
        .and_then(|catalog| generate(&catalog))
        .and_then(|artifacts| write_artifacts(output_dir, &artifacts))
    {
        Ok(written) => StepOutcome::Done(format!(
            "{} written, {} unchanged in {}",
            written.written.len(),
            written.unchanged.len(),
            output_dir.display()
        )),
        Err(e) => StepOutcome::Failed(e.to_string()),
    };
    report.record("artifacts", outcome);

    Ok(report)
}

/// Add a derived registry entry for `config` unless one exists.
fn ensure_registered(catalog_dir: &Path, config: &CalculatorConfig) -> StepOutcome {
    let path = catalog_dir.join(REGISTRY_FILE);
    let result = read_text(&path)
        .and_then(|source| Registry::from_toml(&source))
        .and_then(|mut registry| {
            if registry.contains(&config.id) {
                return Ok(None);
            }
            let entry = RegistryEntry::derived_from(config);
            let slug = entry.slug(Locale::FALLBACK).unwrap_or_default().to_string();
            registry.insert(entry)?;
            write_atomic(&path, registry.to_toml()?.as_bytes())?;
            Ok(Some(slug))
        });
    match result {
        Ok(Some(slug)) => StepOutcome::Done(format!("registered at /en/{slug}")),
        Ok(None) => StepOutcome::Skipped("already registered".into()),
        Err(e) => StepOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::REGISTRY_JSON;
    use std::fs;
    use tempfile::TempDir;

    const TIP_ONLY_REGISTRY: &str = r#"
[[calculator]]
id = "tip"
category = "everyday"
[calculator.slugs]
en = "tip-calculator"
es = "calculadora-de-propinas"
pt = "calculadora-de-gorjeta"
fr = "calculateur-de-pourboire"
de = "trinkgeldrechner"
"#;

    /// Catalog directory holding copies of the tip and loan units and a
    /// registry that only knows about tip.
    fn scratch_catalog() -> TempDir {
        let dir = TempDir::new().unwrap();
        let units = dir.path().join(UNITS_DIR);
        fs::create_dir_all(&units).unwrap();
        let sources = Path::new(env!("CARGO_MANIFEST_DIR")).join("catalog").join(UNITS_DIR);
        for id in ["tip", "loan"] {
            let file = format!("{id}.toml");
            fs::copy(sources.join(&file), units.join(&file)).unwrap();
        }
        fs::write(dir.path().join(REGISTRY_FILE), TIP_ONLY_REGISTRY).unwrap();
        dir
    }

    #[test]
    fn test_install_registers_and_generates() {
        let catalog = scratch_catalog();
        let out = TempDir::new().unwrap();

        let report = install(catalog.path(), out.path(), "loan").unwrap();
        assert!(!report.has_failures(), "{:?}", report.steps);

        let registry = Registry::from_toml(&fs::read_to_string(catalog.path().join(REGISTRY_FILE)).unwrap()).unwrap();
        let loan = registry.get("loan").unwrap();
        assert_eq!(loan.slug(Locale::En), Some("loan-calculator"));
        assert_eq!(loan.slug(Locale::Es), Some("calculadora-de-prestamos"));

        let json = fs::read_to_string(out.path().join(REGISTRY_JSON)).unwrap();
        assert!(json.contains("\"loan\""));
    }

    #[test]
    fn test_second_install_skips_registry() {
        let catalog = scratch_catalog();
        let out = TempDir::new().unwrap();
        install(catalog.path(), out.path(), "loan").unwrap();

        let report = install(catalog.path(), out.path(), "loan").unwrap();
        let registry_step = report.steps.iter().find(|s| s.name == "registry").unwrap();
        assert_eq!(registry_step.outcome, StepOutcome::Skipped("already registered".into()));
    }

    #[test]
    fn test_missing_unit_file_is_an_error() {
        let catalog = scratch_catalog();
        let out = TempDir::new().unwrap();
        assert!(install(catalog.path(), out.path(), "bmi").is_err());
    }

    #[test]
    fn test_broken_step_is_reported_not_raised() {
        let catalog = scratch_catalog();
        let out = TempDir::new().unwrap();
        fs::write(catalog.path().join(REGISTRY_FILE), "not = [valid").unwrap();

        let report = install(catalog.path(), out.path(), "loan").unwrap();
        assert!(report.has_failures());
        assert_eq!(report.steps.len(), 3);
    }
}
