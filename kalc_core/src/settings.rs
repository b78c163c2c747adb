//! # Settings
//!
//! Defaults for the maintenance tooling, read from a TOML file:
//!
//! ```toml
//! locale = "es"
//! catalog_dir = "kalc_core/catalog"
//! output_dir = "kalc_core/generated"
//! log = "kalc_core=debug"
//! ```
//!
//! The file is found through `KALCUFY_CONFIG`, then `./kalcufy.toml`. Every
//! key is optional and command-line flags override whatever is loaded.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::file_io::read_text;
use crate::locale::Locale;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "KALCUFY_CONFIG";

/// Settings file looked up in the working directory
pub const DEFAULT_FILE: &str = "kalcufy.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Locale used when a command is not given `--locale`
    pub locale: Locale,
    /// Catalog directory read by `validate` and `sync` and edited by
    /// `install`. The evaluation commands use the compiled-in catalog and
    /// ignore this unless given `--catalog`.
    pub catalog_dir: PathBuf,
    /// Where generated artifacts are written
    pub output_dir: PathBuf,
    /// Log filter directive, used when neither `KALCUFY_LOG` nor `RUST_LOG` is set
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            locale: Locale::FALLBACK,
            catalog_dir: PathBuf::from("kalc_core/catalog"),
            output_dir: PathBuf::from("kalc_core/generated"),
            log: "warn".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml(source: &str) -> CalcResult<Self> {
        toml::from_str(source).map_err(|e| CalcError::serialization(format!("settings: {e}")))
    }

    pub fn load_file(path: &Path) -> CalcResult<Self> {
        let settings = Self::from_toml(&read_text(path)?)?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load from `KALCUFY_CONFIG` or `./kalcufy.toml`, else defaults.
    ///
    /// A path named by the environment variable must exist; the implicit
    /// `./kalcufy.toml` is optional.
    pub fn load() -> CalcResult<Self> {
        Self::load_from(env::var_os(CONFIG_ENV).map(PathBuf::from), Path::new(DEFAULT_FILE))
    }

    fn load_from(explicit: Option<PathBuf>, fallback: &Path) -> CalcResult<Self> {
        match explicit {
            Some(path) => Self::load_file(&path),
            None if fallback.is_file() => Self::load_file(fallback),
            None => Ok(Settings::default()),
        }
    }
}
