//! # kalc_core - Kalcufy Calculator Engine
//!
//! `kalc_core` evaluates the Kalcufy calculators. Each calculator is a
//! *unit*: a declarative TOML config (inputs, results, presets, localized
//! text) paired with a pure Rust evaluator. A registry maps units to
//! localized URL slugs, and every artifact the site consumes is regenerated
//! from the registry and the unit configs.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: evaluation is a pure function of inputs, locale and date
//! - **Never throws at the caller**: bad input gives `is_valid = false`
//! - **JSON-First**: all public types implement Serialize/Deserialize
//! - **Single source of truth**: `catalog/registry.toml`, regenerated outputs
//!
//! ## Quick Start
//!
//! ```rust
//! use kalc_core::{Engine, InputSnapshot, Locale};
//!
//! let engine = Engine::embedded()?;
//! let inputs = InputSnapshot::new()
//!     .with("mode", "whatIsXPercentOfY")
//!     .with("percentValue", 25.0)
//!     .with("ofValue", 120.0);
//! let inputs = engine.snapshot("percentage", None, &inputs)?;
//! let results = engine.evaluate("percentage", &inputs, Locale::En)?;
//!
//! assert!(results.is_valid);
//! assert_eq!(results.formatted("answer"), Some("30"));
//! # Ok::<(), kalc_core::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`schema`], [`inputs`], [`results`] - the unit contract
//! - [`calculators`] - the twelve evaluators
//! - [`engine`] - input checks, dispatch and output checks
//! - [`catalog`], [`registry`] - unit configs and routing
//! - [`codegen`], [`install`] - artifact regeneration and onboarding
//! - [`export`], [`pdf`] - CSV and PDF reports
//! - [`locale`], [`format`], [`i18n`] - localization
//! - [`units`] - type-safe unit wrappers
//! - [`settings`], [`file_io`], [`errors`] - ambient plumbing

pub mod calculators;
pub mod catalog;
pub mod codegen;
pub mod engine;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod format;
pub mod i18n;
pub mod inputs;
pub mod install;
pub mod locale;
pub mod pdf;
pub mod registry;
pub mod results;
pub mod schema;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculators::CalculatorKind;
pub use catalog::Catalog;
pub use engine::{evaluate, Engine, EvalContext};
pub use errors::{CalcError, CalcResult};
pub use inputs::{InputSnapshot, InputValue};
pub use locale::Locale;
pub use registry::{Registry, RegistryEntry};
pub use results::CalculatorResults;
pub use schema::{CalculatorConfig, Category};
pub use settings::Settings;
