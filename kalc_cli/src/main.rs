//! # Kalcufy CLI
//!
//! Evaluate calculators from the terminal and maintain the calculator
//! registry and its generated artifacts.
//!
//! Defaults come from `kalcufy.toml` (or the file named by
//! `KALCUFY_CONFIG`); flags override them. Logging goes to stderr and is
//! filtered by `KALCUFY_LOG`, then `RUST_LOG`, then the settings file.
//!
//! `list`, `show`, `eval` and `export` read the compiled-in catalog unless
//! given `--catalog`. The maintenance commands fall back to the settings'
//! `catalog_dir` instead.

mod formatter;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kalc_core::codegen::{check_artifacts, generate, write_artifacts};
use kalc_core::export::Report;
use kalc_core::file_io::write_atomic;
use kalc_core::install::install;
use kalc_core::pdf::render_report_pdf;
use kalc_core::{CalcError, Catalog, Category, Engine, InputSnapshot, InputValue, Locale, Settings};

#[derive(Parser)]
#[command(name = "kalcufy")]
#[command(about = "Kalcufy calculators from the command line.")]
#[command(
    long_about = "Evaluate any Kalcufy calculator with KEY=VALUE inputs, export results to CSV or PDF,\nand keep the calculator registry and its generated artifacts in sync."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active calculators with their localized names and paths
    List {
        /// Only show this category (e.g. health, finance)
        #[arg(short, long)]
        category: Option<Category>,
        /// Locale for names and paths (en, es, pt, fr, de)
        #[arg(short, long)]
        locale: Option<Locale>,
        /// Read this catalog directory instead of the compiled-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show a calculator's inputs, results, presets and FAQ
    Show {
        /// Calculator id (e.g. bmi, loan)
        id: String,
        #[arg(short, long)]
        locale: Option<Locale>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Evaluate a calculator
    ///
    /// Starts from the calculator's defaults (or a preset) and applies the
    /// given inputs. Use KEY=null to clear an input.
    ///
    /// Examples:
    ///   kalcufy eval bmi weightKg=70 heightCm=175
    ///   kalcufy eval loan --preset mortgage --locale es
    Eval {
        id: String,
        /// Inputs to set (format: KEY=VALUE)
        inputs: Vec<String>,
        /// Start from a named preset instead of the defaults
        #[arg(short, long)]
        preset: Option<String>,
        #[arg(short, long)]
        locale: Option<Locale>,
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Evaluate a calculator and write the results to a CSV or PDF file
    Export {
        id: String,
        /// Inputs to set (format: KEY=VALUE)
        inputs: Vec<String>,
        #[arg(short, long)]
        preset: Option<String>,
        #[arg(short, long)]
        locale: Option<Locale>,
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(short, long, value_enum)]
        format: ExportFormat,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Check unit configs and the registry against each other
    Validate {
        /// Catalog directory (registry.toml + units/)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Register a new calculator and regenerate artifacts
    ///
    /// Needs units/<id>.toml in the catalog and a compiled-in evaluator.
    Install {
        /// Calculator id (e.g. mortgage-plus)
        id: Option<String>,
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output directory for generated artifacts
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Regenerate every artifact from the catalog
    Sync {
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Report drift without writing; exits 1 if anything is out of date
        #[arg(long)]
        check: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
}

/// Inputs and evaluation options shared by `eval` and `export`.
struct Evaluation<'a> {
    id: &'a str,
    inputs: &'a [String],
    preset: Option<&'a str>,
    locale: Locale,
    today: NaiveDate,
    catalog: Option<&'a Path>,
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&settings);

    let result = match &cli.command {
        Commands::List {
            category,
            locale,
            catalog,
        } => list_command(*category, locale.unwrap_or(settings.locale), catalog.as_deref()),
        Commands::Show { id, locale, catalog } => {
            show_command(id, locale.unwrap_or(settings.locale), catalog.as_deref())
        }
        Commands::Eval {
            id,
            inputs,
            preset,
            locale,
            today,
            json,
            catalog,
        } => eval_command(
            &Evaluation {
                id,
                inputs,
                preset: preset.as_deref(),
                locale: locale.unwrap_or(settings.locale),
                today: today.unwrap_or_else(|| Local::now().date_naive()),
                catalog: catalog.as_deref(),
            },
            *json,
        ),
        Commands::Export {
            id,
            inputs,
            preset,
            locale,
            today,
            format,
            out,
            catalog,
        } => export_command(
            &Evaluation {
                id,
                inputs,
                preset: preset.as_deref(),
                locale: locale.unwrap_or(settings.locale),
                today: today.unwrap_or_else(|| Local::now().date_naive()),
                catalog: catalog.as_deref(),
            },
            *format,
            out,
        ),
        Commands::Validate { catalog } => validate_command(catalog.as_deref().unwrap_or(&settings.catalog_dir)),
        Commands::Install { id, catalog, out } => install_command(
            id.as_deref(),
            catalog.as_deref().unwrap_or(&settings.catalog_dir),
            out.as_deref().unwrap_or(&settings.output_dir),
        ),
        Commands::Sync { catalog, out, check } => sync_command(
            catalog.as_deref().unwrap_or(&settings.catalog_dir),
            out.as_deref().unwrap_or(&settings.output_dir),
            *check,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_env("KALCUFY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&settings.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run `f` on the catalog in `dir`, or on the compiled-in catalog.
fn with_catalog<T>(dir: Option<&Path>, f: impl FnOnce(&Catalog) -> Result<T>) -> Result<T> {
    match dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "loading catalog from disk");
            f(&Catalog::load_dir(dir)?)
        }
        None => f(Catalog::embedded()?),
    }
}

fn list_command(category: Option<Category>, locale: Locale, catalog_dir: Option<&Path>) -> Result<()> {
    with_catalog(catalog_dir, |catalog| list_catalog(catalog, category, locale))
}

fn list_catalog(catalog: &Catalog, category: Option<Category>, locale: Locale) -> Result<()> {
    let mut rows = Vec::new();
    for entry in catalog.registry.active() {
        if category.is_some_and(|c| c != entry.category) {
            continue;
        }
        rows.push((entry, catalog.config(&entry.id)?));
    }
    rows.sort_by(|(a, _), (b, _)| {
        (a.category.sort_order(), &a.id).cmp(&(b.category.sort_order(), &b.id))
    });

    print!("{}", formatter::format_list(&rows, locale));
    Ok(())
}

fn show_command(id: &str, locale: Locale, catalog_dir: Option<&Path>) -> Result<()> {
    with_catalog(catalog_dir, |catalog| {
        let config = catalog.config(id)?;
        print!("{}", formatter::format_config(config, catalog.registry.get(id), locale));
        Ok(())
    })
}

fn eval_command(eval: &Evaluation<'_>, json: bool) -> Result<()> {
    with_catalog(eval.catalog, |catalog| eval_on(&Engine::new(catalog), eval, json))
}

fn eval_on(engine: &Engine<'_>, eval: &Evaluation<'_>, json: bool) -> Result<()> {
    let inputs = build_inputs(engine, eval)?;
    debug!(calculator = eval.id, inputs = inputs.len(), "evaluating");

    match engine.explain(eval.id, &inputs, eval.locale, eval.today) {
        Ok(results) => {
            if json {
                let doc = serde_json::json!({
                    "calculator": eval.id,
                    "locale": eval.locale,
                    "inputs": inputs,
                    "results": results,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                let config = engine.config(eval.id)?;
                print!("{}", formatter::format_results(config, &inputs, &results, eval.locale));
            }
            Ok(())
        }
        Err(e) if e.is_input_error() => {
            if json {
                let doc = serde_json::json!({
                    "calculator": eval.id,
                    "locale": eval.locale,
                    "inputs": inputs,
                    "results": kalc_core::CalculatorResults::invalid(),
                    "error": e,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            Err(anyhow!(e).context("result is invalid"))
        }
        Err(e) => Err(e.into()),
    }
}

fn export_command(eval: &Evaluation<'_>, format: ExportFormat, out: &Path) -> Result<()> {
    with_catalog(eval.catalog, |catalog| export_on(&Engine::new(catalog), eval, format, out))
}

fn export_on(engine: &Engine<'_>, eval: &Evaluation<'_>, format: ExportFormat, out: &Path) -> Result<()> {
    let config = engine.config(eval.id)?;
    let inputs = build_inputs(engine, eval)?;
    let results = engine
        .explain(eval.id, &inputs, eval.locale, eval.today)
        .context("result is invalid")?;

    let report = Report::build(config, &inputs, &results, eval.locale, eval.today)?;
    let bytes = match format {
        ExportFormat::Csv => report.to_csv().into_bytes(),
        ExportFormat::Pdf => render_report_pdf(&report)?,
    };
    write_atomic(out, &bytes)?;
    println!("Wrote {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}

fn validate_command(catalog_dir: &Path) -> Result<()> {
    let catalog = Catalog::load_dir(catalog_dir)?;
    let problems = catalog.problems();
    if !problems.is_empty() {
        for problem in &problems {
            println!("  - {problem}");
        }
        bail!("{} problem(s) in {}", problems.len(), catalog_dir.display());
    }
    println!(
        "ok: {} units, {} registry entries",
        catalog.len(),
        catalog.registry.entries.len()
    );
    Ok(())
}

fn install_command(id: Option<&str>, catalog_dir: &Path, output_dir: &Path) -> Result<()> {
    let Some(id) = id else {
        bail!("install needs a calculator id, e.g. `kalcufy install mortgage-plus`");
    };
    let report = install(catalog_dir, output_dir, id)?;
    for step in &report.steps {
        println!("{step}");
    }
    if report.has_failures() {
        println!("Installed '{id}' with failures; see the log above.");
    } else {
        println!("Installed '{id}'.");
    }
    Ok(())
}

fn sync_command(catalog_dir: &Path, output_dir: &Path, check: bool) -> Result<()> {
    let catalog = Catalog::load_dir(catalog_dir)?;
    let artifacts = generate(&catalog)?;

    if check {
        let drift = check_artifacts(output_dir, &artifacts)?;
        if !drift.is_empty() {
            print!("{}", formatter::format_drift(&drift));
            bail!(
                "{} artifact(s) out of date in {}; run `kalcufy sync`",
                drift.len(),
                output_dir.display()
            );
        }
        println!("{} artifacts up to date in {}", artifacts.len(), output_dir.display());
        return Ok(());
    }

    let report = write_artifacts(output_dir, &artifacts)?;
    print!("{}", formatter::format_write_report(&report, &output_dir.display().to_string()));
    Ok(())
}

/// Defaults (or preset) merged with `KEY=VALUE` arguments.
fn build_inputs(engine: &Engine<'_>, eval: &Evaluation<'_>) -> Result<InputSnapshot> {
    let config = engine.config(eval.id)?;
    let mut overrides = InputSnapshot::new();
    for arg in eval.inputs {
        let (key, value) = parse_assignment(arg)?;
        if config.input(key).is_none() {
            return Err(CalcError::invalid_input(key, value, format!("'{}' has no such input", eval.id)).into());
        }
        overrides.set(key, InputValue::parse_loose(value));
    }
    Ok(engine.snapshot(eval.id, eval.preset, &overrides)?)
}

fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("expected KEY=VALUE, got '{arg}'"),
    }
}
