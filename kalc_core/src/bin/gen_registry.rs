//! Regenerate the site artifacts from the calculator catalog.
//!
//! Reads `kalc_core/catalog/` and rewrites `kalc_core/generated/`
//! (registry.json, calculators-config.json, messages/, REGISTRY.md).
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-registry
//! ```
//!
//! Run from the workspace root. The `kalcufy sync` command does the same
//! with configurable paths and a `--check` mode.

use std::path::Path;

use kalc_core::catalog::Catalog;
use kalc_core::codegen::{generate, write_artifacts};

fn main() {
    println!("Generating registry artifacts...");

    let catalog_dir = Path::new("kalc_core/catalog");
    let output_dir = Path::new("kalc_core/generated");

    let catalog = match Catalog::load_dir(catalog_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            std::process::exit(1);
        }
    };

    let problems = catalog.problems();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        eprintln!("Catalog has {} problem(s); nothing written.", problems.len());
        std::process::exit(1);
    }

    match generate(&catalog).and_then(|artifacts| write_artifacts(output_dir, &artifacts)) {
        Ok(report) => {
            for path in &report.written {
                println!("  wrote {}", path);
            }
            println!(
                "{} written, {} unchanged in {}",
                report.written.len(),
                report.unchanged.len(),
                output_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Error generating artifacts: {}", e);
            std::process::exit(1);
        }
    }
}
