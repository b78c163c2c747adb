use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn kalcufy() -> Command {
    let mut cmd = Command::cargo_bin("kalcufy").unwrap();
    cmd.env_remove("KALCUFY_CONFIG")
        .env_remove("KALCUFY_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn catalog_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../kalc_core/catalog")
}

/// Writable copy of the shipped catalog.
fn scratch_catalog() -> TempDir {
    let dir = TempDir::new().unwrap();
    let source = catalog_dir();
    fs::create_dir_all(dir.path().join("units")).unwrap();
    fs::copy(source.join("registry.toml"), dir.path().join("registry.toml")).unwrap();
    for entry in fs::read_dir(source.join("units")).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join("units").join(path.file_name().unwrap())).unwrap();
    }
    dir
}

#[test]
fn test_cli_list_all() {
    kalcufy()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bmi"))
        .stdout(predicate::str::contains("/en/loan-calculator"))
        .stdout(predicate::str::contains("12 calculator(s)"));
}

#[test]
fn test_cli_list_by_category_and_locale() {
    kalcufy()
        .args(["list", "--category", "health", "--locale", "es"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/es/calculadora-imc"))
        .stdout(predicate::str::contains("loan").not());
}

#[test]
fn test_cli_list_rejects_unknown_locale() {
    kalcufy()
        .args(["list", "--locale", "it"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown locale"));
}

#[test]
fn test_cli_show() {
    kalcufy()
        .args(["show", "loan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loan Calculator"))
        .stdout(predicate::str::contains("loanAmount"))
        .stdout(predicate::str::contains("mortgage"));
}

#[test]
fn test_cli_show_unknown_calculator() {
    kalcufy()
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown calculator"));
}

#[test]
fn test_cli_eval_with_inputs() {
    kalcufy()
        .args(["eval", "loan", "loanAmount=200000", "annualRate=6", "termYears=30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$1,199.10"));
}

#[test]
fn test_cli_eval_json() {
    let output = kalcufy()
        .args(["eval", "bmi", "--preset", "averageAdult", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["calculator"], "bmi");
    assert_eq!(doc["results"]["is_valid"], true);
    assert_eq!(doc["results"]["formatted"]["bmi"], "22.9");
}

#[test]
fn test_cli_eval_null_clears_required_input() {
    kalcufy()
        .args(["eval", "bmi", "weightKg=null"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn test_cli_eval_unknown_input() {
    kalcufy()
        .args(["eval", "bmi", "shoeSize=42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shoeSize"));
}

#[test]
fn test_cli_export_csv() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bmi.csv");
    kalcufy()
        .args(["export", "bmi", "weightKg=70", "heightCm=175", "--format", "csv", "--out"])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("section,id,label,value,formatted\r\n"));
    assert!(csv.contains("result,bmi,"));
}

#[test]
fn test_cli_eval_results_lead_with_primary() {
    let output = kalcufy().args(["eval", "raid"]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(output.status.success(), "{stdout}");
    // name, blank line, then the result rows
    let first = stdout.lines().nth(2).unwrap_or_default();
    assert!(first.trim_start().starts_with("Usable capacity"), "{stdout}");
}

#[test]
fn test_cli_show_lists_result_formats() {
    kalcufy()
        .args(["show", "percentage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("number; primary; when mode=whatIsXPercentOfY"))
        .stdout(predicate::str::contains("percent; primary; when mode=xIsWhatPercentOfY|percentageChange"));
}

#[test]
fn test_cli_read_commands_follow_catalog_flag() {
    let catalog = scratch_catalog();
    fs::remove_file(catalog.path().join("units/tip.toml")).unwrap();

    kalcufy().args(["show", "tip"]).assert().success();
    kalcufy()
        .args(["show", "tip", "--catalog"])
        .arg(catalog.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown calculator"));

    kalcufy()
        .args(["eval", "bmi", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI Calculator"));

    kalcufy()
        .args(["list", "--catalog"])
        .arg(catalog.path().join("missing"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_cli_validate_shipped_catalog() {
    kalcufy()
        .arg("validate")
        .arg("--catalog")
        .arg(catalog_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 12 units"));
}

#[test]
fn test_cli_validate_reports_orphan_unit() {
    let catalog = scratch_catalog();
    let registry = fs::read_to_string(catalog.path().join("registry.toml")).unwrap();
    let without_tip = registry.replace("id = \"tip\"", "id = \"tip-gone\"");
    fs::write(catalog.path().join("registry.toml"), without_tip).unwrap();

    kalcufy()
        .arg("validate")
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("tip: unit has no registry entry"));
}

#[test]
fn test_cli_sync_then_check() {
    let out = TempDir::new().unwrap();

    kalcufy()
        .arg("sync")
        .arg("--catalog")
        .arg(catalog_dir())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote registry.json"));

    kalcufy()
        .arg("sync")
        .arg("--check")
        .arg("--catalog")
        .arg(catalog_dir())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    fs::write(out.path().join("registry.json"), "[]").unwrap();
    kalcufy()
        .arg("sync")
        .arg("--check")
        .arg("--catalog")
        .arg(catalog_dir())
        .arg("--out")
        .arg(out.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("changed  registry.json"));
}

#[test]
fn test_cli_install_existing_calculator_skips_registry() {
    let catalog = scratch_catalog();
    let out = TempDir::new().unwrap();

    kalcufy()
        .args(["install", "tip", "--catalog"])
        .arg(catalog.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[skip] registry: already registered"))
        .stdout(predicate::str::contains("[ok]   artifacts"));
}

#[test]
fn test_cli_install_missing_unit_fails() {
    let catalog = scratch_catalog();
    let out = TempDir::new().unwrap();

    kalcufy()
        .args(["install", "mortgage-plus", "--catalog"])
        .arg(catalog.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unit file not found"));
}

#[test]
fn test_cli_install_without_id_fails() {
    let catalog = scratch_catalog();
    let out = TempDir::new().unwrap();

    kalcufy()
        .args(["install", "--catalog"])
        .arg(catalog.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("install needs a calculator id"));
}
