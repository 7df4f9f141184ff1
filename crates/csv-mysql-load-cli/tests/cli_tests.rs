//! CLI integration tests for csv-mysql-load.
//!
//! These tests verify command-line argument parsing, help output,
//! exit codes for various error conditions, and dry runs end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Get a command for the csv-mysql-load binary.
fn cmd() -> Command {
    Command::cargo_bin("csv-mysql-load").unwrap()
}

/// Write a config whose manifest loads `municipio.csv` and `demografia.csv`
/// from `dir`, and return its path.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let yaml = format!(
        r#"target:
  host: localhost
  database: modelagem
  user: loader
load:
  csv_folder: '{}'
  batch_size: 2
tables:
  - table: modelagem.municipio
    csv: municipio.csv
    columns: [id_municipio, nome, sigla_uf]
  - table: modelagem.demografia
    csv: demografia.csv
    columns: [ano, id_municipio, populacao_urbana]
"#,
        dir.display()
    );
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

fn write_sources(dir: &Path, demografia: &str) {
    std::fs::write(
        dir.join("municipio.csv"),
        "id_municipio,nome,sigla_uf\n1100015,Alta Floresta D'Oeste,RO\n1200013,Acrelândia,AC\n1302603,Manaus,AM\n",
    )
    .unwrap();
    std::fs::write(dir.join("demografia.csv"), demografia).unwrap();
}

fn setup(demografia: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path(), demografia);
    let config = write_config(dir.path());
    (dir, config)
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--csv-folder"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--tables"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("csv-mysql-load"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flags_and_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-file"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"))
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Exit Code Tests - Config Errors
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_manifest_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "target:").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: modelagem").unwrap();
    writeln!(file, "  user: loader").unwrap();
    writeln!(file, "tables: []").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tables"));
}

#[test]
fn test_zero_batch_size_override_exits_with_code_1() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n");

    cmd()
        .args(["--config", config.to_str().unwrap(), "run", "--dry-run", "--batch-size", "0"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_table_filter_exits_with_code_1() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n");

    cmd()
        .args(["--config", config.to_str().unwrap(), "run", "--dry-run", "--tables", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope"));
}

// =============================================================================
// Dry Run Tests
// =============================================================================

#[test]
fn test_dry_run_loads_every_table_in_order() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n2020,1100015,\n2021,1100015,25123\n");

    let output = cmd()
        .args(["--config", config.to_str().unwrap(), "--output-json", "run", "--dry-run"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["status"], "completed");
    assert_eq!(result["target"], "noop");
    assert_eq!(result["rows_loaded"], 5);
    assert_eq!(result["tables"][0]["table"], "modelagem.municipio");
    assert_eq!(result["tables"][0]["batches"], 2);
    assert_eq!(result["tables"][1]["table"], "modelagem.demografia");
    assert_eq!(result["tables"][1]["rows"], 2);
}

#[test]
fn test_dry_run_text_summary() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n");

    cmd()
        .args(["--config", config.to_str().unwrap(), "run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run completed!"))
        .stdout(predicate::str::contains("Rows: 3"));
}

#[test]
fn test_table_filter_keeps_only_named_tables() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n2020,1,10\n");

    cmd()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output-json",
            "run",
            "--dry-run",
            "--tables",
            "modelagem.demografia",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tables_total\": 1"))
        .stdout(predicate::str::contains("modelagem.municipio").not());
}

#[test]
fn test_dry_run_with_malformed_number_exits_with_code_4() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n2020,1100015,abc\n");

    cmd()
        .args(["--config", config.to_str().unwrap(), "run", "--dry-run"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("populacao_urbana"));
}

#[test]
fn test_dry_run_with_missing_source_exits_with_code_3() {
    let (dir, config) = setup("ano,id_municipio,populacao_urbana\n");
    std::fs::remove_file(dir.path().join("demografia.csv")).unwrap();

    cmd()
        .args(["--config", config.to_str().unwrap(), "run", "--dry-run"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("demografia.csv"));
}

#[test]
fn test_csv_folder_override() {
    let (_dir, config) = setup("ano,id_municipio,populacao_urbana\n");
    let empty = tempfile::tempdir().unwrap();

    cmd()
        .args([
            "--config",
            config.to_str().unwrap(),
            "run",
            "--dry-run",
            "--csv-folder",
            empty.path().to_str().unwrap(),
        ])
        .assert()
        .code(3);
}

#[test]
fn test_log_file_receives_log_output() {
    let (dir, config) = setup("ano,id_municipio,populacao_urbana\n");
    let log_path = dir.path().join("load.log");

    cmd()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--log-file",
            log_path.to_str().unwrap(),
            "run",
            "--dry-run",
        ])
        .assert()
        .success();

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("modelagem.municipio"));
    assert!(log.contains("Total rows: 3"));
}
