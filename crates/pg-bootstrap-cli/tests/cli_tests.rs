//! CLI integration tests for pg-bootstrap.
//!
//! These tests verify command-line argument parsing, the offline plan
//! output, and exit codes for configuration errors. Nothing here needs a
//! live database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the pg-bootstrap binary.
fn cmd() -> Command {
    Command::cargo_bin("pg-bootstrap").unwrap()
}

/// Write a config fixture to a temp file and return its guard.
fn config_fixture(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

const VALID_CONFIG: &str = r#"
database:
  host: localhost
  database: app
  user: postgres
  password: postgres
bootstrap:
  schemas: [master, bank]
  tables:
    - schema: master
      name: prao_mst
      columns:
        - name: prao_id_pk
          type: integer
          primary_key: true
          identity: true
          nullable: false
        - name: prao_code
          type:
            varchar: 6
          nullable: false
      indexes:
        - columns: [prao_code]
          unique: true
"#;

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
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pg-bootstrap"));
}

// =============================================================================
// Plan Tests (offline)
// =============================================================================

#[test]
fn test_plan_emits_schemas_tables_and_replica_script() {
    let config = config_fixture(VALID_CONFIG);
    cmd()
        .args(["--config", config.path().to_str().unwrap(), "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATE SCHEMA IF NOT EXISTS \"master\"",
        ))
        .stdout(predicate::str::contains(
            "CREATE SCHEMA IF NOT EXISTS \"bank\"",
        ))
        .stdout(predicate::str::contains(
            "CREATE TABLE IF NOT EXISTS \"master\".\"prao_mst\"",
        ))
        .stdout(predicate::str::contains("GENERATED BY DEFAULT AS IDENTITY"))
        .stdout(predicate::str::contains("CREATE UNIQUE INDEX IF NOT EXISTS"))
        .stdout(predicate::str::contains("REPLICA IDENTITY FULL"));
}

#[test]
fn test_run_dry_run_matches_plan() {
    let config = config_fixture(VALID_CONFIG);
    cmd()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "run",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS"))
        .stdout(predicate::str::contains("REPLICA IDENTITY FULL"));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/bootstrap.yaml", "plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_pool_bounds_exit_with_config_code() {
    let config = config_fixture(
        r#"
database:
  host: localhost
  database: app
  user: postgres
  password: postgres
pool:
  max_open: 0
"#,
    );
    cmd()
        .args(["--config", config.path().to_str().unwrap(), "plan"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("pool.max_open"));
}

#[test]
fn test_table_in_unlisted_schema_is_rejected() {
    let config = config_fixture(
        r#"
database:
  host: localhost
  database: app
  user: postgres
  password: postgres
bootstrap:
  schemas: [master, bank]
  tables:
    - schema: sec
      name: user_mst
      columns:
        - name: user_id_pk
          type: integer
          primary_key: true
"#,
    );
    cmd()
        .args(["--config", config.path().to_str().unwrap(), "plan"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not in bootstrap.schemas"));
}

#[test]
fn test_table_without_columns_is_rejected() {
    let config = config_fixture(
        r#"
database:
  host: localhost
  database: app
  user: postgres
  password: postgres
bootstrap:
  tables:
    - schema: master
      name: empty_mst
      columns: []
"#,
    );
    cmd()
        .args(["--config", config.path().to_str().unwrap(), "plan"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("declares no columns"));
}
