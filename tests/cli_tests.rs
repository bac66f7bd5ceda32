//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::write_file;
use predicates::prelude::*;
use tempfile::TempDir;

fn sheetsync() -> Command {
    let mut cmd = Command::cargo_bin("sheetsync").unwrap();
    // Keep overrides from the calling environment out of the tests.
    cmd.env_remove("SHEETSYNC_AUTH_COOKIE")
        .env_remove("SHEETSYNC_PRIMARY_SERVER")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    sheetsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("variants"));
}

#[test]
fn test_variants_lists_every_variant() {
    sheetsync()
        .arg("variants")
        .assert()
        .success()
        .stdout(predicate::str::contains("price-sheet"))
        .stdout(predicate::str::contains("status-message"))
        .stdout(predicate::str::contains("sys-config"))
        .stdout(predicate::str::contains("admin-command"))
        .stdout(predicate::str::contains("primary field: Shipping Order"));
}

#[test]
fn test_invalid_variant() {
    sheetsync()
        .args(["run", "invoices", "--input", "a.csv", "--config", "c.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_missing_config_key_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let config = write_file(dir.path(), "config.csv", "PRIMARY_SERVER,acme\nAUTH_COOKIE,JSESSIONID=1\n");
    let input = write_file(dir.path(), "orders.csv", "page,setting,value\np.jsp,s,v\n");

    sheetsync()
        .arg("run")
        .arg("sys-config")
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing required config key: ENTERPRISE"));

    assert!(!dir.path().join("orders_updated.csv").exists());
}

#[test]
fn test_missing_config_file_exits_with_general_code() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "orders.csv", "command\nlist\n");

    sheetsync()
        .arg("run")
        .arg("admin-command")
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(dir.path().join("nope.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_dry_run_prints_planned_requests() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        dir.path(),
        "config.csv",
        "PRIMARY_SERVER,acme\nAUTH_COOKIE,JSESSIONID=1\nENTERPRISE,42\n",
    );
    let input = write_file(
        dir.path(),
        "settings.csv",
        "page,setting,value\nmisc.jsp,bAllowX,true\nmisc.jsp,bAllowY,\n,,\n",
    );

    sheetsync()
        .arg("run")
        .arg("sys-config")
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--dry-run")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key\": \"misc.jsp:bAllowX\""))
        .stdout(predicate::str::contains("/MercuryGate/enterprise/misc.jsp"))
        .stdout(predicate::str::contains("Missing value"));

    assert!(!dir.path().join("settings_updated.csv").exists());
}

#[test]
fn test_environment_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(dir.path(), "config.csv", "PRIMARY_SERVER,acme\n");
    let input = write_file(dir.path(), "orders.csv", "command\nlist\n");

    sheetsync()
        .env("SHEETSYNC_AUTH_COOKIE", "JSESSIONID=from-env")
        .env("SHEETSYNC_ENTERPRISE", "42")
        .arg("run")
        .arg("admin-command")
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("sidEnterprise=%2842%2C3640%2C0%29"));
}
