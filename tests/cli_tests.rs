//! CLI integration tests for the aleo-sandbox binary.
//!
//! Every command runs in evaluate mode with its sandbox state in a temp dir,
//! so consecutive invocations share one chain.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const ADMIN: &str = "aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px";

fn sandbox_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("aleo-sandbox").unwrap();
    cmd.current_dir(dir)
        .env("ALEO_SANDBOX_HOME", dir)
        .env_remove("ALEO_PRIVATE_KEY")
        .env_remove("ALEO_PRIVATE_KEY_MAINNET")
        .env_remove("ALEO_DEVNET_PRIVATE_KEY2")
        .env_remove("ALEO_DEVNET_PRIVATE_KEY3")
        .env_remove("ALEO_NETWORK")
        .env_remove("ALEO_MODE")
        .env_remove("RUST_LOG")
        .arg("--mode")
        .arg("evaluate")
        .arg("--state-file")
        .arg(dir.join("state.json"));
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("aleo-sandbox").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("mapping"));
}

#[test]
fn test_accounts_lists_devnet_accounts() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .arg("accounts")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("[0] {}", ADMIN)))
        .stdout(predicate::str::contains("[3] aleo1"));
}

#[test]
fn test_accounts_json_hides_keys_by_default() {
    let dir = TempDir::new().unwrap();
    let output = sandbox_cmd(dir.path())
        .args(["--json", "accounts"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["address"], ADMIN);
    assert!(rows[0].get("private_key").is_none());
}

#[test]
fn test_deploy_run_and_read_mapping() {
    let dir = TempDir::new().unwrap();

    sandbox_cmd(dir.path())
        .args(["deploy", "token.aleo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployed"));
    assert!(dir.path().join("state.json").exists());

    sandbox_cmd(dir.path())
        .args(["deploy", "token.aleo", "--if-missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already deployed"));

    sandbox_cmd(dir.path())
        .args(["run", "token.aleo", "mint_public", ADMIN, "10u64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted"));

    sandbox_cmd(dir.path())
        .args(["mapping", "token.aleo", "account", ADMIN])
        .assert()
        .success()
        .stdout(predicate::str::contains("10u64"));
}

#[test]
fn test_rejected_run_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .args(["deploy", "token.aleo"])
        .assert()
        .success();

    sandbox_cmd(dir.path())
        .args(["run", "token.aleo", "transfer_public", ADMIN, "5u64", "--account", "3"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn test_mapping_missing_entry() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .args(["deploy", "token.aleo"])
        .assert()
        .success();

    sandbox_cmd(dir.path())
        .args(["mapping", "token.aleo", "account", ADMIN])
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));
}

#[test]
fn test_run_undeployed_program_fails() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .args(["run", "token.aleo", "mint_public", ADMIN, "10u64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not deployed"));
}

#[test]
fn test_bad_input_is_reported() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .args(["run", "token.aleo", "mint_public", "not-an-input"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input 0"));
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    sandbox_cmd(dir.path())
        .args(["deploy", "token.aleo"])
        .assert()
        .success();

    let output = sandbox_cmd(dir.path())
        .args(["--json", "status", "token.aleo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["mode"], "evaluate");
    assert_eq!(status["network"], "testnet");
    assert_eq!(status["accounts"], 4);
    assert_eq!(status["program"], "token.aleo");
    assert_eq!(status["deployed"], true);
}

#[test]
fn test_unknown_mode_is_rejected() {
    let mut cmd = Command::cargo_bin("aleo-sandbox").unwrap();
    cmd.args(["--mode", "simulate", "accounts"])
        .assert()
        .failure();
}
