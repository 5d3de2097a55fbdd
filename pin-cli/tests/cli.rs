use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_bundle(root: &Path, name: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    let metadata = serde_json::json!({
        "name": name,
        "description": "test asset",
        "image": format!("{name}.jpg"),
    });
    std::fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
    std::fs::write(dir.join(format!("{name}.jpg")), name.as_bytes()).unwrap();
}

/// State written by `--mock` runs.
fn read_state(root: &Path, network: &str) -> serde_json::Value {
    let raw = std::fs::read(mock_state_dir(root, network).join("state.json")).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

fn mock_state_dir(root: &Path, network: &str) -> std::path::PathBuf {
    root.join("assets/data/.mock").join(network)
}

fn write_mock_state(root: &Path, network: &str, json: &str) {
    let dir = mock_state_dir(root, network);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("state.json"), json).unwrap();
}

/// Against the real store; only for commands that never reach it.
fn assetpin_real(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("assetpin").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("ASSETPIN_CONFIG")
        .env_remove("ASSETPIN_NETWORK")
        .env_remove("ASSETPIN_API_TOKEN")
        .env("RUST_LOG", "warn")
        .args(["--assets-root", "assets"]);
    cmd
}

/// Workspace with an `assets/` directory; runs from inside it so no stray
/// config file is picked up.
fn assetpin(dir: &TempDir) -> Command {
    let mut cmd = assetpin_real(dir);
    cmd.arg("--mock");
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("assetpin")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("store"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn store_then_nothing_left() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    write_bundle(&assets, "matty-1");
    write_bundle(&assets, "matty-2");

    assetpin(&dir)
        .arg("store")
        .assert()
        .success()
        .stdout(predicate::str::contains("matty-1: ipfs://"))
        .stdout(predicate::str::contains("2 asset(s) stored"));

    let state = read_state(dir.path(), "localhost");
    assert!(state["matty-1"]["uri"].as_str().unwrap().starts_with("ipfs://"));
    assert!(state["matty-2"]["uri"].as_str().unwrap().starts_with("ipfs://"));

    assetpin(&dir)
        .arg("store")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new asset to be stored, skipped"));
}

#[test]
fn network_selects_state_namespace() {
    let dir = tempdir().unwrap();
    write_bundle(&dir.path().join("assets"), "a");

    assetpin(&dir)
        .args(["--network", "rinkeby", "store"])
        .assert()
        .success();

    assert!(read_state(dir.path(), "rinkeby")["a"]["uri"].is_string());
    assert!(!mock_state_dir(dir.path(), "localhost").exists());
}

#[test]
fn network_from_environment() {
    let dir = tempdir().unwrap();
    write_bundle(&dir.path().join("assets"), "a");

    assetpin(&dir)
        .env("ASSETPIN_NETWORK", "mainnet")
        .arg("store")
        .assert()
        .success();

    assert!(read_state(dir.path(), "mainnet")["a"]["uri"].is_string());
}

#[test]
fn failed_asset_exits_with_one() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    write_bundle(&assets, "good");
    std::fs::create_dir_all(assets.join("broken")).unwrap();

    assetpin(&dir)
        .arg("store")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED broken"))
        .stdout(predicate::str::contains("1 asset(s) stored, 1 failed"));

    let state = read_state(dir.path(), "localhost");
    assert!(state["good"]["uri"].is_string());
    assert!(state.get("broken").is_none());
}

#[test]
fn missing_assets_root_exits_with_two() {
    let dir = tempdir().unwrap();

    assetpin(&dir)
        .arg("store")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read assets directory"));
}

#[test]
fn explicit_missing_config_exits_with_two() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();

    assetpin(&dir)
        .args(["--config", "missing.toml", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let dir = tempdir().unwrap();
    write_bundle(&dir.path().join("assets"), "a");
    std::fs::write(dir.path().join("assetpin.toml"), "network = \"rinkeby\"\n").unwrap();

    assetpin(&dir).arg("store").assert().success();

    assert!(read_state(dir.path(), "rinkeby")["a"]["uri"].is_string());
}

#[test]
fn pending_and_dry_run_list_unpublished() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    write_bundle(&assets, "a");
    write_bundle(&assets, "b");
    write_mock_state(dir.path(), "localhost", r#"{"b":{"uri":"ipfs://B"}}"#);

    assetpin(&dir)
        .arg("pending")
        .assert()
        .success()
        .stdout("a\n");

    assetpin(&dir)
        .args(["store", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a\n"))
        .stdout(predicate::str::contains("1 asset(s) would be stored"));

    // Dry run leaves the state untouched.
    assert_eq!(
        read_state(dir.path(), "localhost"),
        serde_json::json!({"b": {"uri": "ipfs://B"}})
    );
}

#[test]
fn status_shows_published_and_pending() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    write_bundle(&assets, "a");
    write_bundle(&assets, "b");
    write_mock_state(
        dir.path(),
        "localhost",
        r#"{"b":{"uri":"ipfs://B","tokenId":7}}"#,
    );

    assetpin(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Network: localhost"))
        .stdout(predicate::str::contains("ipfs://B"))
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("1 published, 1 pending"));
}

#[test]
fn mock_run_leaves_real_state_untouched() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    write_bundle(&assets, "a");
    write_bundle(&assets, "b");
    let real = assets.join("data/localhost/state.json");
    std::fs::create_dir_all(real.parent().unwrap()).unwrap();
    let original = r#"{"b":{"uri":"ipfs://B"}}"#;
    std::fs::write(&real, original).unwrap();

    assetpin(&dir)
        .arg("store")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 asset(s) stored"));

    assert_eq!(std::fs::read_to_string(&real).unwrap(), original);
    let mock = read_state(dir.path(), "localhost");
    assert!(mock["a"]["uri"].is_string());
    assert!(mock["b"]["uri"].is_string());

    // The real state still sees only `a` as pending.
    assetpin_real(&dir)
        .arg("pending")
        .assert()
        .success()
        .stdout("a\n");
}

#[test]
fn token_warning_only_from_store() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();

    assetpin_real(&dir)
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("No API token").not());

    assetpin_real(&dir)
        .arg("pending")
        .assert()
        .success()
        .stderr(predicate::str::contains("No API token").not());

    // Nothing pending, so the store is never contacted.
    assetpin_real(&dir)
        .arg("store")
        .assert()
        .success()
        .stderr(predicate::str::contains("No API token"))
        .stdout(predicate::str::contains("No new asset to be stored, skipped"));
}
