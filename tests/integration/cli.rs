use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config file and cache directory
fn kfzf(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("kfzf");
    cmd.env_remove("KFZF_CLUSTER")
        .arg("--config")
        .arg(temp.path().join("config.toml"))
        .arg("--cache-dir")
        .arg(temp.path().join("cache"));
    cmd
}

const EVENTS: &str = r#"{"type":"ADDED","object":{"kind":"Pod","metadata":{"name":"web-1","namespace":"shop","labels":{"app":"web"}}}}
{"type":"ADDED","object":{"kind":"Pod","metadata":{"name":"web-2","namespace":"shop"}}}
{"type":"ADDED","object":{"kind":"Namespace","metadata":{"name":"shop"}}}
{"type":"MODIFIED","object":{"kind":"Pod","metadata":{"name":"web-2","namespace":"shop","labels":{"app":"web"}}}}
{"type":"DELETED","object":{"kind":"Pod","metadata":{"name":"web-1","namespace":"shop"}}}
not json at all
{"type":"ADDED","object":{"kind":"Pod","metadata":{"name":"db-0","namespace":"data"}}}
"#;

fn ingest_events(temp: &TempDir) {
    let input = temp.path().join("events.jsonl");
    fs::write(&input, EVENTS).unwrap();

    kfzf(temp)
        .args(["--cluster", "test", "ingest", "--resources", "pods,ns", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 malformed"));
}

#[test]
fn help_displays() {
    cargo_bin_cmd!("kfzf")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cluster resources"));
}

#[test]
fn version_displays() {
    cargo_bin_cmd!("kfzf")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kfzf"));
}

#[test]
fn config_path_displays() {
    let temp = TempDir::new().unwrap();
    kfzf(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_show_displays_defaults() {
    let temp = TempDir::new().unwrap();
    kfzf(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[store]"))
        .stdout(predicate::str::contains("time_between_full_dump_ms = 15000"));
}

#[test]
fn config_init_writes_file() {
    let temp = TempDir::new().unwrap();
    kfzf(&temp).args(["config", "init"]).assert().success();
    assert!(temp.path().join("config.toml").exists());

    // Second init without --force leaves the file alone
    kfzf(&temp).args(["config", "init"]).assert().success();
}

#[test]
fn invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.toml"), "[store\nbroken").unwrap();

    kfzf(&temp)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn show_without_dump_fails() {
    let temp = TempDir::new().unwrap();
    kfzf(&temp)
        .args(["show", "pods"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No dump found"));
}

#[test]
fn show_rejects_unknown_resource() {
    let temp = TempDir::new().unwrap();
    kfzf(&temp).args(["show", "widgets"]).assert().failure();
}

#[test]
fn ingest_then_show_lists_keys() {
    let temp = TempDir::new().unwrap();
    ingest_events(&temp);

    assert!(temp.path().join("cache").join("test").join("pods").exists());

    kfzf(&temp)
        .args(["--cluster", "test", "show", "po"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop_web-2"))
        .stdout(predicate::str::contains("data_db-0"))
        .stdout(predicate::str::contains("shop_web-1").not());

    kfzf(&temp)
        .args(["--cluster", "test", "show", "namespaces"])
        .assert()
        .success()
        .stdout(predicate::str::diff("shop\n"));
}

#[test]
fn show_table_has_header() {
    let temp = TempDir::new().unwrap();
    ingest_events(&temp);

    kfzf(&temp)
        .args(["--cluster", "test", "show", "pods", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAMESPACE"))
        .stdout(predicate::str::contains("app=web"));
}

#[test]
fn status_runs() {
    let temp = TempDir::new().unwrap();
    ingest_events(&temp);

    kfzf(&temp)
        .args(["--cluster", "test", "status"])
        .assert()
        .success();
}
