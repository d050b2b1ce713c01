//! Integration tests for the `smx` binary.
//!
//! Each test points `--config` at a scratch directory with update checks and
//! pings disabled, so no network access is needed.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_config(tmp: &TempDir) -> std::path::PathBuf {
    let path = tmp.path().join("config.json");
    let config = serde_json::json!({
        "output_dir": tmp.path().join("out"),
        "base_url": "https://example.com",
        "robots_path": tmp.path().join("robots.txt"),
        "check_updates": false,
        "ping_on_update": false,
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();
    path
}

fn smx(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smx"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run smx")
}

#[test]
fn integration_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_smx"))
        .arg("version")
        .output()
        .expect("failed to run smx");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    assert!(stdout.contains("OS:"));
}

#[test]
fn integration_add_then_duplicate() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);

    let output = smx(&config, &["add", "https://example.com/a", "--priority", "0.7"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added URL: https://example.com/a"));
    assert!(tmp.path().join("out").join("sitemap_1.xml").exists());
    assert!(tmp.path().join("out").join("sitemap_index.xml").exists());

    let output = smx(&config, &["add", "https://example.com/a"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}

#[test]
fn integration_robots_rejection_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);
    std::fs::write(tmp.path().join("robots.txt"), "User-agent: *\nDisallow: /private\n").unwrap();

    let output = smx(&config, &["add", "https://example.com/private/x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("robots.txt"));
}

#[test]
fn integration_invalid_changefreq_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);

    let output = smx(&config, &["add", "https://example.com/a", "--changefreq", "sometimes"]);
    assert!(!output.status.success());
    assert!(!tmp.path().join("out").join("sitemap_1.xml").exists());
}

#[test]
fn integration_create_and_stats() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);

    assert!(smx(&config, &["add", "https://example.com/a"]).status.success());
    let output = smx(&config, &["create"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sitemap_2.xml"));

    let output = smx(&config, &["stats"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Sitemaps: 2"));
    assert!(stdout.contains("Total URLs: 1"));
}

#[test]
fn integration_config_get_and_set() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);

    let output = smx(&config, &["config", "default_priority", "0.8"]);
    assert!(output.status.success());

    let output = smx(&config, &["config", "default_priority"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0.8");

    let output = smx(&config, &["config", "colour", "blue"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown config key"));

    let output = smx(&config, &["config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"default_priority\": 0.8"));
    assert!(stdout.contains("Config file:"));
}

#[test]
fn integration_config_repairs_invalid_base_url() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.json");
    let broken = serde_json::json!({
        "output_dir": tmp.path().join("out"),
        "base_url": "example.com",
        "robots_path": tmp.path().join("robots.txt"),
        "check_updates": false,
        "ping_on_update": false,
    });
    std::fs::write(&config, serde_json::to_vec_pretty(&broken).unwrap()).unwrap();

    let output = smx(&config, &["stats"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("base_url"));

    let output = smx(&config, &["config"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"base_url\": \"example.com\""));

    let output = smx(&config, &["config", "base_url", "https://example.com"]);
    assert!(output.status.success(), "{output:?}");

    let output = smx(&config, &["config", "base_url"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "https://example.com");

    let output = smx(&config, &["stats"]);
    assert!(output.status.success(), "{output:?}");
}
