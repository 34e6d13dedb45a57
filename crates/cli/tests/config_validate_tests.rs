pub mod common;

use std::fs;

use common::get_command_with_config;
use predicates::prelude::*;
use test_common::{ConfigFile, PSR_LOG, TWIG, VendorTree};

#[test]
fn test_validate_valid_config() {
    let tree = VendorTree::new();
    let config = ConfigFile::new(tree.vendor_dir())
        .rule(TWIG, &["src", "LICENSE", "*.md"])
        .rule(PSR_LOG, &["src"]);

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["config", "validate"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid."));
}

#[test]
fn test_validate_warnings_only() {
    let tree = VendorTree::new();
    let config = ConfigFile::new(tree.vendor_dir());

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["config", "validate"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("No package has deployment rules"));
}

#[test]
fn test_validate_missing_vendor_dir() {
    let tree = VendorTree::new();
    fs::create_dir_all(tree.config_dir()).unwrap();
    fs::write(
        tree.config_dir().join("config.yaml"),
        "deployment:\n  twig/twig:\n    - src\n",
    )
    .unwrap();

    let mut cmd = common::get_command();
    cmd.env(test_common::CONFIG_DIR_ENV, tree.config_dir());
    cmd.args(["config", "validate"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing field `vendor_dir`"));
}

#[test]
fn test_validate_relative_vendor_dir() {
    let tree = VendorTree::new();
    let config = ConfigFile::new("relative/vendor").rule(TWIG, &["src"]);

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["config", "validate"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("is not absolute"))
        .stderr(predicate::str::contains("Validation failed."));
}

#[test]
fn test_validate_bad_rules() {
    let tree = VendorTree::new();
    let config = ConfigFile::new(tree.vendor_dir())
        .rule("Twig", &["src"])
        .rule(PSR_LOG, &["../outside", "/etc"]);

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["config", "validate"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("'Twig' is not a valid package name"))
        .stderr(predicate::str::contains("deployment.psr/log"));
}

#[test]
fn test_validate_ignores_cli_overrides() {
    let tree = VendorTree::new();
    let config = ConfigFile::new("relative/vendor").rule(TWIG, &["src"]);

    let vendor_dir = tree.vendor_dir();
    let mut cmd = get_command_with_config(&tree, &config);
    cmd.arg("--vendor-dir").arg(&vendor_dir).args(["config", "validate"]);

    cmd.assert().failure();
}

#[test]
fn test_validate_multiple_config_files() {
    let tree = VendorTree::new();
    let config = ConfigFile::new(tree.vendor_dir()).rule(TWIG, &["src"]);
    let path = config.write_to(&tree.config_dir());
    fs::copy(&path, tree.config_dir().join("config.yml")).unwrap();

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["config", "validate"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Multiple configuration files found"));
}
