// crates/cli/tests/cli_tests.rs
pub mod common;

use common::{get_command, get_command_with_config};
use predicates::prelude::*;
use test_common::{CONFIG_DIR_ENV, ConfigFile, TWIG, VendorTree};

#[test]
fn test_cli_help() {
    let mut cmd = get_command();
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "deploy-clean - Strip installed packages down to what deployment needs",
    ));
}

#[test]
fn test_cli_version() {
    let mut cmd = get_command();
    cmd.arg("--version");
    cmd.assert().success();
}

#[test]
fn test_cli_invalid_command() {
    let mut cmd = get_command();
    cmd.arg("invalid-command");
    cmd.assert().failure();
}

#[test]
fn test_cli_invalid_subcommand() {
    let mut cmd = get_command();
    cmd.args(["config", "invalid-subcommand"]);
    cmd.assert().failure();
}

#[test]
fn test_cli_missing_required_arg() {
    let mut cmd = get_command();
    cmd.arg("clean"); // Missing package names
    cmd.assert().failure();
}

#[test]
fn test_cli_verbose_and_quiet_conflict() {
    let mut cmd = get_command();
    cmd.args(["-v", "-q", "config", "validate"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_cli_missing_config_file() {
    let tree = VendorTree::new();
    let mut cmd = get_command();
    cmd.env(CONFIG_DIR_ENV, tree.config_dir());
    cmd.args(["config", "validate"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No configuration file found"));
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let tree = VendorTree::new().package(TWIG, &["src/Environment.php", "README.md"]);
    let config = ConfigFile::new(tree.vendor_dir()).rule(TWIG, &["src"]);

    let mut cmd = get_command_with_config(&tree, &config);
    cmd.args(["clean", TWIG, "--dry-run"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Dry run - removing file"));

    assert!(tree.package_dir(TWIG).join("README.md").exists());
}
