use assert_cmd::Command;
use test_common::{CONFIG_DIR_ENV, ConfigFile, LOG_ENV, VendorTree};

// Helper function to get a command instance
#[must_use]
pub fn get_command() -> Command {
    let mut cmd = Command::cargo_bin("deploy-clean").unwrap();
    cmd.env_remove(LOG_ENV);
    cmd
}

// Writes `config` into the tree's config directory and points the command at it
#[must_use]
pub fn get_command_with_config(tree: &VendorTree, config: &ConfigFile) -> Command {
    config.write_to(&tree.config_dir());

    let mut cmd = get_command();
    cmd.env(CONFIG_DIR_ENV, tree.config_dir());
    cmd.arg("--no-color");
    cmd
}
