mod cli;
mod commands;
mod config;
mod event_processor;
mod tables;
mod terminal_progress_reporter;

use std::process;

use clap::Parser;
use deployclean::{
    config::{ApplyToConfig, ConfigLoader, YamlLoader},
    fs::real::RealFileSystem,
};
use terminal_progress_reporter::TerminalProgressReporter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{cli::ClapCli, commands::dispatch_command};

/// Environment variable holding the log filter, e.g. `DEPLOY_CLEAN_LOG=deployclean=debug`
const LOG_ENV: &str = "DEPLOY_CLEAN_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, off unless asked for, so they never mix with reporter output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .init();

    let args = ClapCli::parse();
    debug!("CLI arguments: {:#?}", &args);

    let fs = RealFileSystem;

    // Use `config` for cleaning; use `original_config` for `config` commands, where we want to
    // deal strictly with the config file.
    let (config, original_config) = {
        // 1. Load config.yaml
        let config = YamlLoader::new(&fs).load_config()?;

        // 2. Apply CLI args to config (overriding)
        (args.apply_to_config(config.clone()), config)
    };

    debug!("Final config: {:#?}", &config);

    let reporter = TerminalProgressReporter::new(config.use_colors());

    // 3. Dispatch and execute the requested command
    let exit_code = dispatch_command(&args.command, &config, original_config, reporter).await;

    process::exit(exit_code)
}
