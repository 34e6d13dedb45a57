pub(crate) mod clean;
pub(crate) mod config;

use deployclean::config::AppConfig;
use tracing::debug;

use crate::{
    cli::{ClapCommands, ConfigSubcommands},
    terminal_progress_reporter::TerminalProgressReporter,
};

/// Primary command dispatcher that routes to the appropriate command handler
pub async fn dispatch_command(
    command: &ClapCommands,
    config: &AppConfig,
    original_config: AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Dispatching command: {:?}", command);

    match command {
        ClapCommands::Clean(args) => clean::handle_clean(args, config, reporter).await,
        ClapCommands::Config(config_cmd) => {
            dispatch_config_command(&config_cmd.command, &original_config, reporter)
        }
    }
}

/// Handle configuration management commands
fn dispatch_config_command(
    command: &ConfigSubcommands,
    original_config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    debug!("Handling config command: {:?}", command);

    match command {
        ConfigSubcommands::Validate => config::handle_validate(original_config, reporter),
    }
}
