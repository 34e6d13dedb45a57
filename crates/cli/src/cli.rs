// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// deploy-clean - Strip installed packages down to what deployment needs
///
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ClapCli {
    /// Report what would be removed without removing anything (implies --verbose)
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) dry_run: bool,

    /// Keep cleaned packages in the installed-package registry
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) no_deregister: bool,

    /// Show every kept and removed path
    ///
    #[clap(long, short = 'v', global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    /// Only report errors
    ///
    #[clap(
        long,
        short = 'q',
        global = true,
        default_value_t = false,
        conflicts_with = "verbose"
    )]
    pub(crate) quiet: bool,

    /// Disable colored output
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Override the vendor directory from config
    ///
    #[clap(long, global = true, value_name = "DIR")]
    pub(crate) vendor_dir: Option<PathBuf>,

    /// Subcommand to execute
    ///
    #[clap(subcommand)]
    pub(crate) command: ClapCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ClapCommands {
    /// Remove everything the deployment rules don't keep from installed packages
    ///
    Clean(CleanArgs),

    /// Configuration management commands
    ///
    Config(ConfigCommands),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CleanArgs {
    /// Packages to clean (`vendor/name`), or `all` for every package with deployment rules
    #[clap(required = true)]
    pub(crate) packages: Vec<String>,

    /// Don't ask before cleaning all packages
    #[clap(long, short = 'y', default_value_t = false)]
    pub(crate) yes: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConfigCommands {
    #[clap(subcommand)]
    pub(crate) command: ConfigSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ConfigSubcommands {
    /// Validate the deploy-clean configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_with_global_flags() {
        let cli = ClapCli::parse_from([
            "deploy-clean",
            "clean",
            "twig/twig",
            "psr/log",
            "--dry-run",
            "--vendor-dir",
            "/srv/vendor",
        ]);

        assert!(cli.dry_run);
        assert_eq!(cli.vendor_dir, Some(PathBuf::from("/srv/vendor")));
        match cli.command {
            ClapCommands::Clean(args) => {
                assert_eq!(args.packages, vec!["twig/twig", "psr/log"]);
                assert!(!args.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_clean_requires_packages() {
        assert!(ClapCli::try_parse_from(["deploy-clean", "clean"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(ClapCli::try_parse_from(["deploy-clean", "-v", "-q", "config", "validate"]).is_err());
    }
}
