use deployclean::config::{AppConfig, ApplyToConfig};

use crate::cli::ClapCli;

impl ApplyToConfig for ClapCli {
    fn apply_to_config(&self, mut config: AppConfig) -> AppConfig {
        // Override vendor directory if specified
        if let Some(dir) = self.vendor_dir.as_ref() {
            *config.vendor_dir_mut() = std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
        }

        // Flags only ever switch behavior on top of the file
        if self.dry_run {
            *config.dry_run_mut() = true;
        }
        if self.no_deregister {
            *config.deregister_mut() = false;
        }
        if self.verbose {
            *config.verbose_mut() = true;
            *config.quiet_mut() = false;
        }
        if self.quiet {
            *config.quiet_mut() = true;
            *config.verbose_mut() = false;
        }
        if self.no_color {
            *config.use_colors_mut() = false;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use deployclean::config::AppConfigBuilder;
    use std::path::{Path, PathBuf};

    // Helper to create CLI args
    #[derive(Default)]
    struct FakeArgs {
        vendor_dir: Option<&'static str>,
        dry_run: bool,
        no_deregister: bool,
        verbose: bool,
        quiet: bool,
        no_color: bool,
    }

    impl FakeArgs {
        fn into_cli(self) -> ClapCli {
            let mut args = vec!["deploy-clean"];

            if let Some(dir) = self.vendor_dir {
                args.push("--vendor-dir");
                args.push(dir);
            }
            if self.dry_run {
                args.push("--dry-run");
            }
            if self.no_deregister {
                args.push("--no-deregister");
            }
            if self.verbose {
                args.push("--verbose");
            }
            if self.quiet {
                args.push("--quiet");
            }
            if self.no_color {
                args.push("--no-color");
            }

            // Add a required subcommand
            args.push("config");
            args.push("validate");

            ClapCli::parse_from(args)
        }
    }

    fn original() -> AppConfig {
        AppConfigBuilder::default()
            .vendor_dir("/original/vendor")
            .rule("twig/twig", &["src"])
            .max_parallel_unchecked(3)
            .build()
    }

    #[test]
    fn test_apply_cli_args_vendor_dir_override() {
        let args = FakeArgs {
            vendor_dir: Some("/cli/vendor"),
            ..FakeArgs::default()
        }
        .into_cli();

        let updated = args.apply_to_config(original());

        assert_eq!(updated.vendor_dir(), Path::new("/cli/vendor"));
        assert!(!updated.dry_run());
        assert!(updated.deregister());
        assert!(updated.use_colors());
    }

    #[test]
    fn test_apply_cli_args_relative_vendor_dir_is_made_absolute() {
        let args = FakeArgs {
            vendor_dir: Some("vendor"),
            ..FakeArgs::default()
        }
        .into_cli();

        let updated = args.apply_to_config(original());

        assert!(updated.vendor_dir().is_absolute());
        assert!(updated.vendor_dir().ends_with("vendor"));
    }

    #[test]
    fn test_apply_cli_args_switches() {
        let args = FakeArgs {
            dry_run: true,
            no_deregister: true,
            no_color: true,
            ..FakeArgs::default()
        }
        .into_cli();

        let updated = args.apply_to_config(original());

        assert!(updated.dry_run());
        assert!(updated.verbose(), "a dry run is verbose");
        assert!(!updated.deregister());
        assert!(!updated.use_colors());
    }

    #[test]
    fn test_apply_cli_args_quiet_overrides_verbose_file_setting() {
        let config = AppConfigBuilder::default()
            .vendor_dir("/original/vendor")
            .verbose(true)
            .build();
        let args = FakeArgs {
            quiet: true,
            ..FakeArgs::default()
        }
        .into_cli();

        let updated = args.apply_to_config(config);

        assert!(updated.quiet());
        assert!(!updated.verbose());
    }

    #[test]
    fn test_apply_cli_args_no_overrides_keep_file_settings() {
        let config = AppConfigBuilder::default()
            .vendor_dir("/original/vendor")
            .dry_run(true)
            .deregister(false)
            .use_colors(false)
            .build();

        let updated = FakeArgs::default().into_cli().apply_to_config(config);

        assert_eq!(updated.vendor_dir(), &PathBuf::from("/original/vendor"));
        assert!(updated.dry_run());
        assert!(!updated.deregister());
        assert!(!updated.use_colors());
    }

    #[test]
    fn test_apply_cli_args_preserves_other_settings() {
        let args = FakeArgs {
            vendor_dir: Some("/cli/vendor"),
            verbose: true,
            ..FakeArgs::default()
        }
        .into_cli();

        let updated = args.apply_to_config(original());

        assert_eq!(updated.max_parallel().get(), 3);
        assert_eq!(
            updated.rules_for("twig/twig"),
            Some(&["src".to_string()][..])
        );
    }
}
