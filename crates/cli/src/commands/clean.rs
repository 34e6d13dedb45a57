use std::io::IsTerminal;

use deployclean::{
    clean::{CleanService, CleanServiceImpl, CleanTargets},
    config::AppConfig,
    fs::real::RealFileSystem,
    registry::JsonRegistry,
};
use dialoguer::{Confirm, theme::SimpleTheme};
use tracing::info;

use crate::{
    cli::CleanArgs, event_processor::EventProcessor,
    terminal_progress_reporter::TerminalProgressReporter,
};

/// What to do before a clean run starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Proceed,
    Ask,
    Refuse,
}

/// Cleaning every package is only started unprompted with `--yes` or as a dry run.
fn confirmation(targets: &CleanTargets, yes: bool, dry_run: bool, interactive: bool) -> Confirmation {
    match targets {
        CleanTargets::Named(_) => Confirmation::Proceed,
        CleanTargets::All if yes || dry_run => Confirmation::Proceed,
        CleanTargets::All if interactive => Confirmation::Ask,
        CleanTargets::All => Confirmation::Refuse,
    }
}

pub(crate) async fn handle_clean(
    args: &CleanArgs,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
) -> i32 {
    info!("Cleaning packages: {:?}", args.packages);

    if config.validate().has_errors() {
        reporter.report_error("Configuration is invalid.");
        reporter.report_suggestion("Run `deploy-clean config validate` for details");
        return 1;
    }

    let fs = RealFileSystem;
    let registry = match JsonRegistry::load(fs, config.registry_file(), config.vendor_dir()) {
        Ok(registry) => registry,
        Err(e) => {
            reporter.report_error(e);
            return 1;
        }
    };
    let service = CleanServiceImpl::new(fs, registry, config.clone());

    run_clean(&service, args, config, reporter, std::io::stdin().is_terminal()).await
}

async fn run_clean<S: CleanService>(
    service: &S,
    args: &CleanArgs,
    config: &AppConfig,
    reporter: TerminalProgressReporter,
    interactive: bool,
) -> i32 {
    let targets = CleanTargets::from_args(&args.packages);

    match confirmation(&targets, args.yes, config.dry_run(), interactive) {
        Confirmation::Proceed => {}
        Confirmation::Ask => {
            let confirm = Confirm::with_theme(&SimpleTheme)
                .with_prompt(format!(
                    "Clean all {} package(s) with deployment rules under {}?",
                    config.deployment().len(),
                    config.vendor_dir().display()
                ))
                .default(false)
                .interact();

            match confirm {
                Ok(true) => {}
                Ok(false) => {
                    reporter.report_info("Clean cancelled.");
                    return 0;
                }
                Err(_) => {
                    reporter.report_error("Failed to read user input.");
                    return 1;
                }
            }
        }
        Confirmation::Refuse => {
            reporter.report_error("Refusing to clean all packages without confirmation.");
            reporter.report_suggestion("Pass --yes to confirm, or --dry-run to preview");
            return 1;
        }
    }

    let stream = service.clean(targets).await;
    EventProcessor::new(reporter, config.quiet())
        .process_events(stream)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use deployclean::clean::{CleanEvent, MockCleanService};
    use test_common::test_config_with_rules;

    fn args(packages: &[&str], yes: bool) -> CleanArgs {
        CleanArgs {
            packages: packages.iter().map(ToString::to_string).collect(),
            yes,
        }
    }

    fn reporter() -> TerminalProgressReporter {
        TerminalProgressReporter::new(false)
    }

    #[test]
    fn test_confirmation_rules() {
        let named = CleanTargets::from_args(&["twig/twig"]);
        assert_eq!(confirmation(&named, false, false, false), Confirmation::Proceed);

        let all = CleanTargets::All;
        assert_eq!(confirmation(&all, true, false, false), Confirmation::Proceed);
        assert_eq!(confirmation(&all, false, true, false), Confirmation::Proceed);
        assert_eq!(confirmation(&all, false, false, true), Confirmation::Ask);
        assert_eq!(confirmation(&all, false, false, false), Confirmation::Refuse);
    }

    #[tokio::test]
    async fn test_all_without_confirmation_never_cleans() {
        let mut service = MockCleanService::new();
        service.expect_clean().never();
        let config = test_config_with_rules("/srv/app/vendor", "twig/twig", &["src"]);

        let exit_code = run_clean(&service, &args(&["all"], false), &config, reporter(), false).await;

        assert_eq!(exit_code, 1);
    }

    #[tokio::test]
    async fn test_all_with_yes_cleans_everything() {
        let mut service = MockCleanService::new();
        service
            .expect_clean()
            .withf(|targets| *targets == CleanTargets::All)
            .times(1)
            .returning(|_| Box::pin(futures::stream::empty::<CleanEvent>()));
        let config = test_config_with_rules("/srv/app/vendor", "twig/twig", &["src"]);

        let exit_code = run_clean(&service, &args(&["ALL"], true), &config, reporter(), false).await;

        assert_eq!(exit_code, 0);
    }

    #[tokio::test]
    async fn test_named_packages_are_cleaned_without_asking() {
        let mut service = MockCleanService::new();
        service
            .expect_clean()
            .withf(|targets| {
                *targets == CleanTargets::Named(vec!["twig/twig".to_string(), "psr/log".to_string()])
            })
            .times(1)
            .returning(|_| Box::pin(futures::stream::empty::<CleanEvent>()));
        let config = test_config_with_rules("/srv/app/vendor", "twig/twig", &["src"]);

        let exit_code = run_clean(
            &service,
            &args(&["twig/twig", "psr/log", "twig/twig"], false),
            &config,
            reporter(),
            false,
        )
        .await;

        assert_eq!(exit_code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_refused() {
        let config = test_config_with_rules("relative/vendor", "twig/twig", &["src"]);

        let exit_code = handle_clean(&args(&["twig/twig"], true), &config, reporter()).await;

        assert_eq!(exit_code, 1);
    }
}
