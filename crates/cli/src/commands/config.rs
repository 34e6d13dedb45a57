use deployclean::config::AppConfig;
use tracing::info;

use crate::{tables::ValidationTableReporter, terminal_progress_reporter::TerminalProgressReporter};

pub(crate) fn handle_validate(original_config: &AppConfig, reporter: TerminalProgressReporter) -> i32 {
    info!("Validating configuration");

    let issues = original_config.validate();

    if issues.is_empty() {
        reporter.report_success("Configuration is valid.");
        return 0;
    }

    ValidationTableReporter::new()
        .add_issues(issues.errors(), reporter)
        .add_issues(issues.warnings(), reporter)
        .print();

    if issues.has_errors() {
        reporter.report_error("Validation failed.");
        1
    } else {
        reporter.report_warning(format!(
            "Configuration is valid with {} warning(s).",
            issues.len()
        ));
        0
    }
}
