//! Turning the clean event stream into terminal output
//!
//! The library already drops info, verbose and warning lines that the run's switches silence;
//! the processor only decides how the remaining events look and which exit code the run ends
//! with. Progress and per-package success lines are the CLI's own and are held back on quiet
//! runs.

use deployclean::clean::{CleanEvent, CleanSummary, EventStream};
use futures::StreamExt;
use tracing::debug;

use crate::terminal_progress_reporter::TerminalProgressReporter;

/// Prints clean events as they arrive and computes the exit code
#[derive(Debug)]
pub struct EventProcessor {
    reporter: TerminalProgressReporter,
    quiet: bool,
}

impl EventProcessor {
    pub fn new(reporter: TerminalProgressReporter, quiet: bool) -> Self {
        Self { reporter, quiet }
    }

    /// Consumes the stream, returning 1 if any error was reported or the run was not successful.
    pub async fn process_events(self, mut stream: EventStream) -> i32 {
        let mut exit_code = 0;

        while let Some(event) = stream.next().await {
            self.handle_event(event, &mut exit_code);
        }

        exit_code
    }

    fn handle_event(&self, event: CleanEvent, exit_code: &mut i32) {
        match event {
            CleanEvent::Started { package_count, .. } => {
                debug!(package_count, "clean started");
            }

            CleanEvent::Progress {
                step,
                total_steps,
                message,
                ..
            } => {
                if !self.quiet {
                    self.reporter
                        .report_progress(format!("[{step}/{total_steps}] {message}"));
                }
            }

            CleanEvent::Info { message, .. } => self.reporter.report_info(message),

            CleanEvent::Verbose { message, .. } => self.reporter.report_verbose(message),

            CleanEvent::Warning { message, .. } => self.reporter.report_warning(message),

            CleanEvent::Error { message, .. } => {
                self.reporter.report_error(message);
                *exit_code = 1;
            }

            CleanEvent::PackageCleaned {
                package_name,
                report,
                ..
            } => {
                if !self.quiet {
                    let verb = if report.is_dry_run() {
                        "would be removed"
                    } else {
                        "removed"
                    };
                    self.reporter.report_success(format!(
                        "{package_name}: {} path(s) {verb}, {} kept",
                        report.removed().len(),
                        report.kept().len()
                    ));
                }
            }

            CleanEvent::Completed { summary, .. } => {
                if !summary.is_success() {
                    *exit_code = 1;
                }
                self.report_summary(&summary);
            }
        }
    }

    fn report_summary(&self, summary: &CleanSummary) {
        if !summary.failed().is_empty() {
            self.reporter.report_error(format!(
                "Failed to clean {} package(s): {}",
                summary.failed().len(),
                summary.failed().join(", ")
            ));
        }

        if self.quiet {
            return;
        }

        if !summary.skipped().is_empty() {
            self.reporter.report_warning(format!(
                "Skipped {} package(s): {}",
                summary.skipped().len(),
                summary.skipped().join(", ")
            ));
        }

        let line = if summary.is_dry_run() {
            format!(
                "Dry run - {} package(s) would be cleaned, {} path(s) would be removed",
                summary.cleaned().len(),
                summary.removed()
            )
        } else {
            format!(
                "Cleaned {} package(s), removed {} path(s)",
                summary.cleaned().len(),
                summary.removed()
            )
        };
        if summary.is_success() {
            self.reporter.report_success(line);
        } else {
            self.reporter.report_info(line);
        }

        if !summary.deregistered().is_empty() {
            self.reporter.report_info(format!(
                "Deregistered {} package(s); they will be reinstalled in full on the next update",
                summary.deregistered().len()
            ));
        }
    }
}
