//! Terminal output for the clean run
//!
//! Every line the user sees goes through [`TerminalProgressReporter`]: a prefix (an emoji, or a
//! plain text marker on terminals that can't render one) followed by the message, colored when
//! colors are enabled. Errors go to stderr, everything else to stdout.
//!
//! ```rust,ignore
//! let reporter = TerminalProgressReporter::new(true);
//! reporter.report_progress("[1/2] twig/twig");
//! reporter.report_verbose("removing file /srv/app/vendor/twig/twig/README.md");
//! reporter.report_success("twig/twig cleaned, 12 path(s) removed");
//! ```

use std::fmt::Display;

use console::{Emoji, style};

// Define emojis with fallbacks for terminals that don't support Unicode
static ERROR_EMOJI: Emoji<'_, '_> = Emoji("❌ ", "[E] ");
static INFO_EMOJI: Emoji<'_, '_> = Emoji("ℹ️ ", "[I] ");
static PROGRESS_EMOJI: Emoji<'_, '_> = Emoji("🧹 ", " * ");
static SUGGESTION_EMOJI: Emoji<'_, '_> = Emoji("💡 ", "[?] ");
static SUCCESS_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "OK ");
static WARN_EMOJI: Emoji<'_, '_> = Emoji("⚠️ ", "[W] ");

const VERBOSE_INDENT: usize = 3;

/// Kinds of lines printed to the terminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MessageType {
    Error,
    Info,
    /// A package is being picked up
    Progress,
    Success,
    Suggestion,
    Warning,
}

/// Terminal reporter for consistent CLI output formatting
#[derive(Debug, Clone, Copy)]
pub struct TerminalProgressReporter {
    use_colors: bool,
}

impl TerminalProgressReporter {
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a status line with the prefix and styling of `message_type`.
    pub(crate) fn status_line(self, message_type: MessageType, message: impl Display) -> String {
        let prefix = match message_type {
            MessageType::Error => ERROR_EMOJI,
            MessageType::Info => INFO_EMOJI,
            MessageType::Progress => PROGRESS_EMOJI,
            MessageType::Success => SUCCESS_EMOJI,
            MessageType::Suggestion => SUGGESTION_EMOJI,
            MessageType::Warning => WARN_EMOJI,
        };

        if !self.use_colors {
            return format!("{prefix}{message}");
        }

        let styled = match message_type {
            MessageType::Error => style(message).for_stderr().red().bold().to_string(),
            MessageType::Info => style(message).blue().to_string(),
            MessageType::Progress => style(message).bold().to_string(),
            MessageType::Success => style(message).green().to_string(),
            MessageType::Suggestion => {
                return format!("{prefix}{}: {message}", style("Suggestion").yellow().bold());
            }
            MessageType::Warning => style(message).yellow().bold().to_string(),
        };

        format!("{prefix}{styled}")
    }

    /// Indented, unprefixed detail line (dimmed when colors are enabled).
    pub(crate) fn format_verbose(self, message: impl Display) -> String {
        let message = if self.use_colors {
            style(message).dim().to_string()
        } else {
            message.to_string()
        };
        format!("{:indent$}{message}", "", indent = VERBOSE_INDENT)
    }

    pub(crate) fn format_error(self, message: impl Display) -> String {
        self.status_line(MessageType::Error, message)
    }

    pub(crate) fn format_warning(self, message: impl Display) -> String {
        self.status_line(MessageType::Warning, message)
    }

    pub(crate) fn report_progress(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Progress, message));
    }

    pub(crate) fn report_verbose(self, message: impl Display) {
        println!("{}", self.format_verbose(message));
    }

    pub(crate) fn report_success(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Success, message));
    }

    pub(crate) fn report_suggestion(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Suggestion, message));
    }

    pub(crate) fn report_info(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Info, message));
    }

    pub(crate) fn report_warning(self, message: impl Display) {
        println!("{}", self.format_warning(message));
    }

    /// Errors go to stderr so scripts can tell them apart.
    pub(crate) fn report_error(self, message: impl Display) {
        eprintln!("{}", self.format_error(message));
    }
}
