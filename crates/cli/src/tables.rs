use comfy_table::{
    ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL_CONDENSED,
};
use deployclean::validation::{ValidationIssue, ValidationLevel};

use crate::terminal_progress_reporter::TerminalProgressReporter;

const VALIDATION_HEADER: [&str; 4] = ["Category", "Field", "Message", "Suggestion"];

/// Table of configuration validation issues, errors first
pub(crate) struct ValidationTableReporter {
    table: Table,
}

impl ValidationTableReporter {
    pub(crate) fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(VALIDATION_HEADER);

        Self { table }
    }

    pub(crate) fn add_issues<'a>(
        &mut self,
        issues: impl IntoIterator<Item = &'a ValidationIssue>,
        reporter: TerminalProgressReporter,
    ) -> &mut Self {
        for issue in issues {
            let category = match issue.level() {
                ValidationLevel::Error => reporter.format_error(issue.category()),
                ValidationLevel::Warning => reporter.format_warning(issue.category()),
            };
            self.table.add_row(vec![
                category,
                issue.field().to_string(),
                issue.message().to_string(),
                issue.suggestion().unwrap_or_default().to_string(),
            ]);
        }

        self
    }

    pub(crate) fn render(&self) -> String {
        self.table.to_string()
    }

    pub(crate) fn print(&self) {
        eprintln!("{}", self.render());
    }
}
