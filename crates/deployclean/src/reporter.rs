//! Diagnostic narration port
//!
//! The pruning engine narrates its decisions through a [`Reporter`] supplied by the caller. The
//! four severities follow the quiet/verbose switches of [`PruneOptions`]; the gating lives in
//! [`Gated`] so reporters themselves only have to render lines.

use std::sync::Arc;

use crate::prune::PruneOptions;

/// Severity of a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Verbose,
    Warning,
    Error,
}

/// Port for user-facing diagnostics
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn verbose(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => self.info(message),
            Severity::Verbose => self.verbose(message),
            Severity::Warning => self.warning(message),
            Severity::Error => self.error(message),
        }
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn verbose(&self, message: &str) {
        (**self).verbose(message);
    }

    fn warning(&self, message: &str) {
        (**self).warning(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn verbose(&self, message: &str) {
        (**self).verbose(message);
    }

    fn warning(&self, message: &str) {
        (**self).warning(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Applies the quiet/verbose switches before forwarding to the wrapped reporter.
///
/// `quiet` silences info and warning lines, `verbose` enables verbose lines, errors always pass.
#[derive(Debug, Clone)]
pub struct Gated<R> {
    inner: R,
    options: PruneOptions,
}

impl<R: Reporter> Gated<R> {
    pub fn new(inner: R, options: PruneOptions) -> Self {
        Self { inner, options }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Reporter> Reporter for Gated<R> {
    fn info(&self, message: &str) {
        if !self.options.quiet() {
            self.inner.info(message);
        }
    }

    fn verbose(&self, message: &str) {
        if self.options.verbose() {
            self.inner.verbose(message);
        }
    }

    fn warning(&self, message: &str) {
        if !self.options.quiet() {
            self.inner.warning(message);
        }
    }

    fn error(&self, message: &str) {
        self.inner.error(message);
    }
}

/// Reporter that only emits `tracing` events, for library users without a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(message);
    }

    fn verbose(&self, message: &str) {
        tracing::debug!(message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(message);
    }

    fn error(&self, message: &str) {
        tracing::error!(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_suppresses_info_and_warning_but_not_errors() {
        let mut inner = MockReporter::new();
        inner.expect_info().never();
        inner.expect_warning().never();
        inner.expect_verbose().never();
        inner.expect_error().times(1).return_const(());

        let gated = Gated::new(inner, PruneOptions::new(false, false, true));
        gated.info("hidden");
        gated.warning("hidden");
        gated.verbose("hidden");
        gated.error("shown");
    }

    #[test]
    fn test_dry_run_forces_verbose() {
        let mut inner = MockReporter::new();
        inner
            .expect_verbose()
            .with(mockall::predicate::eq("decision"))
            .times(1)
            .return_const(());

        let gated = Gated::new(inner, PruneOptions::new(true, false, false));
        gated.verbose("decision");
    }

    #[test]
    fn test_report_dispatches_by_severity() {
        let mut inner = MockReporter::new();
        inner.expect_warning().times(1).return_const(());
        inner.expect_info().times(1).return_const(());

        let gated = Gated::new(inner, PruneOptions::default());
        gated.report(Severity::Warning, "w");
        gated.report(Severity::Info, "i");
    }
}
