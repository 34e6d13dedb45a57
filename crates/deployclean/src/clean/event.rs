use std::{fmt, pin::Pin, time::SystemTime};

use futures::Stream;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    prune::{PruneOptions, PruneReport},
    reporter::Reporter,
};

use super::{CleanError, CleanSummary};

pub type EventStream = Pin<Box<dyn Stream<Item = CleanEvent> + Send>>;

/// Identifies the operation an event belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    operation_id: Uuid,
    timestamp: SystemTime,
}

impl EventMetadata {
    fn new() -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
        }
    }

    fn touch_and_clone(&self) -> Self {
        Self {
            operation_id: self.operation_id,
            timestamp: SystemTime::now(),
        }
    }

    #[must_use]
    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }
}

/// Events emitted while cleaning packages
#[derive(Debug, Clone)]
pub enum CleanEvent {
    Started {
        metadata: EventMetadata,
        package_count: usize,
    },

    /// One package has been picked up
    Progress {
        metadata: EventMetadata,
        step: usize,
        total_steps: usize,
        message: String,
    },

    Info {
        metadata: EventMetadata,
        message: String,
    },

    /// Only sent for verbose runs
    Verbose {
        metadata: EventMetadata,
        message: String,
    },

    Warning {
        metadata: EventMetadata,
        message: String,
    },

    /// Error occurred, the remaining packages are still processed
    Error {
        metadata: EventMetadata,
        error: Option<CleanError>,
        message: String,
    },

    PackageCleaned {
        metadata: EventMetadata,
        package_name: String,
        report: PruneReport,
    },

    Completed {
        metadata: EventMetadata,
        summary: CleanSummary,
    },
}

impl CleanEvent {
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::Started { metadata, .. }
            | Self::Progress { metadata, .. }
            | Self::Info { metadata, .. }
            | Self::Verbose { metadata, .. }
            | Self::Warning { metadata, .. }
            | Self::Error { metadata, .. }
            | Self::PackageCleaned { metadata, .. }
            | Self::Completed { metadata, .. } => metadata,
        }
    }
}

/// Sends events of one operation, dropping lines the quiet/verbose switches silence
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    metadata: EventMetadata,
    options: PruneOptions,
    tx: mpsc::Sender<CleanEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::Sender<CleanEvent>, options: PruneOptions) -> Self {
        Self {
            tx,
            options,
            metadata: EventMetadata::new(),
        }
    }

    pub(crate) async fn send_started(&self, package_count: usize) {
        let metadata = self.metadata.touch_and_clone();
        tracing::trace!(operation_id = %metadata.operation_id, package_count, "clean started");
        let _ = self
            .tx
            .send(CleanEvent::Started {
                metadata,
                package_count,
            })
            .await;
    }

    pub(crate) async fn send_progress(
        &self,
        step: usize,
        total_steps: usize,
        message: impl fmt::Display,
    ) {
        let metadata = self.metadata.touch_and_clone();
        let message = message.to_string();
        tracing::trace!(operation_id = %metadata.operation_id, step, total_steps, message);
        let _ = self
            .tx
            .send(CleanEvent::Progress {
                metadata,
                step,
                total_steps,
                message,
            })
            .await;
    }

    pub(crate) async fn send_info(&self, message: impl fmt::Display) {
        if !self.options.quiet() {
            let _ = self.tx.send(self.info(message)).await;
        }
    }

    pub(crate) async fn send_verbose(&self, message: impl fmt::Display) {
        if self.options.verbose() {
            let _ = self.tx.send(self.verbose(message)).await;
        }
    }

    pub(crate) async fn send_warning(&self, message: impl fmt::Display) {
        let message = message.to_string();
        tracing::warn!(operation_id = %self.metadata.operation_id, message);
        if !self.options.quiet() {
            let _ = self.tx.send(self.warning(message)).await;
        }
    }

    pub(crate) async fn send_error(&self, error: CleanError) {
        tracing::error!(operation_id = %self.metadata.operation_id, %error);
        let _ = self.tx.send(self.error(Some(error), None::<String>)).await;
    }

    pub(crate) async fn send_cleaned(&self, package_name: &str, report: PruneReport) {
        let metadata = self.metadata.touch_and_clone();
        tracing::trace!(
            operation_id = %metadata.operation_id,
            package_name,
            removed = report.removed().len(),
            "package cleaned"
        );
        let _ = self
            .tx
            .send(CleanEvent::PackageCleaned {
                metadata,
                package_name: package_name.to_string(),
                report,
            })
            .await;
    }

    pub(crate) async fn send_completed(&self, summary: CleanSummary) {
        let metadata = self.metadata.touch_and_clone();
        tracing::trace!(
            operation_id = %metadata.operation_id,
            cleaned = summary.cleaned().len(),
            failed = summary.failed().len(),
            "clean completed"
        );
        let _ = self.tx.send(CleanEvent::Completed { metadata, summary }).await;
    }

    fn info(&self, message: impl fmt::Display) -> CleanEvent {
        CleanEvent::Info {
            metadata: self.metadata.touch_and_clone(),
            message: message.to_string(),
        }
    }

    fn verbose(&self, message: impl fmt::Display) -> CleanEvent {
        CleanEvent::Verbose {
            metadata: self.metadata.touch_and_clone(),
            message: message.to_string(),
        }
    }

    fn warning(&self, message: impl fmt::Display) -> CleanEvent {
        CleanEvent::Warning {
            metadata: self.metadata.touch_and_clone(),
            message: message.to_string(),
        }
    }

    fn error(&self, error: Option<CleanError>, message: Option<impl fmt::Display>) -> CleanEvent {
        let message = match (&error, message) {
            (_, Some(message)) => message.to_string(),
            (Some(error), None) => error.to_string(),
            (None, None) => String::new(),
        };
        CleanEvent::Error {
            metadata: self.metadata.touch_and_clone(),
            error,
            message,
        }
    }

    /// Sends from a thread outside the async runtime, such as tokio's blocking pool.
    fn send_blocking(&self, event: CleanEvent) {
        let _ = self.tx.blocking_send(event);
    }
}

/// Forwards engine narration into the event stream
///
/// Must only be used from blocking threads: every line is sent with
/// [`mpsc::Sender::blocking_send`]. Gating is left to the pruner's own [`Gated`] wrapper.
///
/// [`Gated`]: crate::reporter::Gated
#[derive(Debug, Clone)]
pub(crate) struct EventReporter {
    sender: EventSender,
}

impl EventReporter {
    pub(crate) fn new(sender: EventSender) -> Self {
        Self { sender }
    }
}

impl Reporter for EventReporter {
    fn info(&self, message: &str) {
        self.sender.send_blocking(self.sender.info(message));
    }

    fn verbose(&self, message: &str) {
        self.sender.send_blocking(self.sender.verbose(message));
    }

    fn warning(&self, message: &str) {
        self.sender.send_blocking(self.sender.warning(message));
    }

    fn error(&self, message: &str) {
        self.sender.send_blocking(self.sender.error(None, Some(message)));
    }
}
