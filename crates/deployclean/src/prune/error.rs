use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fs::FileSystemError;

use super::report::PruneReport;

/// Errors returned by [`Pruner`](super::Pruner)
#[derive(Error, Debug, Clone)]
pub enum PruneError {
    /// The root boundary is unusable; nothing was traversed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A delete target escaped a safety boundary; the call was aborted.
    #[error(transparent)]
    UnsafeDelete(#[from] UnsafeDeleteError),

    /// The walk finished, but some nodes could not be removed.
    #[error("Pruning finished with {} failed removal(s)", .0.failures().len())]
    Incomplete(PruneReport),
}

impl PruneError {
    /// The partial report of an incomplete run.
    #[must_use]
    pub fn report(&self) -> Option<&PruneReport> {
        match self {
            Self::Incomplete(report) => Some(report),
            Self::Configuration(_) | Self::UnsafeDelete(_) => None,
        }
    }
}

/// A delete target failed a containment check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Remove '{}' blocked: {reason}", .path.display())]
pub struct UnsafeDeleteError {
    path: PathBuf,
    reason: UnsafeReason,
}

impl UnsafeDeleteError {
    pub(crate) fn new(path: impl Into<PathBuf>, reason: UnsafeReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn reason(&self) -> &UnsafeReason {
        &self.reason
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsafeReason {
    #[error("refusing to delete the filesystem root")]
    FilesystemRoot,

    #[error("path is outside of the root boundary '{}'", .0.display())]
    OutsideRoot(PathBuf),

    #[error("path is outside of the call boundary '{}'", .0.display())]
    OutsideJail(PathBuf),

    #[error("call boundary '{}' cannot be resolved", .0.display())]
    UnresolvableJail(PathBuf),
}

/// An OS-level failure while removing (or listing) one node
#[derive(Error, Debug, Clone)]
#[error("Failed to remove '{}': {source}", .path.display())]
pub struct DeleteError {
    path: PathBuf,
    #[source]
    source: FileSystemError,
}

impl DeleteError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: FileSystemError) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn cause(&self) -> &FileSystemError {
        &self.source
    }
}
