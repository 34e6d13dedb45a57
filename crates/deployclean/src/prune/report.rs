use std::path::{Path, PathBuf};

use super::error::DeleteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One node removed (or, in a dry run, one node that would have been removed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    path: PathBuf,
    kind: EntryKind,
}

impl Removal {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// What a prune call decided, in traversal order
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    dry_run: bool,
    removed: Vec<Removal>,
    kept: Vec<PathBuf>,
    failures: Vec<DeleteError>,
}

impl PruneReport {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub fn removed(&self) -> &[Removal] {
        &self.removed
    }

    pub fn removed_paths(&self) -> impl Iterator<Item = &Path> {
        self.removed.iter().map(Removal::path)
    }

    /// Entries retained because a pattern named them directly.
    #[must_use]
    pub fn kept(&self) -> &[PathBuf] {
        &self.kept
    }

    #[must_use]
    pub fn failures(&self) -> &[DeleteError] {
        &self.failures
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record_removal(&mut self, path: &Path, kind: EntryKind) {
        self.removed.push(Removal {
            path: path.to_path_buf(),
            kind,
        });
    }

    pub(crate) fn record_kept(&mut self, path: &Path) {
        self.kept.push(path.to_path_buf());
    }

    pub(crate) fn record_failure(&mut self, failure: DeleteError) {
        self.failures.push(failure);
    }
}
