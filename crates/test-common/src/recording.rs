//! Port implementations that record what the library asked of them.

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use deployclean::{
    fs::{DirectoryEntry, FileSystem, FileSystemError, real::RealFileSystem},
    reporter::{Reporter, Severity},
};

/// Reporter keeping every line it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines of one severity.
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, severity: Severity, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn verbose(&self, message: &str) {
        self.push(Severity::Verbose, message);
    }

    fn warning(&self, message: &str) {
        self.push(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }
}

/// A removal the library asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalCall {
    File(PathBuf),
    Dir(PathBuf),
}

impl RemovalCall {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Dir(path) => path,
        }
    }
}

/// Real file system that records every removal call and can be told to fail some of them.
#[derive(Debug, Clone, Default)]
pub struct RecordingFileSystem {
    inner: RealFileSystem,
    removals: Arc<Mutex<Vec<RemovalCall>>>,
    failing: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl RecordingFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes removing `path` fail with a permission error.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.failing.lock().unwrap().insert(path.into());
    }

    /// # Panics
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn removals(&self) -> Vec<RemovalCall> {
        self.removals.lock().unwrap().clone()
    }

    fn record(&self, call: RemovalCall) -> Result<(), FileSystemError> {
        let denied = self.failing.lock().unwrap().contains(call.path());
        self.removals.lock().unwrap().push(call);
        if denied {
            Err(io::Error::from(io::ErrorKind::PermissionDenied).into())
        } else {
            Ok(())
        }
    }
}

impl FileSystem for RecordingFileSystem {
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError> {
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        self.inner.write_file(path, data)
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.inner.path_exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        self.inner.expand_path(path)
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FileSystemError> {
        self.inner.list_directory(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        self.inner.canonicalize(path)
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        self.record(RemovalCall::File(path.to_path_buf()))?;
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        self.record(RemovalCall::Dir(path.to_path_buf()))?;
        self.inner.remove_dir(path)
    }

    fn config_dir(&self) -> Result<PathBuf, FileSystemError> {
        self.inner.config_dir()
    }
}
