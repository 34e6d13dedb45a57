//! File system abstraction layer
//!
//! Every filesystem interaction of the library goes through the [`FileSystem`] port so the
//! pruning engine, the registry and the configuration loader can be exercised against mocks or
//! instrumented wrappers. [`real::RealFileSystem`] is the adapter used by the binary.

pub mod real;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

/// A node found while listing a directory.
///
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirectoryEntry {
    path: PathBuf,
    is_dir: bool,
}

impl DirectoryEntry {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Port for file system operations
///
/// Implementations must be usable from several threads at once: the clean service runs
/// independent packages on tokio's blocking pool.
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Read a file and return its contents as a string
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file cannot be read or is not valid UTF-8.
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Write data to a file, replacing whatever was there
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file cannot be written.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError>;

    /// Check if a path exists
    fn path_exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory, following symbolic links
    fn is_dir(&self, path: &Path) -> bool;

    /// Expand `~` and resolve the result to an absolute, canonical path
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the expanded path does not exist.
    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError>;

    /// List the immediate children of a directory
    ///
    /// Entries are returned sorted by path so that every walk over the same tree visits nodes in
    /// the same order.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the directory cannot be read.
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FileSystemError>;

    /// Resolve symbolic links, `.` and `..` into an absolute path
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if any component of the path does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FileSystemError>;

    /// Remove a single non-directory node
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] on any OS-level failure.
    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Remove an empty directory
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] on any OS-level failure, including a non-empty directory.
    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Get the directory holding the application's configuration file
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::HomeDirNotFound`] if no home directory can be determined.
    fn config_dir(&self) -> Result<PathBuf, FileSystemError>;
}

/// Errors that can occur during file system operations
#[derive(Error, Debug, Clone)]
pub enum FileSystemError {
    #[error("IO error: {0}")]
    IoError(Arc<io::Error>),

    #[error("Home directory not found")]
    HomeDirNotFound,
}

impl From<io::Error> for FileSystemError {
    fn from(error: io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}

impl FileSystemError {
    /// The OS-level error kind, if this error came from an IO call
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::IoError(e) => Some(e.kind()),
            Self::HomeDirNotFound => None,
        }
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        (**self).write_file(path, data)
    }

    fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        (**self).expand_path(path)
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FileSystemError> {
        (**self).list_directory(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        (**self).canonicalize(path)
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        (**self).remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        (**self).remove_dir(path)
    }

    fn config_dir(&self) -> Result<PathBuf, FileSystemError> {
        (**self).config_dir()
    }
}

#[cfg(test)]
impl MockFileSystem {
    /// Configures the mock to return `content` when `path` is read.
    pub(crate) fn mock_read_file<P, S>(&mut self, path: P, content: S)
    where
        PathBuf: From<P>,
        S: ToString,
    {
        let path_buf = PathBuf::from(path);
        let content_string = content.to_string();
        self.expect_read_file()
            .with(mockall::predicate::eq(path_buf))
            .returning(move |_| Ok(content_string.clone()));
    }

    pub(crate) fn mock_path_exists<P>(&mut self, path: P, exists: bool)
    where
        PathBuf: From<P>,
    {
        self.expect_path_exists()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(move |_| exists);
    }

    pub(crate) fn mock_config_dir_ok<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        let p = PathBuf::from(path);
        self.expect_config_dir().return_once(|| Ok(p));
    }

    /// Simulates finding `config.yaml` (and no `config.yml`) in `config_dir`.
    pub(crate) fn mock_config_file(&mut self, config_dir: &Path, config_yaml: &str) {
        let config_dir_owned = PathBuf::from(config_dir);
        let config_path = config_dir.join("config.yaml");

        self.expect_config_dir()
            .return_once(|| Ok(config_dir_owned));
        self.mock_path_exists(&config_path, true);
        self.mock_read_file(&config_path, config_yaml);

        self.mock_path_exists(config_dir.join("config.yml"), false);
    }

    pub(crate) fn mock_expand_path<P>(&mut self, input: P, output: P)
    where
        PathBuf: From<P>,
    {
        let input = PathBuf::from(input);
        let output = PathBuf::from(output);

        self.expect_expand_path()
            .with(mockall::predicate::eq(input))
            .return_once(|_| Ok(output));
    }

    /// Canonicalization that maps every path onto itself.
    pub(crate) fn mock_canonicalize_identity(&mut self) {
        self.expect_canonicalize()
            .returning(|path| Ok(path.to_path_buf()));
    }

    pub(crate) fn mock_canonicalize_missing<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        self.expect_canonicalize()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound).into()));
    }
}
