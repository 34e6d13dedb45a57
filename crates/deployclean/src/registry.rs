pub mod json;

pub use self::json::JsonRegistry;

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::fs::FileSystemError;

/// Port for the record of installed packages
///
/// Deregistering a cleaned package makes the dependency manager treat it as not installed, so the
/// next update reinstalls it in full.
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
pub trait PackageRegistry: Send + Sync {
    /// Absolute install path of a registered package.
    fn install_path(&self, package_name: &str) -> Option<PathBuf>;

    /// Names of all registered packages, in registry order.
    fn package_names(&self) -> Vec<String>;

    /// Drops a package from the in-memory registry. Returns whether it was registered.
    fn deregister(&mut self, package_name: &str) -> bool;

    /// Writes pending changes back to storage
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the registry cannot be serialized or written.
    fn persist(&mut self) -> Result<(), RegistryError>;
}

#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("Package registry not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Package registry '{}' is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("Package registry cannot be serialized: {0}")]
    Serialize(Arc<serde_json::Error>),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}
