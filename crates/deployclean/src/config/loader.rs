pub mod yaml;

pub use self::yaml::YamlLoader;

use std::path::PathBuf;

use thiserror::Error;

use crate::{config::AppConfig, fs::FileSystemError};

/// Port for loading configuration from disk
///
#[cfg_attr(test, mockall::automock)]
pub trait ConfigLoader: Send + Sync {
    /// Load configuration from the standard location
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] when no file, or more than one, is found, or when the file
    /// does not parse into an [`AppConfig`].
    fn load_config(&self) -> Result<AppConfig, ConfigLoadError>;

    /// Find the existing configuration file paths
    ///
    /// # Errors
    ///
    /// Returns the searched directory when it holds no configuration file.
    fn find_config_file_paths(&self) -> Result<Vec<PathBuf>, PathBuf>;
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error(transparent)]
    FileSystemError(#[from] FileSystemError),

    #[error("No configuration file found in: {}", searched.display())]
    NotFound { searched: PathBuf },

    #[error("Multiple configuration files found: {}", .0.join(", "))]
    MultipleFound(Vec<String>),

    #[error(transparent)]
    ConfigError(#[from] ::config::ConfigError),
}

/// Applies runtime CLI arguments on top of the configuration read from the config file.
///
pub trait ApplyToConfig {
    /// Implement this such that the arguments in `self` override the loaded configuration.
    ///
    fn apply_to_config(&self, config: AppConfig) -> AppConfig;
}
