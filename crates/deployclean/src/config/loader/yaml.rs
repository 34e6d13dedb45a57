use std::path::PathBuf;

use config::FileFormat;
use tracing::debug;

use crate::{config::AppConfig, fs::FileSystem};

use super::{ConfigLoadError, ConfigLoader};

const CONFIG_FILE_NAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// Loads `config.yaml` (or `config.yml`) from the file system's config directory
pub struct YamlLoader<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> YamlLoader<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> ConfigLoader for YamlLoader<'_, F> {
    fn load_config(&self) -> Result<AppConfig, ConfigLoadError> {
        let mut config_paths = self
            .find_config_file_paths()
            .map_err(|searched| ConfigLoadError::NotFound { searched })?;

        if config_paths.len() > 1 {
            return Err(ConfigLoadError::MultipleFound(
                config_paths
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            ));
        }
        let Some(config_path) = config_paths.pop() else {
            return Err(ConfigLoadError::NotFound {
                searched: self.fs.config_dir()?,
            });
        };
        debug!(path = %config_path.display(), "loading configuration");

        let file_contents = self.fs.read_file(&config_path)?;

        let config = config::Config::builder()
            .add_source(config::File::from_str(&file_contents, FileFormat::Yaml))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // `~` expansion only succeeds for existing paths; anything else is left for validation.
        if let Ok(expanded) = self.fs.expand_path(app_config.vendor_dir()) {
            app_config.vendor_dir = expanded;
        }
        if let Some(registry_file) = app_config.registry_file.as_deref() {
            if let Ok(expanded) = self.fs.expand_path(registry_file) {
                app_config.registry_file = Some(expanded);
            }
        }

        Ok(app_config)
    }

    fn find_config_file_paths(&self) -> Result<Vec<PathBuf>, PathBuf> {
        let mut paths = Vec::new();

        if let Ok(config_dir) = self.fs.config_dir() {
            for name in CONFIG_FILE_NAMES {
                let candidate = config_dir.join(name);
                if self.fs.path_exists(&candidate) {
                    paths.push(candidate);
                }
            }

            if paths.is_empty() {
                return Err(config_dir);
            }
        }

        Ok(paths)
    }
}
