//! `AppConfig` and config file helpers.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use deployclean::config::{AppConfig, AppConfigBuilder};

/// Creates a configuration rooted at `vendor_dir` with colors disabled.
#[must_use]
pub fn test_config<P: AsRef<Path>>(vendor_dir: P) -> AppConfig {
    AppConfigBuilder::default()
        .vendor_dir(vendor_dir.as_ref())
        .use_colors(false)
        .build()
}

/// Creates a configuration with a single package's rules.
#[must_use]
pub fn test_config_with_rules<P: AsRef<Path>>(
    vendor_dir: P,
    package_name: &str,
    patterns: &[&str],
) -> AppConfig {
    AppConfigBuilder::default()
        .vendor_dir(vendor_dir.as_ref())
        .rule(package_name, patterns)
        .use_colors(false)
        .build()
}

/// The contents of a `config.yaml`
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    vendor_dir: PathBuf,
    deployment: BTreeMap<String, Vec<String>>,
    extra: Vec<(String, String)>,
}

impl ConfigFile {
    #[must_use]
    pub fn new<P: AsRef<Path>>(vendor_dir: P) -> Self {
        Self {
            vendor_dir: vendor_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rule(mut self, package_name: &str, patterns: &[&str]) -> Self {
        self.deployment.insert(
            package_name.to_string(),
            patterns.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Adds a top-level `key: value` line as is.
    #[must_use]
    pub fn setting(mut self, key: &str, value: &str) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn to_yaml(&self) -> String {
        let mut yaml = format!(
            "vendor_dir: {}\n",
            serde_yaml::to_string(&self.vendor_dir.display().to_string())
                .unwrap()
                .trim_end()
        );
        for (key, value) in &self.extra {
            yaml.push_str(&format!("{key}: {value}\n"));
        }
        if !self.deployment.is_empty() {
            yaml.push_str("deployment:\n");
            yaml.push_str(&indent(&serde_yaml::to_string(&self.deployment).unwrap()));
        }
        yaml
    }

    /// Writes `config.yaml` into `config_dir`, creating it if needed.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write_to(&self, config_dir: &Path) -> PathBuf {
        fs::create_dir_all(config_dir).unwrap();
        let path = config_dir.join("config.yaml");
        fs::write(&path, self.to_yaml()).unwrap();
        path
    }
}

fn indent(yaml: &str) -> String {
    yaml.lines().map(|line| format!("  {line}\n")).collect()
}
