pub mod loader;
pub mod validate;

pub use self::loader::{ApplyToConfig, ConfigLoadError, ConfigLoader, YamlLoader};

use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::prune::PruneOptions;

const DEREGISTER_DEFAULT: bool = true;
const USE_COLORS_DEFAULT: bool = true;
const REGISTRY_FILE_NAME: &str = "installed.json";

/// Application configuration: the config file with CLI overrides applied on top
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root boundary of every prune; packages are installed below it.
    pub(crate) vendor_dir: PathBuf,

    #[serde(default)]
    pub(crate) registry_file: Option<PathBuf>,

    /// Package name to package-relative wanted patterns.
    #[serde(default)]
    pub(crate) deployment: BTreeMap<String, Vec<String>>,

    #[serde(default = "default_deregister")]
    pub(crate) deregister: bool,

    #[serde(default)]
    pub(crate) dry_run: bool,

    #[serde(default)]
    pub(crate) verbose: bool,

    #[serde(default)]
    pub(crate) quiet: bool,

    #[serde(default = "default_use_colors")]
    pub(crate) use_colors: bool,

    #[serde(default = "default_max_parallel")]
    pub(crate) max_parallel: NonZeroUsize,
}

fn default_deregister() -> bool {
    DEREGISTER_DEFAULT
}

fn default_use_colors() -> bool {
    USE_COLORS_DEFAULT
}

fn default_max_parallel() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

impl AppConfig {
    #[must_use]
    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }

    /// The installed-package registry, `<vendor_dir>/installed.json` unless configured.
    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.registry_file
            .clone()
            .unwrap_or_else(|| self.vendor_dir.join(REGISTRY_FILE_NAME))
    }

    #[must_use]
    pub fn deployment(&self) -> &BTreeMap<String, Vec<String>> {
        &self.deployment
    }

    /// Wanted patterns of one package, if it has deployment rules.
    #[must_use]
    pub fn rules_for(&self, package_name: &str) -> Option<&[String]> {
        self.deployment.get(package_name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn deregister(&self) -> bool {
        self.deregister
    }

    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// A dry run is always verbose.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose || self.dry_run
    }

    #[must_use]
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    #[must_use]
    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    #[must_use]
    pub fn max_parallel(&self) -> NonZeroUsize {
        self.max_parallel
    }

    #[must_use]
    pub fn prune_options(&self) -> PruneOptions {
        PruneOptions::new(self.dry_run, self.verbose, self.quiet)
    }

    pub fn vendor_dir_mut(&mut self) -> &mut PathBuf {
        &mut self.vendor_dir
    }

    pub fn deregister_mut(&mut self) -> &mut bool {
        &mut self.deregister
    }

    pub fn dry_run_mut(&mut self) -> &mut bool {
        &mut self.dry_run
    }

    pub fn verbose_mut(&mut self) -> &mut bool {
        &mut self.verbose
    }

    pub fn quiet_mut(&mut self) -> &mut bool {
        &mut self.quiet
    }

    pub fn use_colors_mut(&mut self) -> &mut bool {
        &mut self.use_colors
    }
}

/// Builder for `AppConfig`, mostly for tests
///
#[derive(Default, Debug)]
pub struct AppConfigBuilder {
    vendor_dir: PathBuf,
    registry_file: Option<PathBuf>,
    deployment: BTreeMap<String, Vec<String>>,
    deregister: Option<bool>,
    dry_run: bool,
    verbose: bool,
    quiet: bool,
    use_colors: Option<bool>,
    max_parallel: Option<NonZeroUsize>,
}

impl AppConfigBuilder {
    #[must_use]
    pub fn vendor_dir<D>(mut self, vendor_dir: D) -> Self
    where
        D: AsRef<std::ffi::OsStr>,
    {
        self.vendor_dir = PathBuf::from(vendor_dir.as_ref());
        self
    }

    #[must_use]
    pub fn registry_file<D>(mut self, registry_file: D) -> Self
    where
        D: AsRef<std::ffi::OsStr>,
    {
        self.registry_file = Some(PathBuf::from(registry_file.as_ref()));
        self
    }

    #[must_use]
    pub fn rule<S: AsRef<str>>(mut self, package_name: &str, patterns: &[S]) -> Self {
        self.deployment.insert(
            package_name.to_string(),
            patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        );
        self
    }

    #[must_use]
    pub fn deregister(mut self, deregister: bool) -> Self {
        self.deregister = Some(deregister);
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = Some(use_colors);
        self
    }

    /// # Panics
    ///
    /// Panics if `max` is zero.
    #[must_use]
    pub fn max_parallel_unchecked(mut self, max: usize) -> Self {
        self.max_parallel = Some(NonZeroUsize::new(max).expect("max_parallel must be non-zero"));
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        AppConfig {
            vendor_dir: self.vendor_dir,
            registry_file: self.registry_file,
            deployment: self.deployment,
            deregister: self.deregister.unwrap_or(DEREGISTER_DEFAULT),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            use_colors: self.use_colors.unwrap_or(USE_COLORS_DEFAULT),
            max_parallel: self.max_parallel.unwrap_or_else(default_max_parallel),
        }
    }
}
