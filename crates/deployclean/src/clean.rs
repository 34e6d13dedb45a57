//! Cleaning installed packages against their deployment rules
//!
//! [`CleanService::clean`] resolves every target package's rules to absolute wanted patterns,
//! prunes the package directories on tokio's blocking pool and finally deregisters the cleaned
//! packages so they get reinstalled in full on the next update. Progress arrives as a stream of
//! [`CleanEvent`]s.

pub mod event;
mod waves;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tracing::{debug, instrument};

use crate::{
    config::AppConfig,
    fs::FileSystem,
    prune::{PruneError, Pruner},
    registry::{PackageRegistry, RegistryError},
    resolve::{ResolveError, ResolvedPatterns, resolve_patterns},
};

pub use self::event::{CleanEvent, EventMetadata, EventStream};

use self::{
    event::{EventReporter, EventSender},
    waves::plan_waves,
};

const ALL_PACKAGES: &str = "all";
const EVENT_BUFFER: usize = 64;

/// The packages a clean run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanTargets {
    /// Every package with deployment rules
    All,

    /// The listed packages, in order, without duplicates
    Named(Vec<String>),
}

impl CleanTargets {
    /// A single `all` argument (in any case) selects every package.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        if let [only] = args {
            if only.as_ref().eq_ignore_ascii_case(ALL_PACKAGES) {
                return Self::All;
            }
        }

        let mut names: Vec<String> = Vec::with_capacity(args.len());
        for arg in args {
            let arg = arg.as_ref();
            if !names.iter().any(|name| name == arg) {
                names.push(arg.to_string());
            }
        }
        Self::Named(names)
    }
}

#[derive(Error, Debug, Clone)]
pub enum CleanError {
    #[error("{0} not installed")]
    NotInstalled(String),

    #[error("Cannot resolve rules of {package_name}: {source}")]
    Resolve {
        package_name: String,
        #[source]
        source: ResolveError,
    },

    #[error("Cleaning {package_name} failed: {source}")]
    Prune {
        package_name: String,
        #[source]
        source: PruneError,
    },

    #[error("Cleaning {0} was interrupted")]
    Interrupted(String),

    #[error(transparent)]
    Configuration(PruneError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome of a whole clean run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    dry_run: bool,
    cleaned: Vec<String>,
    skipped: Vec<String>,
    failed: Vec<String>,
    deregistered: Vec<String>,
    removed: usize,
    registry_failed: bool,
}

impl CleanSummary {
    fn new(dry_run: bool) -> Self {
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
    pub fn cleaned(&self) -> &[String] {
        &self.cleaned
    }

    /// Packages left alone because there was nothing to keep them by.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    #[must_use]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    #[must_use]
    pub fn deregistered(&self) -> &[String] {
        &self.deregistered
    }

    /// Number of nodes removed (or, in a dry run, that would have been).
    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.registry_failed
    }
}

/// Primary port for cleaning packages
#[cfg_attr(any(test, feature = "with_mocks"), mockall::automock)]
#[async_trait]
pub trait CleanService: Send + Sync {
    /// Clean `targets`, streaming progress until a final [`CleanEvent::Completed`].
    async fn clean(&self, targets: CleanTargets) -> EventStream;
}

/// Implementation of the `CleanService`
pub struct CleanServiceImpl<F, G> {
    fs: F,
    registry: Arc<Mutex<G>>,
    config: AppConfig,
}

/// A package ready to be pruned
struct Job {
    package_name: String,
    resolved: ResolvedPatterns,
}

impl Job {
    fn install_path(&self) -> &Path {
        self.resolved.install_path()
    }
}

impl<F, G> CleanServiceImpl<F, G>
where
    F: FileSystem + Clone + 'static,
    G: PackageRegistry + 'static,
{
    pub fn new(fs: F, registry: G, config: AppConfig) -> Self {
        Self {
            fs,
            registry: Arc::new(Mutex::new(registry)),
            config,
        }
    }

    // Helper to create an event stream
    fn create_event_stream<H, Fut>(handler: H) -> EventStream
    where
        H: FnOnce(mpsc::Sender<CleanEvent>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(async move {
            handler(tx).await;
        });

        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }
}

#[async_trait]
impl<F, G> CleanService for CleanServiceImpl<F, G>
where
    F: FileSystem + Clone + 'static,
    G: PackageRegistry + 'static,
{
    #[instrument(skip(self))]
    async fn clean(&self, targets: CleanTargets) -> EventStream {
        let fs = self.fs.clone();
        let registry = Arc::clone(&self.registry);
        let config = self.config.clone();

        Self::create_event_stream(move |tx| async move {
            let sender = EventSender::new(tx, config.prune_options());
            let summary = run(fs, registry, &config, targets, &sender).await;
            sender.send_completed(summary).await;
        })
    }
}

async fn run<F, G>(
    fs: F,
    registry: Arc<Mutex<G>>,
    config: &AppConfig,
    targets: CleanTargets,
    sender: &EventSender,
) -> CleanSummary
where
    F: FileSystem + Clone + 'static,
    G: PackageRegistry,
{
    let options = config.prune_options();
    let run_mode = if options.dry_run() { "Dry run - " } else { "" };
    let mut summary = CleanSummary::new(options.dry_run());

    let package_names: Vec<String> = match &targets {
        CleanTargets::All => config.deployment().keys().cloned().collect(),
        CleanTargets::Named(names) => names.clone(),
    };
    sender.send_started(package_names.len()).await;
    match targets {
        CleanTargets::All => {
            sender
                .send_info(format!(
                    "{run_mode}Cleaning all packages installed at: {}",
                    config.vendor_dir().display()
                ))
                .await;
        }
        CleanTargets::Named(_) => {
            sender
                .send_info(format!(
                    "{run_mode}Cleaning {} specified package(s)",
                    package_names.len()
                ))
                .await;
        }
    }

    let pruner = match Pruner::new(
        fs.clone(),
        EventReporter::new(sender.clone()),
        config.vendor_dir(),
        options,
    ) {
        Ok(pruner) => Arc::new(pruner),
        Err(e) => {
            sender.send_error(CleanError::Configuration(e)).await;
            summary.failed = package_names;
            return summary;
        }
    };

    let mut jobs = Vec::new();
    let total_steps = package_names.len();
    for (index, package_name) in package_names.into_iter().enumerate() {
        sender
            .send_progress(index + 1, total_steps, format!("{run_mode}{package_name}"))
            .await;

        match prepare(&fs, &registry, config, &package_name, sender).await {
            Ok(Some(resolved)) => jobs.push(Job {
                package_name,
                resolved,
            }),
            Ok(None) => summary.skipped.push(package_name),
            Err(e) => {
                sender.send_error(e).await;
                summary.failed.push(package_name);
            }
        }
    }

    let semaphore = Arc::new(Semaphore::new(config.max_parallel().get()));
    for wave in plan_waves(jobs, Job::install_path) {
        debug!(packages = wave.len(), "starting wave");
        let mut handles = Vec::with_capacity(wave.len());
        for job in wave {
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
            let pruner = Arc::clone(&pruner);
            let package_name = job.package_name.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                pruner.prune(job.resolved.patterns(), job.resolved.install_path())
            });
            handles.push((package_name, handle));
        }

        for (package_name, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => {
                    summary.removed += report.removed().len();
                    sender.send_cleaned(&package_name, report).await;
                    summary.cleaned.push(package_name);
                }
                Ok(Err(source)) => {
                    if let Some(report) = source.report() {
                        summary.removed += report.removed().len();
                    }
                    sender
                        .send_error(CleanError::Prune {
                            package_name: package_name.clone(),
                            source,
                        })
                        .await;
                    summary.failed.push(package_name);
                }
                Err(e) => {
                    tracing::error!(package_name, error = %e, "prune task failed");
                    sender
                        .send_error(CleanError::Interrupted(package_name.clone()))
                        .await;
                    summary.failed.push(package_name);
                }
            }
        }
    }

    if !options.dry_run() && config.deregister() && !summary.cleaned.is_empty() {
        deregister(&registry, &mut summary, sender).await;
    }

    summary
}

/// Resolves one package, or returns `None` when it should be skipped.
async fn prepare<F, G>(
    fs: &F,
    registry: &Mutex<G>,
    config: &AppConfig,
    package_name: &str,
    sender: &EventSender,
) -> Result<Option<ResolvedPatterns>, CleanError>
where
    F: FileSystem,
    G: PackageRegistry,
{
    let run_mode = if config.dry_run() { "Dry run - " } else { "" };

    let Some(rules) = config.rules_for(package_name) else {
        sender
            .send_warning(format!(
                "{run_mode}{package_name} skipped because deployment information not found"
            ))
            .await;
        return Ok(None);
    };

    let install_path: Option<PathBuf> = registry.lock().await.install_path(package_name);
    let Some(install_path) = install_path else {
        return Err(CleanError::NotInstalled(package_name.to_string()));
    };
    sender
        .send_verbose(format!(
            "cleaning {package_name} installed at: {}",
            install_path.display()
        ))
        .await;

    let resolved =
        resolve_patterns(fs, &install_path, rules).map_err(|source| CleanError::Resolve {
            package_name: package_name.to_string(),
            source,
        })?;
    for rule in resolved.skipped() {
        sender
            .send_verbose(format!("couldn't resolve {rule} to actionable path. Skipped."))
            .await;
    }

    if resolved.patterns().is_empty() {
        sender
            .send_warning(format!(
                "{run_mode}{package_name} skipped because none of its rules resolved"
            ))
            .await;
        return Ok(None);
    }

    Ok(Some(resolved))
}

async fn deregister<G: PackageRegistry>(
    registry: &Mutex<G>,
    summary: &mut CleanSummary,
    sender: &EventSender,
) {
    let mut registry = registry.lock().await;
    for package_name in &summary.cleaned {
        sender
            .send_verbose(format!(
                "unregistering {package_name} from the package registry"
            ))
            .await;
        if registry.deregister(package_name) {
            summary.deregistered.push(package_name.clone());
        }
    }

    if let Err(e) = registry.persist() {
        summary.registry_failed = true;
        sender.send_error(e.into()).await;
    }
}
