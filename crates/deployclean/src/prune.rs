//! Whitelist-driven pruning with containment-safe deletion
//!
//! [`Pruner::prune`] walks a directory once and removes every node that no wanted pattern names
//! and that is not an ancestor of something a pattern names. Every removal goes through
//! [`Pruner::guarded_delete`], which refuses targets outside the root boundary fixed at
//! construction and outside the directory of the current call.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use deployclean::{
//!     fs::real::RealFileSystem,
//!     prune::{PruneOptions, Pruner},
//!     reporter::TracingReporter,
//! };
//!
//! let pruner = Pruner::new(
//!     RealFileSystem,
//!     TracingReporter,
//!     "/srv/app/vendor",
//!     PruneOptions::new(true, false, false),
//! )?;
//! let report = pruner.prune(
//!     &["/srv/app/vendor/twig/twig/src", "/srv/app/vendor/twig/twig/LICENSE"],
//!     Path::new("/srv/app/vendor/twig/twig"),
//! )?;
//! println!("{} node(s) would be removed", report.removed().len());
//! # Ok::<(), deployclean::prune::PruneError>(())
//! ```

pub mod error;
mod guard;
pub mod pattern;
pub mod report;


use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::{
    fs::FileSystem,
    reporter::{Gated, Reporter},
};

pub use self::{
    error::{DeleteError, PruneError, UnsafeDeleteError, UnsafeReason},
    pattern::{InvalidInputError, Pattern, WantedSet},
    report::{EntryKind, PruneReport, Removal},
};

use self::guard::{Admission, Guard, is_filesystem_root, is_within};

const DRY_RUN_PREFIX: &str = "Dry run - ";

/// Run-time switches of a pruner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOptions {
    dry_run: bool,
    verbose: bool,
    quiet: bool,
}

impl PruneOptions {
    /// A dry run is always verbose.
    #[must_use]
    pub fn new(dry_run: bool, verbose: bool, quiet: bool) -> Self {
        Self {
            dry_run,
            verbose: verbose || dry_run,
            quiet,
        }
    }

    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    fn run_mode(&self) -> &'static str {
        if self.dry_run { DRY_RUN_PREFIX } else { "" }
    }
}

/// The pruning engine
pub struct Pruner<F, R> {
    fs: F,
    reporter: Gated<R>,
    root: PathBuf,
    options: PruneOptions,
}

/// A node left to visit during a guarded delete
enum Visit {
    Enter(PathBuf),
    Leave(PathBuf),
}

impl<F: FileSystem, R: Reporter> Pruner<F, R> {
    /// Creates a pruner confined to `root_boundary`.
    ///
    /// # Errors
    ///
    /// Returns [`PruneError::Configuration`] if the boundary is blank, cannot be resolved, is not a
    /// directory or is the filesystem root.
    pub fn new(
        fs: F,
        reporter: R,
        root_boundary: impl AsRef<Path>,
        options: PruneOptions,
    ) -> Result<Self, PruneError> {
        let root_boundary = root_boundary.as_ref();
        if is_blank(root_boundary) {
            return Err(PruneError::Configuration(
                "root boundary path is blank".to_string(),
            ));
        }

        let root = fs.canonicalize(root_boundary).map_err(|e| {
            PruneError::Configuration(format!(
                "root boundary '{}' cannot be resolved: {e}",
                root_boundary.display()
            ))
        })?;
        if !fs.is_dir(&root) {
            return Err(PruneError::Configuration(format!(
                "root boundary '{}' is not a directory",
                root.display()
            )));
        }
        if is_filesystem_root(&root) {
            return Err(PruneError::Configuration(
                "root boundary cannot be the filesystem root".to_string(),
            ));
        }

        Ok(Self {
            fs,
            reporter: Gated::new(reporter, options),
            root,
            options,
        })
    }

    #[must_use]
    pub fn root_boundary(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn options(&self) -> PruneOptions {
        self.options
    }

    /// Removes everything under `directory` that `wanted` does not keep.
    ///
    /// An empty `wanted`, a blank or unresolvable `directory` and malformed patterns all make the
    /// call a no-op that returns an empty report.
    ///
    /// Patterns may name `directory` through the same symlinked path the caller used. A symlinked
    /// directory with wanted paths behind it is kept as a link; the walk never follows it.
    ///
    /// # Errors
    ///
    /// - [`PruneError::UnsafeDelete`] as soon as a target fails a containment check, or when
    ///   `directory` itself lies outside the root boundary
    /// - [`PruneError::Incomplete`] after the walk when one or more removals failed
    #[instrument(skip_all, fields(directory = %directory.display(), patterns = wanted.len()))]
    pub fn prune<S: AsRef<str>>(
        &self,
        wanted: &[S],
        directory: &Path,
    ) -> Result<PruneReport, PruneError> {
        let mut report = PruneReport::new(self.options.dry_run());

        if wanted.is_empty() {
            debug!("empty wanted list, nothing to do");
            return Ok(report);
        }

        let wanted = match self.validate_input(wanted, directory) {
            Ok(wanted) => wanted,
            Err(e) => {
                self.reporter.warning(&format!(
                    "Skipping '{}': {e}",
                    directory.display()
                ));
                return Ok(report);
            }
        };

        let canonical = match self.fs.canonicalize(directory) {
            Ok(canonical) if self.fs.is_dir(&canonical) => canonical,
            _ => {
                self.reporter.warning(&format!(
                    "Skipping '{}': not an existing directory",
                    directory.display()
                ));
                return Ok(report);
            }
        };

        // Patterns written against the directory as given must match the canonical walk
        let wanted = match wanted.rebase(directory, &canonical) {
            Ok(wanted) => wanted,
            Err(e) => {
                self.reporter.warning(&format!(
                    "Skipping '{}': {e}",
                    directory.display()
                ));
                return Ok(report);
            }
        };
        let directory = canonical;

        if !is_within(&directory, &self.root) {
            let error = UnsafeDeleteError::new(
                &directory,
                UnsafeReason::OutsideRoot(self.root.clone()),
            );
            self.reporter.error(&error.to_string());
            return Err(error.into());
        }

        self.reporter.info(&format!(
            "{}Pruning {} against {} wanted pattern(s)",
            self.options.run_mode(),
            directory.display(),
            wanted.len()
        ));

        if let Err(error) = self.prune_directory(&wanted, &directory, &mut report) {
            self.reporter.error(&error.to_string());
            return Err(error.into());
        }

        finish(report)
    }

    /// Deletes `path` (recursively for directories) if it is inside both the root boundary and
    /// `jail`.
    ///
    /// # Errors
    ///
    /// - [`PruneError::UnsafeDelete`] if `path` is the filesystem root or escapes a boundary;
    ///   nothing is removed past that point
    /// - [`PruneError::Incomplete`] when one or more removals failed
    #[instrument(skip_all, fields(path = %path.display(), jail = %jail.display()))]
    pub fn guarded_delete(&self, path: &Path, jail: &Path) -> Result<PruneReport, PruneError> {
        let mut report = PruneReport::new(self.options.dry_run());

        if !is_filesystem_root(path) && (is_blank(path) || is_blank(jail)) {
            debug!("blank path or jail, nothing to do");
            return Ok(report);
        }

        if let Err(error) = self.delete_tree(path, jail, &mut report) {
            self.reporter.error(&error.to_string());
            return Err(error.into());
        }

        finish(report)
    }

    fn validate_input<S: AsRef<str>>(
        &self,
        wanted: &[S],
        directory: &Path,
    ) -> Result<WantedSet, InvalidInputError> {
        if is_blank(directory) {
            return Err(InvalidInputError::BlankDirectory);
        }
        WantedSet::parse(wanted)
    }

    fn prune_directory(
        &self,
        wanted: &WantedSet,
        directory: &Path,
        report: &mut PruneReport,
    ) -> Result<(), UnsafeDeleteError> {
        let entries = match self.fs.list_directory(directory) {
            Ok(entries) => entries,
            Err(source) => {
                self.record_failure(DeleteError::new(directory, source), report);
                return Ok(());
            }
        };

        for entry in entries {
            let path = entry.path();

            if let Some(pattern) = wanted.matching(path) {
                debug!(path = %path.display(), %pattern, "keeping");
                self.reporter.verbose(&format!(
                    "{}keeping {} {} (wanted: {pattern})",
                    self.options.run_mode(),
                    if entry.is_dir() { "directory" } else { "file" },
                    path.display()
                ));
                report.record_kept(path);
                continue;
            }

            if entry.is_dir() {
                let subset = wanted.within(path);
                if !subset.is_empty() {
                    if self.resolves_elsewhere(path) {
                        debug!(path = %path.display(), "keeping link with wanted paths behind it");
                        self.reporter.verbose(&format!(
                            "{}keeping link {} (wanted paths lie behind it)",
                            self.options.run_mode(),
                            path.display()
                        ));
                        report.record_kept(path);
                        continue;
                    }

                    debug!(path = %path.display(), patterns = subset.len(), "descending");
                    self.prune_directory(&subset, path, report)?;
                    continue;
                }
            }

            self.delete_tree(path, directory, report)?;
        }

        Ok(())
    }

    /// Whether `path`, a child of a canonical directory, is a link (or cannot be resolved at all).
    /// The walk never descends through such an entry.
    fn resolves_elsewhere(&self, path: &Path) -> bool {
        !self
            .fs
            .canonicalize(path)
            .is_ok_and(|target| target == path)
    }

    /// Post-order removal of `path` with an explicit worklist.
    fn delete_tree(
        &self,
        path: &Path,
        jail: &Path,
        report: &mut PruneReport,
    ) -> Result<(), UnsafeDeleteError> {
        if is_filesystem_root(path) {
            return Err(UnsafeDeleteError::new(path, UnsafeReason::FilesystemRoot));
        }
        let guard = Guard::confine(&self.fs, &self.root, jail)?;

        let mut stack = vec![Visit::Enter(path.to_path_buf())];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(candidate) => {
                    let target = match guard.admit(&candidate)? {
                        Admission::Granted(target) => target,
                        Admission::Link => {
                            self.remove(&candidate, EntryKind::File, report);
                            continue;
                        }
                        Admission::Vanished(failure) => {
                            self.record_failure(failure, report);
                            continue;
                        }
                    };

                    if !self.fs.is_dir(&target) {
                        self.remove(&target, EntryKind::File, report);
                        continue;
                    }

                    match self.fs.list_directory(&target) {
                        Ok(children) => {
                            stack.push(Visit::Leave(target));
                            stack.extend(
                                children
                                    .into_iter()
                                    .rev()
                                    .map(|child| Visit::Enter(child.path().to_path_buf())),
                            );
                        }
                        Err(source) => self.record_failure(DeleteError::new(target, source), report),
                    }
                }
                Visit::Leave(directory) => self.remove(&directory, EntryKind::Directory, report),
            }
        }

        Ok(())
    }

    fn remove(&self, target: &Path, kind: EntryKind, report: &mut PruneReport) {
        self.reporter.verbose(&format!(
            "{}removing {} {}",
            self.options.run_mode(),
            kind.noun(),
            target.display()
        ));

        if self.options.dry_run() {
            report.record_removal(target, kind);
            return;
        }

        let result = match kind {
            EntryKind::File => self.fs.remove_file(target),
            EntryKind::Directory => self.fs.remove_dir(target),
        };
        match result {
            Ok(()) => {
                debug!(path = %target.display(), kind = kind.noun(), "removed");
                report.record_removal(target, kind);
            }
            Err(source) => self.record_failure(DeleteError::new(target, source), report),
        }
    }

    fn record_failure(&self, failure: DeleteError, report: &mut PruneReport) {
        warn!(path = %failure.path().display(), error = %failure.cause(), "removal failed");
        self.reporter.warning(&failure.to_string());
        report.record_failure(failure);
    }
}

fn finish(report: PruneReport) -> Result<PruneReport, PruneError> {
    if report.has_failures() {
        Err(PruneError::Incomplete(report))
    } else {
        Ok(report)
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}
