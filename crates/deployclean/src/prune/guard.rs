//! Containment checks run before any destructive call.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

use super::error::{DeleteError, UnsafeDeleteError, UnsafeReason};

/// Outcome of checking one delete candidate
#[derive(Debug)]
pub(crate) enum Admission {
    /// Safe to delete; holds the canonical target.
    Granted(PathBuf),

    /// A symbolic link whose target stays inside both boundaries. Only the link is removed.
    Link,

    /// The candidate could not be resolved, most likely removed mid-walk.
    Vanished(DeleteError),
}

/// Both boundaries of one guarded delete, already canonical.
#[derive(Debug)]
pub(crate) struct Guard<'a, F> {
    fs: &'a F,
    root: &'a Path,
    jail: PathBuf,
}

impl<'a, F: FileSystem> Guard<'a, F> {
    pub(crate) fn confine(
        fs: &'a F,
        root: &'a Path,
        jail: &Path,
    ) -> Result<Self, UnsafeDeleteError> {
        let jail = fs.canonicalize(jail).map_err(|_| {
            UnsafeDeleteError::new(jail, UnsafeReason::UnresolvableJail(jail.to_path_buf()))
        })?;

        Ok(Self { fs, root, jail })
    }

    pub(crate) fn admit(&self, path: &Path) -> Result<Admission, UnsafeDeleteError> {
        if is_filesystem_root(path) {
            return Err(UnsafeDeleteError::new(path, UnsafeReason::FilesystemRoot));
        }

        let target = match self.fs.canonicalize(path) {
            Ok(target) => target,
            Err(source) => return Ok(Admission::Vanished(DeleteError::new(path, source))),
        };

        if is_filesystem_root(&target) {
            return Err(UnsafeDeleteError::new(target, UnsafeReason::FilesystemRoot));
        }
        if !is_within(&target, self.root) {
            return Err(UnsafeDeleteError::new(
                target,
                UnsafeReason::OutsideRoot(self.root.to_path_buf()),
            ));
        }
        if !is_within(&target, &self.jail) {
            let jail = self.jail.clone();
            return Err(UnsafeDeleteError::new(target, UnsafeReason::OutsideJail(jail)));
        }

        // A candidate resolving anywhere but its own location is a link
        let located = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => match self.fs.canonicalize(parent) {
                Ok(parent) => parent.join(name),
                Err(source) => return Ok(Admission::Vanished(DeleteError::new(path, source))),
            },
            _ => target.clone(),
        };
        if located != target {
            return Ok(Admission::Link);
        }

        Ok(Admission::Granted(target))
    }
}

pub(crate) fn is_filesystem_root(path: &Path) -> bool {
    path.has_root() && path.parent().is_none()
}

/// Component-wise containment: `/srv/abc` is not within `/srv/ab`.
pub(crate) fn is_within(path: &Path, boundary: &Path) -> bool {
    path.starts_with(boundary)
}
