//! Turns package-relative deployment rules into absolute wanted patterns.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::fs::{FileSystem, FileSystemError};

const CURRENT_DIR: &str = ".";

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("Install path '{}' cannot be resolved: {source}", path.display())]
    InstallPath {
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("Path '{}' is not valid UTF-8", .0.display())]
    NonUtf8(PathBuf),
}

/// Outcome of resolving one package's rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPatterns {
    install_path: PathBuf,
    patterns: Vec<String>,
    skipped: Vec<String>,
}

impl ResolvedPatterns {
    /// Canonical install path of the package.
    #[must_use]
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Absolute wanted patterns, in rule order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Rules that matched nothing resolvable.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// Resolves `patterns` against `install_path`.
///
/// Each rule is first resolved as a whole. When that fails (a wildcard, or a file that does not
/// exist) its parent directory is resolved instead and the literal last segment re-appended.
/// Rules whose parent cannot be resolved either are skipped.
///
/// # Errors
///
/// Returns [`ResolveError`] if `install_path` itself cannot be resolved or is not UTF-8.
pub fn resolve_patterns<F, S>(
    fs: &F,
    install_path: &Path,
    patterns: &[S],
) -> Result<ResolvedPatterns, ResolveError>
where
    F: FileSystem,
    S: AsRef<str>,
{
    let install_path = fs
        .canonicalize(install_path)
        .map_err(|source| ResolveError::InstallPath {
            path: install_path.to_path_buf(),
            source,
        })?;
    if install_path.to_str().is_none() {
        return Err(ResolveError::NonUtf8(install_path));
    }

    let mut resolved = ResolvedPatterns {
        install_path,
        ..ResolvedPatterns::default()
    };

    for rule in patterns {
        let rule = rule.as_ref();
        match resolve_one(fs, &resolved.install_path, rule) {
            Some(pattern) => {
                debug!(rule, %pattern, "resolved");
                resolved.patterns.push(pattern);
            }
            None => {
                debug!(rule, "unresolvable");
                resolved.skipped.push(rule.to_string());
            }
        }
    }

    Ok(resolved)
}

fn resolve_one<F: FileSystem>(fs: &F, install_path: &Path, rule: &str) -> Option<String> {
    // Rules are always relative to the package, even when written with a leading separator.
    let relative = rule.trim().trim_start_matches('/').trim_end_matches('/');
    if relative.is_empty() {
        return None;
    }

    if let Ok(full) = fs.canonicalize(&install_path.join(relative)) {
        return full.to_str().map(glob::Pattern::escape);
    }

    let (parent, basename) = match relative.rsplit_once('/') {
        Some((parent, basename)) => (parent, basename),
        None => (CURRENT_DIR, relative),
    };
    let parent = fs.canonicalize(&install_path.join(parent)).ok()?;
    let parent = glob::Pattern::escape(parent.to_str()?);

    Some(format!("{}/{basename}", parent.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use pretty_assertions::assert_eq;
    use std::io;

    fn fs_with(existing: &'static [&'static str]) -> MockFileSystem {
        let mut fs = MockFileSystem::default();
        fs.expect_canonicalize().returning(move |path| {
            let path = path.to_str().unwrap_or_default().replace("/./", "/");
            let path = path.strip_suffix("/.").unwrap_or(&path).to_string();
            if existing.iter().any(|e| *e == path) {
                Ok(PathBuf::from(path))
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound).into())
            }
        });
        fs
    }

    #[test]
    fn test_existing_paths_resolve_whole() {
        let fs = fs_with(&["/v/pkg", "/v/pkg/src", "/v/pkg/LICENSE"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["src", "LICENSE"]).unwrap();

        assert_eq!(resolved.install_path(), Path::new("/v/pkg"));
        assert_eq!(resolved.patterns(), &["/v/pkg/src", "/v/pkg/LICENSE"]);
        assert!(resolved.skipped().is_empty());
    }

    #[test]
    fn test_wildcards_resolve_through_parent() {
        let fs = fs_with(&["/v/pkg", "/v/pkg/docs"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["*.md", "docs/*.txt"]).unwrap();

        assert_eq!(resolved.patterns(), &["/v/pkg/*.md", "/v/pkg/docs/*.txt"]);
    }

    #[test]
    fn test_unresolvable_parent_is_skipped() {
        let fs = fs_with(&["/v/pkg"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["missing/dir/*.php", "src"]).unwrap();

        assert_eq!(resolved.patterns(), &["/v/pkg/src"]);
        assert_eq!(resolved.skipped(), &["missing/dir/*.php"]);
    }

    #[test]
    fn test_leading_separator_stays_inside_package() {
        let fs = fs_with(&["/v/pkg", "/v/pkg/etc"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["/etc"]).unwrap();

        assert_eq!(resolved.patterns(), &["/v/pkg/etc"]);
    }

    #[test]
    fn test_glob_characters_in_resolved_directories_are_escaped() {
        let fs = fs_with(&["/v/pkg", "/v/pkg/a[1]"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["a[1]/*.php"]).unwrap();

        assert_eq!(resolved.patterns(), &["/v/pkg/a[[]1[]]/*.php"]);
    }

    #[test]
    fn test_missing_install_path() {
        let fs = fs_with(&[]);

        let result = resolve_patterns(&fs, Path::new("/v/gone"), &["src"]);

        assert!(matches!(result, Err(ResolveError::InstallPath { .. })));
    }

    #[test]
    fn test_blank_rules_are_skipped() {
        let fs = fs_with(&["/v/pkg"]);

        let resolved = resolve_patterns(&fs, Path::new("/v/pkg"), &["  ", "/"]).unwrap();

        assert!(resolved.patterns().is_empty());
        assert_eq!(resolved.skipped().len(), 2);
    }

    #[test]
    fn test_resolves_against_real_tree() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        std::fs::create_dir_all(pkg.join("src")).unwrap();
        let real = crate::fs::real::RealFileSystem;

        let resolved = resolve_patterns(&real, &pkg, &["src", "*.md"]).unwrap();

        let canonical = pkg.canonicalize().unwrap();
        let canonical = canonical.to_str().unwrap();
        assert_eq!(
            resolved.patterns(),
            &[format!("{canonical}/src"), format!("{canonical}/*.md")]
        );
    }
}
