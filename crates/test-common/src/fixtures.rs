//! On-disk vendor trees for integration tests.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::constants::{REGISTRY_FILE_NAME, VENDOR_DIR_NAME};

/// A temporary workspace holding a vendor directory, an installed-package registry and a config
/// directory.
///
/// # Example
/// ```rust
/// let tree = VendorTree::new()
///     .package("twig/twig", &["src/Environment.php", "tests/EnvTest.php", "LICENSE"]);
/// let vendor = tree.vendor_dir();
/// ```
pub struct VendorTree {
    root: TempDir,
    packages: Vec<String>,
}

impl Default for VendorTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorTree {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join(VENDOR_DIR_NAME)).unwrap();
        Self {
            root,
            packages: Vec::new(),
        }
    }

    /// Installs a package with the given package-relative files and registers it.
    ///
    /// Paths ending in `/` become empty directories.
    #[must_use]
    pub fn package(mut self, name: &str, files: &[&str]) -> Self {
        let package_dir = self.package_dir(name);
        fs::create_dir_all(&package_dir).unwrap();
        for file in files {
            let path = package_dir.join(file);
            if file.ends_with('/') {
                fs::create_dir_all(&path).unwrap();
            } else {
                write_file(&path, file);
            }
        }
        self.packages.push(name.to_string());
        self.write_registry();
        self
    }

    /// Creates a file outside the vendor directory, next to it in the workspace.
    #[must_use]
    pub fn outside_file(self, relative: &str) -> Self {
        write_file(&self.root.path().join(relative), relative);
        self
    }

    /// Symlinks `link` (package-relative) to `target` (workspace-relative).
    #[cfg(unix)]
    #[must_use]
    pub fn symlink(self, package_name: &str, link: &str, target: &str) -> Self {
        let link = self.package_dir(package_name).join(link);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(self.root.path().join(target), link).unwrap();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    #[must_use]
    pub fn vendor_dir(&self) -> PathBuf {
        self.root.path().join(VENDOR_DIR_NAME)
    }

    #[must_use]
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.vendor_dir().join(name)
    }

    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.vendor_dir().join(REGISTRY_FILE_NAME)
    }

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.root.path().join("config")
    }

    /// Names currently listed in the registry file.
    ///
    /// # Panics
    /// Panics if the registry cannot be read or parsed.
    #[must_use]
    pub fn registered(&self) -> Vec<String> {
        let contents = fs::read_to_string(self.registry_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        value["packages"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["name"].as_str().map(ToString::to_string))
            .collect()
    }

    /// Every path below the workspace root, relative to it. Directories end in `/`.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<String> {
        snapshot(self.root.path())
    }

    fn write_registry(&self) {
        let packages: Vec<serde_json::Value> = self
            .packages
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "version": "1.0.0",
                    "install_path": name,
                })
            })
            .collect();
        let document = serde_json::json!({ "packages": packages, "dev": true });
        fs::write(
            self.registry_file(),
            serde_json::to_string_pretty(&document).unwrap(),
        )
        .unwrap();
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Every path below `root`, relative to it, without following symlinks. Directories end in `/`.
///
/// # Panics
/// Panics if `root` cannot be walked.
#[must_use]
pub fn snapshot(root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            if entry.file_type().unwrap().is_dir() {
                found.insert(format!("{relative}/"));
                stack.push(path);
            } else {
                found.insert(relative);
            }
        }
    }
    found
}
