use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::fs::FileSystem;

use super::{PackageRegistry, RegistryError};

/// `installed.json`-backed registry
///
/// Both the `{"packages": [...]}` layout and a bare array of packages are read, and written back
/// in the layout they were read in. Fields other than `name` and `install_path` are kept as is.
/// Relative install paths are taken relative to the vendor directory; a package without one is
/// installed at `<vendor_dir>/<name>`.
pub struct JsonRegistry<F: FileSystem> {
    fs: F,
    path: PathBuf,
    vendor_dir: PathBuf,
    document: Document,
    dirty: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped(Wrapped),
    Bare(Vec<Entry>),
}

#[derive(Debug, Serialize, Deserialize)]
struct Wrapped {
    #[serde(default)]
    packages: Vec<Entry>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    install_path: Option<PathBuf>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Document {
    fn packages(&self) -> &[Entry] {
        match self {
            Self::Wrapped(wrapped) => &wrapped.packages,
            Self::Bare(entries) => entries,
        }
    }

    fn packages_mut(&mut self) -> &mut Vec<Entry> {
        match self {
            Self::Wrapped(wrapped) => &mut wrapped.packages,
            Self::Bare(entries) => entries,
        }
    }
}

impl<F: FileSystem> JsonRegistry<F> {
    /// Reads the registry at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the file does not exist and
    /// [`RegistryError::Malformed`] if it is not a package registry.
    pub fn load(
        fs: F,
        path: impl Into<PathBuf>,
        vendor_dir: impl Into<PathBuf>,
    ) -> Result<Self, RegistryError> {
        let path = path.into();
        let contents = match fs.read_file(&path) {
            Ok(contents) => contents,
            Err(e) if e.io_kind() == Some(io::ErrorKind::NotFound) => {
                return Err(RegistryError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        let document: Document =
            serde_json::from_str(&contents).map_err(|e| RegistryError::Malformed {
                path: path.clone(),
                source: Arc::new(e),
            })?;
        debug!(path = %path.display(), packages = document.packages().len(), "registry loaded");

        Ok(Self {
            fs,
            path,
            vendor_dir: vendor_dir.into(),
            document,
            dirty: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: FileSystem> PackageRegistry for JsonRegistry<F> {
    fn install_path(&self, package_name: &str) -> Option<PathBuf> {
        self.document
            .packages()
            .iter()
            .find(|entry| entry.name == package_name)
            .map(|entry| match &entry.install_path {
                Some(path) => self.vendor_dir.join(path),
                None => self.vendor_dir.join(&entry.name),
            })
    }

    fn package_names(&self) -> Vec<String> {
        self.document
            .packages()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    fn deregister(&mut self, package_name: &str) -> bool {
        let packages = self.document.packages_mut();
        let before = packages.len();
        packages.retain(|entry| entry.name != package_name);

        let removed = packages.len() != before;
        if removed {
            debug!(package_name, "deregistered");
            self.dirty = true;
        }
        removed
    }

    fn persist(&mut self) -> Result<(), RegistryError> {
        if !self.dirty {
            return Ok(());
        }

        let mut serialized = serde_json::to_string_pretty(&self.document)
            .map_err(|e| RegistryError::Serialize(Arc::new(e)))?;
        serialized.push('\n');
        self.fs.write_file(&self.path, serialized.as_bytes())?;
        self.dirty = false;
        debug!(path = %self.path.display(), "registry written");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystemError, MockFileSystem};
    use std::sync::Mutex;

    const REGISTRY: &str = "/srv/app/vendor/installed.json";
    const VENDOR: &str = "/srv/app/vendor";

    const WRAPPED: &str = r#"{
        "packages": [
            {"name": "twig/twig", "version": "3.8.0", "install_path": "twig/twig"},
            {"name": "psr/log", "version": "3.0.0"},
            {"name": "acme/elsewhere", "install_path": "/opt/acme"}
        ],
        "dev": true
    }"#;

    fn registry(contents: &str) -> JsonRegistry<MockFileSystem> {
        let mut fs = MockFileSystem::default();
        fs.mock_read_file(REGISTRY, contents);
        JsonRegistry::load(fs, REGISTRY, VENDOR).unwrap()
    }

    #[test]
    fn test_install_paths() {
        let registry = registry(WRAPPED);

        assert_eq!(
            registry.install_path("twig/twig"),
            Some(PathBuf::from("/srv/app/vendor/twig/twig"))
        );
        assert_eq!(
            registry.install_path("psr/log"),
            Some(PathBuf::from("/srv/app/vendor/psr/log"))
        );
        assert_eq!(
            registry.install_path("acme/elsewhere"),
            Some(PathBuf::from("/opt/acme"))
        );
        assert_eq!(registry.install_path("missing/pkg"), None);
    }

    #[test]
    fn test_package_names_keep_registry_order() {
        let registry = registry(WRAPPED);

        assert_eq!(
            registry.package_names(),
            vec!["twig/twig", "psr/log", "acme/elsewhere"]
        );
    }

    #[test]
    fn test_bare_array_layout() {
        let registry = registry(r#"[{"name": "psr/log"}]"#);

        assert_eq!(registry.package_names(), vec!["psr/log"]);
    }

    #[test]
    fn test_missing_file() {
        let mut fs = MockFileSystem::default();
        fs.expect_read_file()
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound).into()));

        let result = JsonRegistry::load(fs, REGISTRY, VENDOR);

        assert!(matches!(result, Err(RegistryError::NotFound(path)) if path == Path::new(REGISTRY)));
    }

    #[test]
    fn test_malformed_file() {
        let mut fs = MockFileSystem::default();
        fs.mock_read_file(REGISTRY, r#"{"packages": "nope"}"#);

        let result = JsonRegistry::load(fs, REGISTRY, VENDOR);

        assert!(matches!(result, Err(RegistryError::Malformed { .. })));
    }

    #[test]
    fn test_persist_without_changes_writes_nothing() {
        let mut registry = registry(WRAPPED);

        // No write expectation: any write would panic.
        registry.persist().unwrap();
    }

    #[test]
    fn test_deregister_and_persist_preserve_other_fields() {
        let written = Arc::new(Mutex::new(None::<String>));
        let sink = Arc::clone(&written);

        let mut fs = MockFileSystem::default();
        fs.mock_read_file(REGISTRY, WRAPPED);
        fs.expect_write_file()
            .times(1)
            .returning(move |path, data| {
                assert_eq!(path, Path::new(REGISTRY));
                *sink.lock().unwrap() = Some(String::from_utf8_lossy(data).into_owned());
                Ok(())
            });
        let mut registry = JsonRegistry::load(fs, REGISTRY, VENDOR).unwrap();

        assert!(registry.deregister("twig/twig"));
        assert!(!registry.deregister("twig/twig"));
        registry.persist().unwrap();
        registry.persist().unwrap();

        let written = written.lock().unwrap().clone().unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["dev"], Value::Bool(true));
        assert_eq!(value["packages"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["packages"][0]["name"], "psr/log");
        assert_eq!(value["packages"][0]["version"], "3.0.0");
        assert!(value["packages"][0].get("install_path").is_none());
    }

    #[test]
    fn test_persist_write_failure() {
        let mut fs = MockFileSystem::default();
        fs.mock_read_file(REGISTRY, WRAPPED);
        fs.expect_write_file()
            .returning(|_, _| Err(FileSystemError::from(io::Error::from(io::ErrorKind::PermissionDenied))));
        let mut registry = JsonRegistry::load(fs, REGISTRY, VENDOR).unwrap();
        registry.deregister("psr/log");

        let result = registry.persist();

        assert!(matches!(result, Err(RegistryError::FileSystem(_))));
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installed.json");
        std::fs::write(&path, WRAPPED).unwrap();
        let real = crate::fs::real::RealFileSystem;

        let mut registry = JsonRegistry::load(real, &path, dir.path()).unwrap();
        registry.deregister("psr/log");
        registry.persist().unwrap();

        let reloaded = JsonRegistry::load(real, &path, dir.path()).unwrap();
        assert_eq!(reloaded.package_names(), vec!["twig/twig", "acme/elsewhere"]);
    }
}
