use std::{
    fs,
    path::{Path, PathBuf},
};

use etcetera::{AppStrategy, AppStrategyArgs, choose_app_strategy};

use super::{DirectoryEntry, FileSystem, FileSystemError};

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "DEPLOY_CLEAN_CONFIG_DIR";

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(path, data)?)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        let binding = path.to_string_lossy();
        let expanded = shellexpand::tilde(&binding);

        Ok(PathBuf::from(expanded.as_ref()).canonicalize()?)
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FileSystemError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            let is_dir = entry_path.is_dir();
            entries.push(DirectoryEntry::new(entry_path, is_dir));
        }
        entries.sort();

        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        Ok(path.canonicalize()?)
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        Ok(fs::remove_file(path)?)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        Ok(fs::remove_dir(path)?)
    }

    fn config_dir(&self) -> Result<PathBuf, FileSystemError> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        choose_app_strategy(AppStrategyArgs {
            top_level_domain: "io".to_string(),
            author: "deployclean".to_string(),
            app_name: "deploy-clean".to_string(),
        })
        .map(|xdg| xdg.config_dir())
        .map_err(|_| FileSystemError::HomeDirNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_list_directory_is_sorted_and_typed() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();

        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let entries = fs.list_directory(dir.path()).unwrap();

        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
        assert!(!entries[0].is_dir());
        assert!(entries[2].is_dir());
    }

    #[test]
    fn test_list_directory_missing() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();

        let err = fs.list_directory(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_write_then_read_file_creates_parents() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("installed.json");

        fs.write_file(&file_path, b"{}").unwrap();

        assert_eq!(fs.read_file(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_remove_file_and_dir() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        let file_path = sub.join("f.txt");
        fs::create_dir(&sub).unwrap();
        File::create(&file_path).unwrap();

        assert!(fs.remove_dir(&sub).is_err(), "non-empty directory");

        fs.remove_file(&file_path).unwrap();
        fs.remove_dir(&sub).unwrap();
        assert!(!fs.path_exists(&sub));
    }

    #[test]
    fn test_canonicalize() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let canonical = fs.canonicalize(&subdir.join("..").join("subdir")).unwrap();
        assert!(canonical.is_absolute());
        assert!(canonical.ends_with("subdir"));

        let err = fs.canonicalize(&dir.path().join("non_existent")).unwrap_err();
        assert!(matches!(err, FileSystemError::IoError(_)));
    }

    #[test]
    fn test_expand_path() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();

        let expanded = fs.expand_path(dir.path()).unwrap();
        assert!(expanded.is_absolute());

        let err = fs.expand_path(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FileSystemError::IoError(_)));
    }
}
