//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading page content from a local content
//! directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Relative paths are resolved against `root` and may not climb out of it.
/// Absolute paths bypass the root; they only come from configuration.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use folio_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let html = storage.read(Path::new("docs/intro.html"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory for relative reads.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a storage path to a filesystem path.
    ///
    /// Rejects relative paths containing parent directory components (`..`)
    /// to prevent path traversal out of the content root.
    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        let has_parent_dir = path.components().any(|c| matches!(c, Component::ParentDir));
        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }

        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;
        tracing::trace!(path = %full_path.display(), "Reading page content");
        fs::read(&full_path).map_err(|e| StorageError::io(e, Some(full_path)).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_storage() -> (tempfile::TempDir, FsStorage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        (temp_dir, storage)
    }

    #[test]
    fn test_read_relative_path() {
        let (temp_dir, storage) = make_storage();
        fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
        fs::write(temp_dir.path().join("docs/intro.html"), "<p>Intro</p>").unwrap();

        let bytes = storage.read(Path::new("docs/intro.html")).unwrap();

        assert_eq!(bytes, b"<p>Intro</p>");
    }

    #[test]
    fn test_read_absolute_path_ignores_root() {
        let (_root, storage) = make_storage();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("docs.html");
        fs::write(&file, "default").unwrap();

        let bytes = storage.read(&file).unwrap();

        assert_eq!(bytes, b"default");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let (temp_dir, storage) = make_storage();

        let err = storage.read(Path::new("docs/missing.html")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(
            err.path(),
            Some(temp_dir.path().join("docs/missing.html").as_path())
        );
    }

    #[test]
    fn test_read_rejects_parent_dir() {
        let (_temp_dir, storage) = make_storage();

        let err = storage.read(Path::new("../etc/passwd")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        assert_eq!(err.path(), Some(Path::new("../etc/passwd")));
    }

    #[test]
    fn test_read_directory_fails() {
        let (temp_dir, storage) = make_storage();
        fs::create_dir_all(temp_dir.path().join("docs")).unwrap();

        assert!(storage.read(Path::new("docs")).is_err());
    }

    #[test]
    fn test_read_non_utf8_bytes() {
        let (temp_dir, storage) = make_storage();
        fs::write(temp_dir.path().join("raw.html"), [0xff, 0xfe, 0x00]).unwrap();

        let bytes = storage.read(Path::new("raw.html")).unwrap();

        assert_eq!(bytes, vec![0xff, 0xfe, 0x00]);
    }
}
