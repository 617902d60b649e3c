//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", path.display(), e),
            Some(operation.to_string()),
        )
    })
}

/// Create a directory and all of its parents if absent.
pub fn ensure_dir(path: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", path.display(), e),
            Some(operation.to_string()),
        )
    })
}

/// Reset a directory to empty, creating it if absent.
pub fn clear_dir(path: &Path, operation: &str) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            Error::internal_io(
                format!("{}: {}", path.display(), e),
                Some(operation.to_string()),
            )
        })?;
    }
    ensure_dir(path, operation)
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(from: &Path, to: &Path, operation: &str) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent, operation)?;
    }
    fs::copy(from, to).map_err(|e| {
        Error::internal_io(
            format!("{} -> {}: {}", from.display(), to.display(), e),
            Some(operation.to_string()),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_file_returns_error_for_missing_file() {
        let result = read_file(Path::new("/nonexistent/path.txt"), "test read");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn clear_dir_resets_contents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("stale.txt"), "old").unwrap();

        clear_dir(&target, "test clear").unwrap();

        assert!(target.exists());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn copy_file_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.txt");
        fs::write(&from, "payload").unwrap();

        let to = dir.path().join("nested/deep/b.txt");
        copy_file(&from, &to, "test copy").unwrap();

        assert_eq!(fs::read_to_string(to).unwrap(), "payload");
    }
}
