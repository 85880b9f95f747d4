//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a directory tree into `to`, creating directories as needed
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, FilesystemError> {
    let mut copied = 0;
    for entry in walkdir::WalkDir::new(from)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target).map_err(|e| FilesystemError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            error: e.to_string(),
        })?;
        copied += 1;
    }
    Ok(copied)
}

/// Collect files under `dir` whose extension is in `extensions`, sorted
///
/// A missing directory yields no files.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, FilesystemError> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    for entry in walkdir::WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| FilesystemError::ReadFile {
            path: dir.to_path_buf(),
            error: e.to_string(),
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if entry.file_type().is_file() && matches {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
