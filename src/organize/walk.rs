use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::organize::OrganizeError;
use crate::print_warning;

/// List every regular file under `root`.
///
/// Entries within a directory are visited in name order and subdirectories
/// are fully descended before moving on to the next sibling.
/// Directories and symlinks are never included in the output.
///
/// # Errors
/// Returns an [`OrganizeError`] if `root` is missing or not a directory.
pub fn enumerate_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    enumerate_files_excluding(root, None)
}

/// List every regular file under `root`, without descending into `excluded`.
///
/// Used to keep an output tree that lives inside the source tree out of the candidate list.
///
/// # Errors
/// Returns an [`OrganizeError`] if `root` is missing or not a directory.
pub fn enumerate_files_excluding(root: &Path, excluded: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(OrganizeError::SourceRootMissing(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(OrganizeError::SourceRootNotDirectory(root.to_path_buf()).into());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| excluded.is_none_or(|excluded| entry.path() != excluded));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(error) => print_warning!("Skipping unreadable entry: {error}"),
        }
    }

    Ok(files)
}
