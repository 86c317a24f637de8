//! Create-only file copying and source directory cleanup.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;

use crate::organize::PoseLocation;
use crate::{is_directory_empty, print_error, print_warning};

/// Result of a single [`safe_copy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination file was written.
    Created,
    /// The destination already existed and was left untouched.
    SkippedExisting,
}

/// Directories removed by [`cleanup_source_directories`], deepest first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub removed: Vec<PathBuf>,
}

/// Copy `source` to `destination`, creating missing parent directories.
///
/// The destination is opened with create-new semantics, so an existing file is never
/// overwritten: the first writer wins and later attempts report [`CopyOutcome::SkippedExisting`].
/// File permissions and modification time are carried over.
/// A partially written destination is removed if the copy fails.
///
/// # Errors
/// Returns an error if the source cannot be read or the destination cannot be written.
pub fn safe_copy(source: &Path, destination: &Path) -> anyhow::Result<CopyOutcome> {
    if destination.exists() {
        return Ok(CopyOutcome::SkippedExisting);
    }

    let mut input = File::open(source).with_context(|| format!("Failed to open {}", source.display()))?;
    let metadata = input
        .metadata()
        .with_context(|| format!("Failed to read metadata for {}", source.display()))?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut output = match File::options().write(true).create_new(true).open(destination) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => return Ok(CopyOutcome::SkippedExisting),
        Err(error) => {
            return Err(error).with_context(|| format!("Failed to create {}", destination.display()));
        }
    };

    let written = io::copy(&mut input, &mut output).and_then(|_| {
        if let Ok(modified) = metadata.modified() {
            output.set_modified(modified)?;
        }
        output.set_permissions(metadata.permissions())
    });

    if let Err(error) = written {
        drop(output);
        remove_partial_destination(destination);
        return Err(error).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                destination.display()
            )
        });
    }

    Ok(CopyOutcome::Created)
}

/// Remove an incomplete copy so a later run does not skip it as existing.
/// Returns false and prints a warning if the file could not be removed.
fn remove_partial_destination(destination: &Path) -> bool {
    match fs::remove_file(destination) {
        Ok(()) => true,
        Err(error) => {
            print_warning!(
                "Failed to remove incomplete copy {}, delete it manually: {error}",
                destination.display()
            );
            false
        }
    }
}

/// Remove the trial directory of an already processed file,
/// then its task and subject directories if they became empty.
///
/// Only directories strictly inside `source_root` are touched, and never one
/// that contains `destination_root`. Missing or non-empty task and subject
/// directories are silently kept.
///
/// # Errors
/// Returns an error if the trial directory exists but cannot be removed.
pub fn cleanup_source_directories(
    location: &PoseLocation,
    source_root: &Path,
    destination_root: &Path,
) -> anyhow::Result<CleanupOutcome> {
    let removable = |dir: &Path| dir.starts_with(source_root) && dir != source_root && !destination_root.starts_with(dir);

    let mut outcome = CleanupOutcome::default();
    if !removable(location.trial_dir.as_path()) {
        return Ok(outcome);
    }

    match fs::remove_dir_all(&location.trial_dir) {
        Ok(()) => outcome.removed.push(location.trial_dir.clone()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(error)
                .with_context(|| format!("Failed to remove directory {}", location.trial_dir.display()));
        }
    }

    for dir in [&location.task_dir, &location.subject_dir] {
        if removable(dir.as_path()) && is_directory_empty(dir) && fs::remove_dir(dir).is_ok() {
            outcome.removed.push(dir.clone());
        }
    }

    Ok(outcome)
}

/// Move every top-level entry of the staging root into the source root,
/// then remove the staging root if nothing was left behind.
///
/// Entries whose name already exists in the source root are kept in staging and reported.
/// Returns the number of moved entries.
///
/// # Errors
/// Returns an error if the staging root cannot be read.
pub fn move_staging_into_source(staging_root: &Path, source_root: &Path) -> anyhow::Result<usize> {
    let entries: Vec<PathBuf> = fs::read_dir(staging_root)
        .with_context(|| format!("Failed to read staging directory {}", staging_root.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .sorted_unstable()
        .collect();

    let mut moved = 0;
    for entry in entries {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let target = source_root.join(name);
        if target.exists() {
            print_warning!("Skipping existing: {}", target.display());
            continue;
        }
        match fs::rename(&entry, &target) {
            Ok(()) => moved += 1,
            Err(error) => print_error!("Failed to move {} to {}: {error}", entry.display(), target.display()),
        }
    }

    if is_directory_empty(staging_root) {
        fs::remove_dir(staging_root)
            .with_context(|| format!("Failed to remove staging directory {}", staging_root.display()))?;
    }

    Ok(moved)
}
