//! Map discovered pose files to their new flat names in the output tree.
//!
//! The subject, task and trial identifiers come from the three directories
//! directly above each file:
//!
//! ```text
//! {root}/.../{subject}/{task}/{trial}/pose_filt_0.c3d
//! ```
//!
//! Counting upward from the file keeps the result independent of how deep the
//! selected source root sits, so extra date or session folders above the
//! subject directory do not shift the meaning of the identifiers.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::organize::PoseOrganizeConfig;
use crate::organize::filter::FILTERED_MARKER;
use crate::{get_normalized_dir_name, path_to_string};

/// Subject, task and trial directories of one pose file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoseLocation {
    pub subject: String,
    pub task: String,
    pub trial: String,
    pub subject_dir: PathBuf,
    pub task_dir: PathBuf,
    pub trial_dir: PathBuf,
}

/// One source file and its computed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMapping {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub location: PoseLocation,
}

/// Derives new filenames and destination paths from file locations.
#[derive(Debug, Clone)]
pub struct NameMapper {
    destination_root: PathBuf,
    extension: String,
    keep_filt_in_filename: bool,
    nested_subject_folders: bool,
}

impl PoseLocation {
    /// Read the trial, task and subject directories above the given file.
    ///
    /// # Errors
    /// Returns an error if the file has fewer than three named ancestor directories.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let trial_dir = path.parent().context("Missing trial directory")?;
        let task_dir = trial_dir.parent().context("Missing task directory")?;
        let subject_dir = task_dir.parent().context("Missing subject directory")?;

        Ok(Self {
            subject: get_normalized_dir_name(subject_dir).context("Missing subject directory name")?,
            task: get_normalized_dir_name(task_dir).context("Missing task directory name")?,
            trial: get_normalized_dir_name(trial_dir).context("Missing trial directory name")?,
            subject_dir: subject_dir.to_path_buf(),
            task_dir: task_dir.to_path_buf(),
            trial_dir: trial_dir.to_path_buf(),
        })
    }
}

impl NameMapper {
    #[must_use]
    pub fn new(config: &PoseOrganizeConfig, destination_root: PathBuf) -> Self {
        Self {
            destination_root,
            extension: config.extension.clone(),
            keep_filt_in_filename: config.keep_filt_in_filename,
            nested_subject_folders: config.nested_subject_folders,
        }
    }

    #[must_use]
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Compute the destination for one source file.
    ///
    /// # Errors
    /// Returns an error if the subject, task and trial cannot be determined from the path.
    pub fn map(&self, source: &Path) -> anyhow::Result<RenameMapping> {
        let location = PoseLocation::from_file(source)
            .with_context(|| format!("Cannot determine subject/task/trial for {}", source.display()))?;

        let is_filtered = path_to_string(source).contains(FILTERED_MARKER);
        let file_name = self.file_name(&location, is_filtered);

        let directory = if self.nested_subject_folders {
            self.destination_root.join(&location.subject)
        } else {
            self.destination_root.clone()
        };

        Ok(RenameMapping {
            source: source.to_path_buf(),
            destination: directory.join(file_name),
            location,
        })
    }

    /// New flat filename: `{subject}_{task}_{trial}.ext` or `{subject}_{task}_{trial}_filt.ext`.
    #[must_use]
    pub fn file_name(&self, location: &PoseLocation, is_filtered: bool) -> String {
        let suffix = if is_filtered && self.keep_filt_in_filename {
            format!("_filt.{}", self.extension)
        } else {
            format!(".{}", self.extension)
        };
        format!("{}_{}_{}{suffix}", location.subject, location.task, location.trial)
    }
}

impl fmt::Display for RenameMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  ==>  {}", self.source.display(), self.destination.display())
    }
}
