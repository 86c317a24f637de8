use std::path::{Path, PathBuf};

use crate::organize::PoseOrganizeConfig;
use crate::{path_to_filename_string, path_to_string};

/// Marker for cameras recorded with Sony devices.
pub const SONY_MARKER: &str = "-Sony";
/// Marker for filtered (smoothed) pose data.
pub const FILTERED_MARKER: &str = "_filt_";
/// Filename markers for the primary subject.
pub const PRIMARY_SUBJECT_MARKERS: [&str; 2] = ["pose_0", "filt_0"];
/// Marker for force-merged pose output.
pub const MERGED_MARKER: &str = "_merged";

/// Conjunction of the enabled candidate file predicates.
///
/// Every predicate is a substring test, so the order of application does not
/// change the resulting set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChain {
    extension: String,
    sony_only: bool,
    filt_only: bool,
    primary_subject_only: bool,
    merged_only: bool,
}

impl FilterChain {
    #[must_use]
    pub fn new(config: &PoseOrganizeConfig) -> Self {
        Self {
            extension: config.dotted_extension(),
            sony_only: config.sony_only,
            filt_only: config.filt_only,
            primary_subject_only: config.primary_subject_only,
            merged_only: config.merged_only,
        }
    }

    /// Check a single file against all enabled predicates.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let full_path = path_to_string(path);
        let basename = path_to_filename_string(path);
        self.matches_parts(&full_path, &basename)
    }

    /// Check the full path and basename strings against all enabled predicates.
    #[must_use]
    pub fn matches_parts(&self, full_path: &str, basename: &str) -> bool {
        full_path.contains(&self.extension)
            && (!self.sony_only || full_path.contains(SONY_MARKER))
            && (!self.filt_only || full_path.contains(FILTERED_MARKER))
            && (!self.primary_subject_only || PRIMARY_SUBJECT_MARKERS.iter().any(|marker| basename.contains(marker)))
            && (!self.merged_only || full_path.contains(MERGED_MARKER))
    }

    /// Keep only the files that pass every enabled predicate, preserving order.
    #[must_use]
    pub fn apply(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
        files.into_iter().filter(|path| self.matches(path)).collect()
    }
}
