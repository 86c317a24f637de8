use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before any filesystem mutation.
///
/// Per-file problems are reported and counted instead of being raised.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The selected source root does not exist or is not accessible.
    #[error("Source directory does not exist or is not accessible: '{}'", .0.display())]
    SourceRootMissing(PathBuf),
    /// The selected source root is not a directory.
    #[error("Source path is not a directory: '{}'", .0.display())]
    SourceRootNotDirectory(PathBuf),
    /// A destructive flag combination was refused at the confirmation prompt.
    #[error("Aborted: replacing the source directory was not confirmed")]
    ConfirmationDeclined,
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let error = OrganizeError::SourceRootMissing(PathBuf::from("/data/Study1_c3d"));
        assert_eq!(
            error.to_string(),
            "Source directory does not exist or is not accessible: '/data/Study1_c3d'"
        );
        let error = OrganizeError::SourceRootNotDirectory(PathBuf::from("/data/pose_0.c3d"));
        assert_eq!(error.to_string(), "Source path is not a directory: '/data/pose_0.c3d'");
    }

    #[test]
    fn wraps_into_anyhow_and_downcasts() {
        let error: anyhow::Error = OrganizeError::ConfirmationDeclined.into();
        assert!(matches!(
            error.downcast_ref::<OrganizeError>(),
            Some(OrganizeError::ConfirmationDeclined)
        ));
    }
}
