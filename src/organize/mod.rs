//! Pose file organizing.
//!
//! Discovers pose files under a `{study}_c3d` source tree, derives a flat
//! `{subject}_{task}_{trial}` filename for each from its ancestor directories,
//! and copies them into a parallel `{study}_v3d` output tree without ever
//! overwriting an existing file.

mod config;
mod copy;
mod error;
mod filter;
mod logger;
mod mapper;
mod organizer;
mod prompt;
mod root;
mod walk;

pub use config::{OrganizeConfig, PoseOrganizeConfig};
pub use copy::{CleanupOutcome, CopyOutcome, cleanup_source_directories, move_staging_into_source, safe_copy};
pub use error::OrganizeError;
pub use filter::FilterChain;
pub use logger::FileLogger;
pub use mapper::{NameMapper, PoseLocation, RenameMapping};
pub use organizer::{PoseOrganize, RunStats};
pub use prompt::{AutoConfirm, Confirm, PathArgument, SourceRootProvider, StdinConfirm, StdinPrompt};
pub use root::derive_output_root;
pub use walk::enumerate_files;
