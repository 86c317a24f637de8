use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::organize::{PoseOrganizeConfig, RunStats};

/// Simple file logger for organize runs with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/pose-organize/organize_<timestamp>.log
    ///
    /// # Errors
    /// Returns an error if the log directory or file cannot be created.
    pub fn new() -> Result<Self> {
        let log_dir = crate::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;
        Self::in_directory(log_dir)
    }

    /// Create a new file logger writing to a timestamped file in the given directory.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created.
    pub fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("organize_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting a run
    pub fn log_init(&mut self, source_root: &Path, destination_root: &Path, config: &PoseOrganizeConfig) {
        let _ = writeln!(
            self.writer,
            "[{}] INIT \"{}\" -> \"{}\"",
            Self::timestamp(),
            source_root.display(),
            destination_root.display()
        );
        let _ = writeln!(self.writer, "  sony_only: {}", config.sony_only);
        let _ = writeln!(self.writer, "  filt_only: {}", config.filt_only);
        let _ = writeln!(self.writer, "  keep_filt_in_filename: {}", config.keep_filt_in_filename);
        let _ = writeln!(self.writer, "  primary_subject_only: {}", config.primary_subject_only);
        let _ = writeln!(self.writer, "  merged_only: {}", config.merged_only);
        let _ = writeln!(self.writer, "  nested_subject_folders: {}", config.nested_subject_folders);
        let _ = writeln!(self.writer, "  delete_source_after_copy: {}", config.delete_source_after_copy);
        let _ = writeln!(
            self.writer,
            "  replace_destination_with_staging: {}",
            config.replace_destination_with_staging
        );
        let _ = writeln!(self.writer, "  extension: {}", config.extension);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = self.writer.flush();
    }

    /// Log a newly created destination file
    pub fn log_created(&mut self, source: &Path, destination: &Path) {
        self.log_file_event("CREATED", source, destination);
    }

    /// Log a copy skipped because the destination already exists
    pub fn log_skipped(&mut self, source: &Path, destination: &Path) {
        self.log_file_event("SKIPPED", source, destination);
    }

    /// Log a file that could not be mapped or copied
    pub fn log_failed(&mut self, source: &Path, error: &anyhow::Error) {
        let _ = writeln!(
            self.writer,
            "[{}] FAILED  \"{}\" | {error:#}",
            Self::timestamp(),
            source.display()
        );
        let _ = self.writer.flush();
    }

    /// Log a removed source directory
    pub fn log_removed(&mut self, directory: &Path) {
        let _ = writeln!(
            self.writer,
            "[{}] REMOVED \"{}\"",
            Self::timestamp(),
            directory.display()
        );
        let _ = self.writer.flush();
    }

    /// Log the final run summary
    pub fn log_summary(&mut self, stats: &RunStats) {
        let _ = writeln!(self.writer, "[{}] SUMMARY {stats}", Self::timestamp());
        let _ = self.writer.flush();
    }

    fn log_file_event(&mut self, event: &str, source: &Path, destination: &Path) {
        let _ = writeln!(
            self.writer,
            "[{}] {event:<7} \"{}\" -> \"{}\"",
            Self::timestamp(),
            source.display(),
            destination.display()
        );
        let _ = self.writer.flush();
    }
}
