//! Run the full organize pipeline for one source tree.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;
use itertools::Itertools;

use crate::organize::walk::enumerate_files_excluding;
use crate::organize::{
    Confirm, CopyOutcome, FileLogger, FilterChain, NameMapper, OrganizeError, PoseLocation, PoseOrganizeConfig,
    RenameMapping, SourceRootProvider, cleanup_source_directories, derive_output_root, move_staging_into_source,
    safe_copy,
};
use crate::{get_relative_path_or_filename, print_bold, print_error, print_warning};

/// Organizes pose files from a source tree into the derived output tree.
pub struct PoseOrganize {
    source_root: PathBuf,
    destination_root: PathBuf,
    config: PoseOrganizeConfig,
    logger: Option<FileLogger>,
}

/// Counts collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Files that passed the filter chain.
    pub candidates: usize,
    pub created: usize,
    pub skipped: usize,
    /// Files whose copy failed.
    pub failed: usize,
    /// Files without subject/task/trial directories.
    pub unmapped: usize,
    pub removed_directories: usize,
    /// Staging entries moved into the source root.
    pub moved_to_source: usize,
}

impl PoseOrganize {
    /// Create an organizer for the given source root.
    ///
    /// # Errors
    /// Returns an [`OrganizeError`] if the source root is missing or not a directory.
    pub fn new(source_root: PathBuf, config: PoseOrganizeConfig) -> anyhow::Result<Self> {
        if !source_root.exists() {
            return Err(OrganizeError::SourceRootMissing(source_root).into());
        }
        if !source_root.is_dir() {
            return Err(OrganizeError::SourceRootNotDirectory(source_root).into());
        }

        let destination_root = derive_output_root(
            &source_root,
            &config.marker_suffix,
            &config.replacement_suffix,
            &config.default_subfolder_name,
        );

        if config.debug {
            eprint!("{config}");
            eprintln!("Source:      {}", source_root.display());
            eprintln!("Destination: {}", destination_root.display());
        }

        Ok(Self {
            source_root,
            destination_root,
            config,
            logger: None,
        })
    }

    /// Resolve destructive flags, then ask the provider for the source root.
    ///
    /// Confirmation happens before anything else so that a declined prompt
    /// leaves the filesystem untouched.
    ///
    /// # Errors
    /// Returns an error if confirmation is declined or no valid source root is provided.
    pub fn from_provider(
        provider: &dyn SourceRootProvider,
        confirm: &dyn Confirm,
        mut config: PoseOrganizeConfig,
    ) -> anyhow::Result<Self> {
        config.resolve_destructive_flags(confirm)?;
        let source_root = provider.source_root()?;
        Self::new(source_root, config)
    }

    /// Also write run events to the given log file.
    #[must_use]
    pub fn with_logger(mut self, logger: FileLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[must_use]
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Gather candidate files and compute their destinations.
    ///
    /// Files whose subject, task and trial cannot be determined are reported and counted.
    ///
    /// # Errors
    /// Returns an error if the source root cannot be listed.
    pub fn plan(&mut self, stats: &mut RunStats) -> anyhow::Result<Vec<RenameMapping>> {
        let excluded = (self.destination_root != self.source_root && self.destination_root.starts_with(&self.source_root))
            .then_some(self.destination_root.as_path());
        let files = enumerate_files_excluding(&self.source_root, excluded)?;
        let candidates = FilterChain::new(&self.config).apply(files);
        stats.candidates = candidates.len();

        let mapper = NameMapper::new(&self.config, self.destination_root.clone());
        let mut mappings = Vec::with_capacity(candidates.len());
        for file in candidates {
            match mapper.map(&file) {
                Ok(mapping) => mappings.push(mapping),
                Err(error) => {
                    print_error!("{error:#}");
                    if let Some(logger) = self.logger.as_mut() {
                        logger.log_failed(&file, &error);
                    }
                    stats.unmapped += 1;
                }
            }
        }
        Ok(mappings)
    }

    /// Run organizing.
    ///
    /// # Errors
    /// Returns an error if the source root cannot be listed.
    /// Per-file failures are reported and counted in the returned stats instead.
    pub fn run(&mut self) -> anyhow::Result<RunStats> {
        let mut stats = RunStats::default();
        if let Some(logger) = self.logger.as_mut() {
            logger.log_init(&self.source_root, &self.destination_root, &self.config);
        }

        if self.config.verbose {
            print_bold!(
                "Organizing {} -> {}",
                self.source_root.display(),
                self.destination_root.display()
            );
        }

        let mappings = self.plan(&mut stats)?;
        if mappings.is_empty() {
            if self.config.verbose {
                println!("No {} files to organize", self.config.extension);
            }
            self.finish(&stats);
            return Ok(stats);
        }

        let schedule = if self.config.delete_source_after_copy {
            cleanup_schedule(&mappings)
        } else {
            HashMap::new()
        };
        let mut failed_sources: Vec<&Path> = Vec::new();
        let mut planned: HashSet<PathBuf> = HashSet::new();

        for (index, mapping) in mappings.iter().enumerate() {
            if !self.copy_file(mapping, &mut planned, &mut stats) {
                failed_sources.push(&mapping.source);
            }

            for location in schedule.get(&index).into_iter().flatten() {
                if failed_sources.iter().any(|source| source.starts_with(&location.trial_dir)) {
                    print_warning!("Keeping {} since a copy from it failed", location.trial_dir.display());
                } else {
                    self.cleanup(location, &mut stats);
                }
            }
        }

        if self.config.replace_destination_with_staging {
            self.replace_source_with_staging(&mut stats);
        }

        self.finish(&stats);
        Ok(stats)
    }

    /// Copy one file. Returns false if the copy failed.
    fn copy_file(&mut self, mapping: &RenameMapping, planned: &mut HashSet<PathBuf>, stats: &mut RunStats) -> bool {
        if self.config.verbose {
            println!(
                "{}",
                get_relative_path_or_filename(&mapping.source, &self.source_root).dimmed()
            );
        }

        if self.config.dryrun {
            if mapping.destination.exists() || !planned.insert(mapping.destination.clone()) {
                println!("Dryrun: would skip existing: {}", mapping.destination.display());
                stats.skipped += 1;
            } else {
                println!("Dryrun: would create: {}", mapping.destination.display());
                stats.created += 1;
            }
            return true;
        }

        match safe_copy(&mapping.source, &mapping.destination) {
            Ok(CopyOutcome::Created) => {
                println!("{} {}", "Created:".green(), mapping.destination.display());
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_created(&mapping.source, &mapping.destination);
                }
                stats.created += 1;
                true
            }
            Ok(CopyOutcome::SkippedExisting) => {
                print_warning!("Skipping existing: {}", mapping.destination.display());
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_skipped(&mapping.source, &mapping.destination);
                }
                stats.skipped += 1;
                true
            }
            Err(error) => {
                print_error!("{error:#}");
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_failed(&mapping.source, &error);
                }
                stats.failed += 1;
                false
            }
        }
    }

    fn cleanup(&mut self, location: &PoseLocation, stats: &mut RunStats) {
        if self.config.dryrun {
            println!("Dryrun: would remove: {}", location.trial_dir.display());
            return;
        }

        match cleanup_source_directories(location, &self.source_root, &self.destination_root) {
            Ok(outcome) => {
                for directory in &outcome.removed {
                    if self.config.verbose {
                        println!("Removed directory: {}", directory.display());
                    }
                    if let Some(logger) = self.logger.as_mut() {
                        logger.log_removed(directory);
                    }
                }
                stats.removed_directories += outcome.removed.len();
            }
            Err(error) => print_error!("{error:#}"),
        }
    }

    fn replace_source_with_staging(&mut self, stats: &mut RunStats) {
        if self.config.dryrun {
            println!(
                "Dryrun: would move contents of {} into {}",
                self.destination_root.display(),
                self.source_root.display()
            );
            return;
        }
        if !self.destination_root.is_dir() {
            return;
        }

        match move_staging_into_source(&self.destination_root, &self.source_root) {
            Ok(moved) => stats.moved_to_source = moved,
            Err(error) => print_error!("{error:#}"),
        }
    }

    fn finish(&mut self, stats: &RunStats) {
        if let Some(logger) = self.logger.as_mut() {
            logger.log_summary(stats);
        }
        if self.config.dryrun {
            println!("Dryrun: would have {stats}");
        } else if stats.failed > 0 || stats.unmapped > 0 {
            println!("{}", format!("Done: {stats}").red().bold());
        } else {
            println!("{}", format!("Done: {stats}").green().bold());
        }
    }
}

/// Group trial directories by the index of the last mapping whose source lies anywhere below them.
///
/// A trial directory is removed recursively, so it must outlive every candidate inside it,
/// including candidates in nested subdirectories that form trials of their own.
/// Within one index, deeper trial directories come first.
fn cleanup_schedule(mappings: &[RenameMapping]) -> HashMap<usize, Vec<&PoseLocation>> {
    let mut schedule: HashMap<usize, Vec<&PoseLocation>> = HashMap::new();
    for location in mappings
        .iter()
        .map(|mapping| &mapping.location)
        .unique_by(|location| location.trial_dir.clone())
    {
        if let Some(index) = mappings
            .iter()
            .rposition(|mapping| mapping.source.starts_with(&location.trial_dir))
        {
            schedule.entry(index).or_default().push(location);
        }
    }
    for locations in schedule.values_mut() {
        locations.sort_by_key(|location| Reverse(location.trial_dir.components().count()));
    }
    schedule
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied {} {}, skipped {} existing",
            self.created,
            if self.created == 1 { "file" } else { "files" },
            self.skipped
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if self.unmapped > 0 {
            write!(f, ", {} without subject/task/trial", self.unmapped)?;
        }
        if self.removed_directories > 0 {
            write!(f, ", removed {} source directories", self.removed_directories)?;
        }
        if self.moved_to_source > 0 {
            write!(f, ", moved {} entries into source", self.moved_to_source)?;
        }
        Ok(())
    }
}
