//! Configuration for pose file organizing.

use std::{fmt, fs};

use anyhow::Context;
use serde::Deserialize;

use crate::organize::{Confirm, OrganizeError};

pub const DEFAULT_EXTENSION: &str = "c3d";
pub const DEFAULT_MARKER_SUFFIX: &str = "_c3d";
pub const DEFAULT_REPLACEMENT_SUFFIX: &str = "_v3d";
pub const DEFAULT_SUBFOLDER_NAME: &str = "data_v3d";

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizeConfig {
    #[serde(default)]
    pub auto: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub default_subfolder_name: Option<String>,
    #[serde(default)]
    pub delete_source_after_copy: bool,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub filt_only: bool,
    #[serde(default)]
    pub keep_filt_in_filename: bool,
    #[serde(default)]
    pub log: bool,
    #[serde(default)]
    pub marker_suffix: Option<String>,
    #[serde(default)]
    pub merged_only: bool,
    #[serde(default)]
    pub nested_subject_folders: bool,
    #[serde(default)]
    pub primary_subject_only: bool,
    #[serde(default)]
    pub replace_destination_with_staging: bool,
    #[serde(default)]
    pub replacement_suffix: Option<String>,
    #[serde(default)]
    pub sony_only: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    organize: OrganizeConfig,
}

/// Final config created from CLI arguments and user config file.
///
/// Built once per run and shared by reference with every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoseOrganizeConfig {
    pub auto: bool,
    pub debug: bool,
    pub default_subfolder_name: String,
    pub delete_source_after_copy: bool,
    pub dryrun: bool,
    pub extension: String,
    pub filt_only: bool,
    pub keep_filt_in_filename: bool,
    pub log: bool,
    pub marker_suffix: String,
    pub merged_only: bool,
    pub nested_subject_folders: bool,
    pub primary_subject_only: bool,
    pub replace_destination_with_staging: bool,
    pub replacement_suffix: String,
    pub sony_only: bool,
    pub verbose: bool,
}

impl OrganizeConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.organize)
            .context("Failed to parse organize config TOML")
    }
}

impl Default for PoseOrganizeConfig {
    fn default() -> Self {
        Self {
            auto: false,
            debug: false,
            default_subfolder_name: DEFAULT_SUBFOLDER_NAME.to_string(),
            delete_source_after_copy: false,
            dryrun: false,
            extension: DEFAULT_EXTENSION.to_string(),
            filt_only: false,
            keep_filt_in_filename: false,
            log: false,
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            merged_only: false,
            nested_subject_folders: false,
            primary_subject_only: false,
            replace_destination_with_staging: false,
            replacement_suffix: DEFAULT_REPLACEMENT_SUFFIX.to_string(),
            sony_only: false,
            verbose: false,
        }
    }
}

impl PoseOrganizeConfig {
    /// File extension with a leading dot, for example `.c3d`.
    #[must_use]
    pub fn dotted_extension(&self) -> String {
        format!(".{}", self.extension)
    }

    /// Resolve the replace-without-delete flag mismatch.
    ///
    /// Replacing the source directory with the staging output only makes sense
    /// when the original files are removed. If deletion is not enabled,
    /// ask for confirmation: accepting enables deletion, declining aborts the run.
    ///
    /// # Errors
    /// Returns [`OrganizeError::ConfirmationDeclined`] if the user declines,
    /// or an error if reading the answer fails.
    pub fn resolve_destructive_flags(&mut self, confirm: &dyn Confirm) -> anyhow::Result<()> {
        if !self.replace_destination_with_staging || self.delete_source_after_copy {
            return Ok(());
        }
        let accepted = self.auto
            || confirm.confirm(
                "Delete source flag is off while replace source flag is on. \
                 Continue and replace (delete) the original directories? y/[n]: ",
            )?;
        if accepted {
            self.delete_source_after_copy = true;
            Ok(())
        } else {
            Err(OrganizeError::ConfirmationDeclined.into())
        }
    }
}

impl From<OrganizeConfig> for PoseOrganizeConfig {
    fn from(user_config: OrganizeConfig) -> Self {
        let defaults = Self::default();
        Self {
            auto: user_config.auto,
            debug: user_config.debug,
            default_subfolder_name: user_config
                .default_subfolder_name
                .unwrap_or(defaults.default_subfolder_name),
            delete_source_after_copy: user_config.delete_source_after_copy,
            dryrun: user_config.dryrun,
            extension: user_config
                .extension
                .map(|extension| extension.trim_start_matches('.').to_string())
                .unwrap_or(defaults.extension),
            filt_only: user_config.filt_only,
            keep_filt_in_filename: user_config.keep_filt_in_filename,
            log: user_config.log,
            marker_suffix: user_config.marker_suffix.unwrap_or(defaults.marker_suffix),
            merged_only: user_config.merged_only,
            nested_subject_folders: user_config.nested_subject_folders,
            primary_subject_only: user_config.primary_subject_only,
            replace_destination_with_staging: user_config.replace_destination_with_staging,
            replacement_suffix: user_config.replacement_suffix.unwrap_or(defaults.replacement_suffix),
            sony_only: user_config.sony_only,
            verbose: user_config.verbose,
        }
    }
}

impl fmt::Display for PoseOrganizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  auto:          {}", crate::colorize_bool(self.auto))?;
        writeln!(f, "  debug:         {}", crate::colorize_bool(self.debug))?;
        writeln!(f, "  dryrun:        {}", crate::colorize_bool(self.dryrun))?;
        writeln!(f, "  sony only:     {}", crate::colorize_bool(self.sony_only))?;
        writeln!(f, "  filt only:     {}", crate::colorize_bool(self.filt_only))?;
        writeln!(f, "  keep filt:     {}", crate::colorize_bool(self.keep_filt_in_filename))?;
        writeln!(f, "  primary only:  {}", crate::colorize_bool(self.primary_subject_only))?;
        writeln!(f, "  merged only:   {}", crate::colorize_bool(self.merged_only))?;
        writeln!(f, "  nested:        {}", crate::colorize_bool(self.nested_subject_folders))?;
        writeln!(f, "  delete source: {}", crate::colorize_bool(self.delete_source_after_copy))?;
        writeln!(
            f,
            "  replace:       {}",
            crate::colorize_bool(self.replace_destination_with_staging)
        )?;
        writeln!(f, "  log:           {}", crate::colorize_bool(self.log))?;
        writeln!(f, "  verbose:       {}", crate::colorize_bool(self.verbose))?;
        writeln!(f, "  extension:     \"{}\"", self.extension)?;
        writeln!(f, "  marker:        \"{}\"", self.marker_suffix)?;
        writeln!(f, "  replacement:   \"{}\"", self.replacement_suffix)?;
        writeln!(f, "  default dir:   \"{}\"", self.default_subfolder_name)
    }
}
