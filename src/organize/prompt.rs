//! Interactive collaborators: choosing the source root and confirming destructive options.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;

/// Provides the root directory of the source tree to organize.
pub trait SourceRootProvider {
    /// Absolute path to the selected source root.
    ///
    /// # Errors
    /// Returns an error if no valid directory could be obtained.
    fn source_root(&self) -> anyhow::Result<PathBuf>;
}

/// Asks a yes/no question before a destructive operation.
pub trait Confirm {
    /// Returns true if the user accepted.
    ///
    /// # Errors
    /// Returns an error if the answer could not be read.
    fn confirm(&self, message: &str) -> anyhow::Result<bool>;
}

/// Source root given as a command line argument.
/// Falls back to the current working directory when no path was given.
#[derive(Debug, Default)]
pub struct PathArgument(pub Option<PathBuf>);

/// Asks for the source root on stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

/// Reads a `y/[n]` answer from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirm;

/// Answers every confirmation with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl SourceRootProvider for PathArgument {
    fn source_root(&self) -> anyhow::Result<PathBuf> {
        crate::resolve_input_path(self.0.as_deref())
    }
}

impl SourceRootProvider for StdinPrompt {
    fn source_root(&self) -> anyhow::Result<PathBuf> {
        print!("{}", "Select the source directory to organize: ".magenta());
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut input)
            .context("Failed to read source directory")?;
        crate::resolve_input_path(Some(Path::new(input.trim())))
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> anyhow::Result<bool> {
        print!("{}", message.magenta());
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

impl Confirm for AutoConfirm {
    fn confirm(&self, _message: &str) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}
