pub mod config;
pub mod organize;

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::{ColoredString, Colorize};
use unicode_normalization::UnicodeNormalization;

/// Format bool value as a coloured string.
#[must_use]
pub fn colorize_bool(value: bool) -> ColoredString {
    if value { "true".green() } else { "false".red() }
}

/// Get the normalized directory name from a Path with special characters retained.
///
/// Directory names are converted to Unicode NFC so that subject and task names
/// containing characters like "ä" produce the same filename on every platform.
pub fn get_normalized_dir_name(path: &Path) -> Result<String> {
    let dir_name = os_str_to_string(path.file_name().context("Failed to get directory name")?);

    Ok(dir_name.nfc().collect::<String>())
}

/// Check if directory is empty (contains no files or subdirectories).
/// Returns false for a directory that cannot be read.
#[must_use]
pub fn is_directory_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
}

/// Resolves the provided source directory or file to an absolute path.
///
/// If `path` is `None` or blank, the current working directory is used.
/// Surrounding whitespace is trimmed from UTF-8 paths, other paths are used as given.
/// Returns an error if the resolved path does not exist or is not accessible.
/// ```rust
/// use std::path::Path;
/// use pose_organize::resolve_input_path;
///
/// let absolute_path = resolve_input_path(Some(Path::new("src"))).unwrap();
/// assert!(absolute_path.is_absolute());
/// ```
pub fn resolve_input_path(path: Option<&Path>) -> Result<PathBuf> {
    let filepath = match path.map(trim_path) {
        Some(filepath) if !filepath.as_os_str().is_empty() => filepath,
        _ => env::current_dir().context("Failed to get current working directory")?,
    };
    if !filepath.exists() {
        anyhow::bail!(
            "Input path does not exist or is not accessible: '{}'",
            filepath.display()
        );
    }

    let absolute_input_path = dunce::canonicalize(&filepath)
        .with_context(|| format!("Failed to resolve input path: '{}'", filepath.display()))?;

    // Canonicalize fails for network drives on Windows :(
    if path_to_string(&absolute_input_path).starts_with(r"\\?") && !path_to_string(&filepath).starts_with(r"\\?") {
        Ok(filepath)
    } else {
        Ok(absolute_input_path)
    }
}

fn trim_path(path: &Path) -> PathBuf {
    path.to_str()
        .map_or_else(|| path.to_path_buf(), |text| PathBuf::from(text.trim()))
}

/// Gets the relative path or filename from a full path based on a root directory.
///
/// If the full path is within the root directory, the function returns the relative path.
/// Otherwise, it returns just the filename. If the filename cannot be determined, the
/// full path is returned.
///
/// ```rust
/// use std::path::Path;
/// use pose_organize::get_relative_path_or_filename;
///
/// let root = Path::new("/data/Study1_c3d");
/// let full_path = root.join("SubjA/Walk/Trial1/pose_0.c3d");
/// let relative_path = get_relative_path_or_filename(&full_path, root);
/// assert_eq!(relative_path, "SubjA/Walk/Trial1/pose_0.c3d");
///
/// let outside_path = Path::new("/data/Study1_v3d/SubjA_Walk_Trial1.c3d");
/// let relative_or_filename = get_relative_path_or_filename(outside_path, root);
/// assert_eq!(relative_or_filename, "SubjA_Walk_Trial1.c3d");
/// ```
#[must_use]
pub fn get_relative_path_or_filename(full_path: &Path, root: &Path) -> String {
    if full_path == root {
        return full_path.file_name().unwrap_or_default().to_string_lossy().to_string();
    }
    full_path.strip_prefix(root).map_or_else(
        |_| {
            full_path.file_name().map_or_else(
                || full_path.display().to_string(),
                |name| name.to_string_lossy().to_string(),
            )
        },
        |relative_path| relative_path.display().to_string(),
    )
}

/// Convert `OsStr` to String with invalid Unicode handling.
pub fn os_str_to_string(name: &OsStr) -> String {
    name.to_str().map_or_else(
        || name.to_string_lossy().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to string with invalid Unicode handling.
pub fn path_to_string(path: &Path) -> String {
    path.to_str().map_or_else(
        || path.to_string_lossy().to_string().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to filename string with invalid Unicode handling.
#[must_use]
pub fn path_to_filename_string(path: &Path) -> String {
    os_str_to_string(path.file_name().unwrap_or_default())
}

#[inline]
pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {message}").red());
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::print_error(&format!($($arg)*))
    };
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

#[inline]
pub fn print_bold(message: &str) {
    println!("{}", message.bold());
}

#[macro_export]
macro_rules! print_bold {
    ($($arg:tt)*) => {
        $crate::print_bold(&format!($($arg)*))
    };
}

/// Print the completion script for `shell`, or install it when `install` is set.
pub fn generate_shell_completion(shell: Shell, mut command: Command, install: bool, command_name: &str) -> Result<()> {
    if !install {
        clap_complete::generate(shell, &mut command, command_name, &mut std::io::stdout());
        return Ok(());
    }
    let home = dirs::home_dir().context("Failed to get home directory")?;
    let out_dir = shell_completion_dir(shell, &home, command_name)?;
    let path = clap_complete::generate_to(shell, &mut command, command_name, out_dir)
        .context("Failed to write shell completion file")?;
    println!("Completion file generated to: {}", path.display());
    Ok(())
}

/// Pick the install directory for a completion script, creating the user directory if needed.
///
/// An oh-my-zsh plugin directory wins for zsh, then an existing user directory,
/// then an existing system directory.
fn shell_completion_dir(shell: Shell, home: &Path, command_name: &str) -> Result<PathBuf> {
    let omz_plugins = home.join(".oh-my-zsh/custom/plugins");
    if shell == Shell::Zsh && omz_plugins.is_dir() {
        let plugin_dir = omz_plugins.join(command_name);
        std::fs::create_dir_all(&plugin_dir)?;
        return Ok(plugin_dir);
    }

    let (user_dir, system_dir) = completion_dir_candidates(shell, home)?;
    if user_dir.is_dir() {
        return Ok(user_dir);
    }
    if let Some(system_dir) = system_dir.filter(|dir| dir.is_dir()) {
        return Ok(system_dir);
    }
    std::fs::create_dir_all(&user_dir)
        .with_context(|| format!("Failed to create completion directory {}", user_dir.display()))?;
    Ok(user_dir)
}

/// User and system completion directories for `shell`.
fn completion_dir_candidates(shell: Shell, home: &Path) -> Result<(PathBuf, Option<PathBuf>)> {
    let candidates = match shell {
        Shell::Bash => (
            home.join(".bash_completion.d"),
            Some(PathBuf::from("/etc/bash_completion.d")),
        ),
        Shell::Elvish => (home.join(".elvish"), None),
        Shell::Fish => (
            home.join(".config/fish/completions"),
            Some(PathBuf::from("/usr/share/fish/completions")),
        ),
        Shell::PowerShell if cfg!(windows) => (home.join(r"Documents\PowerShell\completions"), None),
        Shell::PowerShell => (home.join(".config/powershell/completions"), None),
        Shell::Zsh => (
            home.join(".zsh/completions"),
            Some(PathBuf::from("/usr/share/zsh/site-functions")),
        ),
        _ => anyhow::bail!("Unsupported shell: {shell}"),
    };
    Ok(candidates)
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    use std::fs::{self, File};

    use tempfile::tempdir;

    #[test]
    fn test_resolve_input_path_valid() {
        let dir = tempdir().unwrap();
        let resolved = resolve_input_path(Some(dir.path()));
        assert!(resolved.is_ok());
    }

    #[test]
    fn test_resolve_input_path_nonexistent() {
        let path = Path::new("nonexistent_c3d");
        let resolved = resolve_input_path(Some(path));
        assert!(resolved.is_err());
    }

    #[test]
    fn test_resolve_input_path_empty() {
        let path = Path::new("  \n");
        let resolved = resolve_input_path(Some(path));
        assert!(resolved.is_ok());
        assert_eq!(resolved.unwrap(), dunce::canonicalize(env::current_dir().unwrap()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_input_path_missing_non_utf8_is_error() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let missing = dir.path().join(OsStr::from_bytes(b"Study\xff_c3d"));
        assert!(resolve_input_path(Some(&missing)).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolve_input_path_keeps_non_utf8_directory() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let root = dir.path().join(OsStr::from_bytes(b"Study\xff_c3d"));
        fs::create_dir(&root).unwrap();

        let resolved = resolve_input_path(Some(&root)).unwrap();
        assert_eq!(resolved, dunce::canonicalize(&root).unwrap());
        assert_ne!(resolved, dunce::canonicalize(env::current_dir().unwrap()).unwrap());
    }

    #[test]
    fn test_is_directory_empty() {
        let dir = tempdir().unwrap();
        assert!(is_directory_empty(dir.path()));

        File::create(dir.path().join("pose_1.c3d")).unwrap();
        assert!(!is_directory_empty(dir.path()));
    }

    #[test]
    fn test_is_directory_empty_with_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Trial1")).unwrap();
        assert!(!is_directory_empty(dir.path()));
    }

    #[test]
    fn test_is_directory_empty_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(!is_directory_empty(&dir.path().join("missing")));
    }

    #[test]
    fn test_normalized_dir_name_composes_characters() {
        let path = PathBuf::from("/data/Study_c3d/Ma\u{0308}tta");
        assert_eq!(get_normalized_dir_name(&path).unwrap(), "M\u{00e4}tta");
    }

    #[test]
    fn test_completion_dir_candidates() {
        let home = Path::new("/home/user");
        let (user_dir, system_dir) = completion_dir_candidates(Shell::Fish, home).unwrap();
        assert_eq!(user_dir, home.join(".config/fish/completions"));
        assert_eq!(system_dir, Some(PathBuf::from("/usr/share/fish/completions")));

        let (user_dir, system_dir) = completion_dir_candidates(Shell::Elvish, home).unwrap();
        assert_eq!(user_dir, home.join(".elvish"));
        assert!(system_dir.is_none());
    }

    #[test]
    fn test_shell_completion_dir_creates_user_dir() {
        let home = tempdir().unwrap();
        let dir = shell_completion_dir(Shell::Elvish, home.path(), "poseorg").unwrap();
        assert_eq!(dir, home.path().join(".elvish"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_shell_completion_dir_prefers_oh_my_zsh() {
        let home = tempdir().unwrap();
        fs::create_dir_all(home.path().join(".oh-my-zsh/custom/plugins")).unwrap();
        let dir = shell_completion_dir(Shell::Zsh, home.path(), "poseorg").unwrap();
        assert_eq!(dir, home.path().join(".oh-my-zsh/custom/plugins/poseorg"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_relative_path_for_root_is_name() {
        let root = Path::new("/data/Study1_c3d");
        assert_eq!(get_relative_path_or_filename(root, root), "Study1_c3d");
    }
}
