mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use pose_organize::organize::{
    AutoConfirm, Confirm, FileLogger, PathArgument, PoseOrganize, SourceRootProvider, StdinConfirm, StdinPrompt,
};

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename and organize pose files into a subject_task_trial layout"
)]
pub(crate) struct Args {
    /// Optional source directory, usually ending with "_c3d"
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Ask for the source directory interactively
    #[arg(short = 'a', long, conflicts_with = "path")]
    ask: bool,

    /// Auto-confirm all prompts without asking
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Delete original trial directories after copying
    #[arg(short = 'd', long)]
    delete: bool,

    /// Pose file extension
    #[arg(short = 'x', long, value_name = "EXTENSION")]
    extension: Option<String>,

    /// Only copy filtered pose files
    #[arg(short = 'f', long)]
    filt: bool,

    /// Keep "_filt" in new filenames
    #[arg(short = 'k', long)]
    keep_filt: bool,

    /// Write a run log file
    #[arg(short = 'L', long)]
    log: bool,

    /// Directory name suffix marking the source tree
    #[arg(long, value_name = "MARKER")]
    marker: Option<String>,

    /// Only copy force-merged pose files
    #[arg(short = 'm', long)]
    merged: bool,

    /// Put files in a folder per subject
    #[arg(short = 'n', long)]
    nested: bool,

    /// Output folder name used when no marker directory is found
    #[arg(short = 'o', long, value_name = "NAME")]
    output_dir: Option<String>,

    /// Only copy the primary subject (person 0)
    #[arg(short = 'z', long)]
    primary: bool,

    /// Only print changes without copying files
    #[arg(short, long)]
    print: bool,

    /// Replace the source directory with the organized output
    #[arg(short = 'R', long)]
    replace: bool,

    /// Suffix replacing the marker in the output directory name
    #[arg(long, value_name = "SUFFIX")]
    replacement: Option<String>,

    /// Only copy pose files from Sony cameras
    #[arg(short = 's', long)]
    sony: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        return pose_organize::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"));
    }

    let provider: Box<dyn SourceRootProvider> = if args.ask {
        Box::new(StdinPrompt)
    } else {
        Box::new(PathArgument(args.path.clone()))
    };
    let confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    let config = config::from_args(args)?;
    let log = config.log;
    let mut organize = PoseOrganize::from_provider(provider.as_ref(), confirm.as_ref(), config)?;
    if log {
        organize = organize.with_logger(FileLogger::new()?);
    }
    organize.run()?;
    Ok(())
}
