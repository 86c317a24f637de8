use pose_organize::organize::{OrganizeConfig, PoseOrganizeConfig};

use crate::Args;

/// Create config from given command line args and user config file.
///
/// # Errors
/// Returns an error if the config file cannot be read or parsed.
pub fn from_args(args: Args) -> anyhow::Result<PoseOrganizeConfig> {
    let user_config = OrganizeConfig::get_user_config()?;
    Ok(merge(args, user_config))
}

/// Combine CLI arguments with the user config.
/// Flags are enabled by either source, string options prefer the CLI value.
fn merge(args: Args, user_config: OrganizeConfig) -> PoseOrganizeConfig {
    let config = PoseOrganizeConfig::from(user_config);
    PoseOrganizeConfig {
        auto: args.yes || config.auto,
        debug: args.debug || config.debug,
        default_subfolder_name: args.output_dir.unwrap_or(config.default_subfolder_name),
        delete_source_after_copy: args.delete || config.delete_source_after_copy,
        dryrun: args.print || config.dryrun,
        extension: args
            .extension
            .map(|extension| extension.trim_start_matches('.').to_string())
            .unwrap_or(config.extension),
        filt_only: args.filt || config.filt_only,
        keep_filt_in_filename: args.keep_filt || config.keep_filt_in_filename,
        log: args.log || config.log,
        marker_suffix: args.marker.unwrap_or(config.marker_suffix),
        merged_only: args.merged || config.merged_only,
        nested_subject_folders: args.nested || config.nested_subject_folders,
        primary_subject_only: args.primary || config.primary_subject_only,
        replace_destination_with_staging: args.replace || config.replace_destination_with_staging,
        replacement_suffix: args.replacement.unwrap_or(config.replacement_suffix),
        sony_only: args.sony || config.sony_only,
        verbose: args.verbose || config.verbose,
    }
}
