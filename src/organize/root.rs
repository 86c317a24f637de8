use std::path::{Component, Path, PathBuf};

use crate::os_str_to_string;

/// Compute the output root for the given source root.
///
/// Path components are scanned from the end for the first one containing `marker_suffix`.
/// On a match, the output root is a sibling of that component with the marker replaced,
/// for example `/data/Study1_c3d/SubjA` gives `/data/Study1_v3d`.
/// Without a match, the output root is `source_root/default_subfolder`.
///
/// A match on the very first component has no parent directory to hold a sibling,
/// so it is treated like no match and uses the fallback subfolder.
///
/// ```rust
/// use std::path::Path;
/// use pose_organize::organize::derive_output_root;
///
/// let root = derive_output_root(Path::new("/data/Study1_c3d"), "_c3d", "_v3d", "data_v3d");
/// assert_eq!(root, Path::new("/data/Study1_v3d"));
///
/// let root = derive_output_root(Path::new("/data/Study1"), "_c3d", "_v3d", "data_v3d");
/// assert_eq!(root, Path::new("/data/Study1/data_v3d"));
/// ```
#[must_use]
pub fn derive_output_root(
    source_root: &Path,
    marker_suffix: &str,
    replacement_suffix: &str,
    default_subfolder: &str,
) -> PathBuf {
    let components: Vec<Component> = source_root.components().collect();

    let matched = if marker_suffix.is_empty() {
        None
    } else {
        components.iter().enumerate().rev().find_map(|(index, component)| match component {
            Component::Normal(name) => {
                let name = os_str_to_string(name);
                name.contains(marker_suffix).then_some((index, name))
            }
            _ => None,
        })
    };

    match matched {
        Some((index, name)) if index > 0 => {
            let parent: PathBuf = components[..index].iter().collect();
            parent.join(name.replace(marker_suffix, replacement_suffix))
        }
        _ => source_root.join(default_subfolder),
    }
}
