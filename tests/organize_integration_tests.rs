//! End-to-end tests running the organize pipeline on temporary study trees.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use walkdir::WalkDir;

use pose_organize::organize::{
    AutoConfirm, PathArgument, PoseOrganize, PoseOrganizeConfig, RunStats, SourceRootProvider, enumerate_files,
};

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file should have a parent")).expect("Failed to create directories");
    fs::write(path, content).expect("Failed to write file");
}

/// Relative paths of all files under the given directory, sorted.
fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .expect("entry should be under root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

fn study_tree() -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("study_c3d");
    for (relative, content) in [
        ("SubjA/Walk/Trial1/pose_0.c3d", "A walk 1 raw"),
        ("SubjA/Walk/Trial1/pose_filt_0.c3d", "A walk 1 filt"),
        ("SubjA/Walk/Trial1/pose_filt_1.c3d", "A walk 1 filt person 1"),
        ("SubjA/Walk/Trial2-Sony/pose_filt_0.c3d", "A walk 2 sony"),
        ("SubjA/Jump/Trial1_merged/pose_filt_0.c3d", "A jump merged"),
        ("SubjB/Run/Trial1/pose_filt_0.c3d", "B run 1 filt"),
        ("SubjB/Run/Trial1/capture.mp4", "video"),
        ("README.txt", "notes"),
    ] {
        write_file(&root, relative, content);
    }
    (dir, root)
}

fn run(root: &Path, config: PoseOrganizeConfig) -> RunStats {
    PoseOrganize::new(root.to_path_buf(), config)
        .expect("organizer should be created")
        .run()
        .expect("run should succeed")
}

#[test]
fn filtered_primary_nested_example() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("study_c3d");
    write_file(&root, "SubjA/Walk/Trial1/pose_filt_0.c3d", "filtered");
    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "raw");

    let config = PoseOrganizeConfig {
        filt_only: true,
        primary_subject_only: true,
        nested_subject_folders: true,
        keep_filt_in_filename: true,
        ..PoseOrganizeConfig::default()
    };
    let stats = run(&root, config);

    let output = dir.path().join("study_v3d");
    assert_eq!(list_files(&output), vec!["SubjA/SubjA_Walk_Trial1_filt.c3d"]);
    assert_eq!(
        fs::read_to_string(output.join("SubjA/SubjA_Walk_Trial1_filt.c3d")).expect("should read output"),
        "filtered"
    );
    assert_eq!(stats.created, 1);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn second_run_is_a_no_op() {
    let (dir, root) = study_tree();
    let config = PoseOrganizeConfig {
        nested_subject_folders: true,
        keep_filt_in_filename: true,
        ..PoseOrganizeConfig::default()
    };

    let first = run(&root, config.clone());
    let output_after_first = list_files(&dir.path().join("study_v3d"));
    let second = run(&root, config);

    assert!(first.created > 0);
    assert_eq!(second.created, 0);
    assert_eq!(second.failed, 0);
    assert_eq!(second.unmapped, 0);
    assert_eq!(second.skipped, first.created + first.skipped);
    assert_eq!(list_files(&dir.path().join("study_v3d")), output_after_first);
}

#[test]
fn extension_filter_alone_selects_every_pose_file() {
    let (_dir, root) = study_tree();
    let expected: Vec<PathBuf> = enumerate_files(&root)
        .expect("should list files")
        .into_iter()
        .filter(|path| path.to_string_lossy().contains(".c3d"))
        .collect();

    let mut organize = PoseOrganize::new(root, PoseOrganizeConfig::default()).expect("organizer should be created");
    let mut stats = RunStats::default();
    let sources: Vec<PathBuf> = organize
        .plan(&mut stats)
        .expect("plan should succeed")
        .into_iter()
        .map(|mapping| mapping.source)
        .collect();

    assert_eq!(expected.len(), 6);
    assert_eq!(sources, expected);
    assert_eq!(stats.candidates, 6);
}

#[test]
fn sony_and_filt_filters_combine() {
    let (dir, root) = study_tree();
    let config = PoseOrganizeConfig {
        sony_only: true,
        filt_only: true,
        keep_filt_in_filename: true,
        ..PoseOrganizeConfig::default()
    };
    run(&root, config);

    assert_eq!(
        list_files(&dir.path().join("study_v3d")),
        vec!["SubjA_Walk_Trial2-Sony_filt.c3d"]
    );
}

#[test]
fn merged_only_selects_merged_trials() {
    let (dir, root) = study_tree();
    let config = PoseOrganizeConfig {
        merged_only: true,
        ..PoseOrganizeConfig::default()
    };
    run(&root, config);

    assert_eq!(
        list_files(&dir.path().join("study_v3d")),
        vec!["SubjA_Jump_Trial1_merged.c3d"]
    );
}

#[test]
fn existing_destination_is_left_unchanged() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("study_c3d");
    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "first");
    let config = PoseOrganizeConfig::default();
    run(&root, config.clone());

    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "changed content");
    let stats = run(&root, config);

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.created, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("study_v3d/SubjA_Walk_Trial1.c3d")).expect("should read output"),
        "first"
    );
}

#[test]
fn destination_root_derivation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let marked = dir.path().join("Study1_c3d");
    let unmarked = dir.path().join("Study1");
    fs::create_dir_all(&marked).expect("Failed to create directory");
    fs::create_dir_all(&unmarked).expect("Failed to create directory");

    let organize = PoseOrganize::new(marked, PoseOrganizeConfig::default()).expect("organizer should be created");
    assert_eq!(organize.destination_root(), dir.path().join("Study1_v3d"));

    let organize = PoseOrganize::new(unmarked.clone(), PoseOrganizeConfig::default()).expect("organizer should be created");
    assert_eq!(organize.destination_root(), unmarked.join("data_v3d"));
}

#[test]
fn delete_cascades_but_keeps_subject_with_secondary_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("study_c3d");
    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "a");
    write_file(&root, "SubjA/Walk/Trial1/pose_1.c3d", "a person 1");
    write_file(&root, "SubjA/pose_1_summary.txt", "secondary subject");
    write_file(&root, "SubjB/Run/Trial1/pose_0.c3d", "b");

    let config = PoseOrganizeConfig {
        primary_subject_only: true,
        delete_source_after_copy: true,
        nested_subject_folders: true,
        ..PoseOrganizeConfig::default()
    };
    let stats = run(&root, config);

    assert_eq!(stats.created, 2);
    assert!(!root.join("SubjA/Walk").exists());
    assert!(root.join("SubjA/pose_1_summary.txt").exists());
    assert!(!root.join("SubjB").exists());
    assert!(root.exists());
    assert_eq!(
        list_files(&dir.path().join("study_v3d")),
        vec!["SubjA/SubjA_Walk_Trial1.c3d", "SubjB/SubjB_Run_Trial1.c3d"]
    );
}

#[test]
fn planning_is_deterministic() {
    let (_dir, root) = study_tree();
    let config = PoseOrganizeConfig {
        nested_subject_folders: true,
        keep_filt_in_filename: true,
        ..PoseOrganizeConfig::default()
    };

    let plan = |config: PoseOrganizeConfig| {
        let mut organize = PoseOrganize::new(root.clone(), config).expect("organizer should be created");
        organize.plan(&mut RunStats::default()).expect("plan should succeed")
    };

    let first = plan(config.clone());
    let second = plan(config);
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[test]
fn delete_does_not_remove_uncopied_nested_candidates() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("study_c3d");
    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "trial");
    write_file(&root, "SubjA/Walk/Trial1/sub/pose_0.c3d", "nested");

    let config = PoseOrganizeConfig {
        delete_source_after_copy: true,
        ..PoseOrganizeConfig::default()
    };
    let stats = run(&root, config);

    assert_eq!(stats.created, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(
        list_files(&dir.path().join("study_v3d")),
        vec!["SubjA_Walk_Trial1.c3d", "Walk_Trial1_sub.c3d"]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("study_v3d/Walk_Trial1_sub.c3d")).expect("should read output"),
        "nested"
    );
    assert!(list_files(&root).is_empty());
}

#[cfg(unix)]
#[test]
fn missing_non_utf8_root_is_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join(OsStr::from_bytes(b"study\xff_c3d"));
    let config = PoseOrganizeConfig {
        delete_source_after_copy: true,
        ..PoseOrganizeConfig::default()
    };

    assert!(PathArgument(Some(missing.clone())).source_root().is_err());
    assert!(PoseOrganize::from_provider(&PathArgument(Some(missing)), &AutoConfirm(true), config).is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_root_is_organized_in_place() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path().join(OsStr::from_bytes(b"study\xff_c3d"));
    write_file(&root, "SubjA/Walk/Trial1/pose_0.c3d", "pose");

    let mut organize = PoseOrganize::from_provider(
        &PathArgument(Some(root.clone())),
        &AutoConfirm(true),
        PoseOrganizeConfig::default(),
    )
    .expect("organizer should be created");
    assert_eq!(
        organize.source_root(),
        dunce::canonicalize(&root).expect("should canonicalize root")
    );
    let destination_root = organize.destination_root().to_path_buf();
    let stats = organize.run().expect("run should succeed");

    assert_eq!(stats.created, 1);
    assert!(destination_root.join("SubjA_Walk_Trial1.c3d").exists());
    assert!(root.join("SubjA/Walk/Trial1/pose_0.c3d").exists());
}
