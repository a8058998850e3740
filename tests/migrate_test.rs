use normalizer_migrate::MigrationConfig;
use normalizer_migrate::driver::{self, RunOptions};
use normalizer_migrate::report::FileStatus;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::Builder;

const FOO_INPUT: &str = include_str!("fixtures/foo_normalizer.rs");
const FOO_MIGRATED: &str = include_str!("fixtures/foo_normalizer.migrated.rs");

fn setup_workspace() -> (tempfile::TempDir, PathBuf) {
    let tmp_dir = Builder::new().prefix("test-migrate-").tempdir().unwrap();
    let root = tmp_dir.path().to_path_buf();
    fs::create_dir(root.join("normalizers")).unwrap();
    fs::write(root.join("normalizers/foo.rs"), FOO_INPUT).unwrap();
    fs::write(root.join("normalizers/mod.rs"), "pub mod foo;\n").unwrap();
    (tmp_dir, root)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_run_migrates_and_reports_per_file() {
    let (_tmp_dir, root) = setup_workspace();
    let mut seen = Vec::new();

    let summary = driver::run(
        &[root.join("normalizers")],
        &MigrationConfig::default(),
        RunOptions::default(),
        |path, result| seen.push((path.to_path_buf(), result.is_ok())),
    );

    assert_eq!(
        seen,
        vec![
            (root.join("normalizers/foo.rs"), true),
            (root.join("normalizers/mod.rs"), true),
        ]
    );
    assert_eq!(summary.files_changed(), 1);
    assert!(!summary.has_failures());
    assert_eq!(summary.files[0].status, FileStatus::Migrated);
    assert_eq!(summary.files[1].status, FileStatus::NoMatches);
    assert_eq!(read(&root.join("normalizers/foo.rs")), FOO_MIGRATED);
    assert_eq!(read(&root.join("normalizers/mod.rs")), "pub mod foo;\n");
}

#[test]
fn test_missing_file_does_not_affect_the_others() {
    let (_tmp_dir, root) = setup_workspace();
    let inputs = vec![
        root.join("normalizers/gone.rs"),
        root.join("normalizers/foo.rs"),
    ];

    let summary = driver::run(
        &inputs,
        &MigrationConfig::default(),
        RunOptions::default(),
        |_, _| {},
    );

    assert!(summary.has_failures());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, "missing_file");
    assert_eq!(summary.failures[0].path, root.join("normalizers/gone.rs"));
    assert_eq!(summary.files_changed(), 1);
    assert_eq!(read(&root.join("normalizers/foo.rs")), FOO_MIGRATED);
}

#[test]
fn test_second_run_is_a_no_op() {
    let (_tmp_dir, root) = setup_workspace();
    let inputs = vec![root.join("normalizers/foo.rs")];
    let config = MigrationConfig::default();

    driver::run(&inputs, &config, RunOptions::default(), |_, _| {});
    let summary = driver::run(&inputs, &config, RunOptions::default(), |_, _| {});

    assert_eq!(summary.files_changed(), 0);
    assert_eq!(summary.files[0].status, FileStatus::NoMatches);
    assert_eq!(summary.files[0].migration.already_migrated, 1);
    assert_eq!(read(&root.join("normalizers/foo.rs")), FOO_MIGRATED);
}

#[test]
fn test_binary_exit_codes() {
    let (_tmp_dir, root) = setup_workspace();
    let binary = env!("CARGO_BIN_EXE_migrate");

    let no_args = Command::new(binary).output().unwrap();
    assert_eq!(no_args.status.code(), Some(2));

    let dry_run = Command::new(binary)
        .arg("--dry-run")
        .arg(root.join("normalizers/foo.rs"))
        .output()
        .unwrap();
    assert_eq!(dry_run.status.code(), Some(0));
    assert_eq!(read(&root.join("normalizers/foo.rs")), FOO_INPUT);

    let with_missing = Command::new(binary)
        .arg("--json")
        .arg(root.join("normalizers/foo.rs"))
        .arg(root.join("normalizers/gone.rs"))
        .output()
        .unwrap();
    assert_eq!(with_missing.status.code(), Some(1));
    let summary: serde_json::Value = serde_json::from_slice(&with_missing.stdout).unwrap();
    assert_eq!(summary["failures"][0]["kind"], "missing_file");
    assert_eq!(summary["files"][0]["status"], "migrated");
    assert_eq!(read(&root.join("normalizers/foo.rs")), FOO_MIGRATED);
}
