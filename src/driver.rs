//! # File Driver
//!
//! Expands the inputs, runs the migration over every file in order and writes
//! back only what changed. A failing file never stops the run.

use crate::config::MigrationConfig;
use crate::diff;
use crate::error::MigrateError;
use crate::migrator;
use crate::report::{FileFailure, FileReport, FileStatus, RunSummary};
use crate::source_file::SourceFile;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and report, but never write.
    pub dry_run: bool,
    /// Produce a unified diff for each changed file.
    pub show_diff: bool,
}

/// One entry of the expanded input list.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    /// Named on the command line but not on disk.
    Missing(PathBuf),
}

/// Turns file and directory arguments into the list of files to process.
///
/// Entries follow the order of the arguments. Directories contribute the `.rs`
/// files beneath them that ignore rules do not exclude, sorted. Duplicates are dropped.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<Input> {
    let mut seen = BTreeSet::new();
    let mut expanded = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for file in rust_files_under(input) {
                if seen.insert(file.clone()) {
                    expanded.push(Input::File(file));
                }
            }
        } else if !seen.insert(input.clone()) {
            continue;
        } else if input.exists() {
            expanded.push(Input::File(input.clone()));
        } else {
            expanded.push(Input::Missing(input.clone()));
        }
    }

    expanded
}

fn rust_files_under(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkBuilder::new(dir)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ty| ty.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    found.sort();
    found
}

/// Result of migrating one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub report: FileReport,
    pub diff: Option<String>,
}

pub fn migrate_file(
    path: &Path,
    config: &MigrationConfig,
    options: RunOptions,
) -> Result<FileOutcome, MigrateError> {
    let file = SourceFile::read(path)?;
    let migration = migrator::migrate_source(&file.text, config)?;
    let changed = migration.changed(&file.text);

    let diff = if options.show_diff && changed {
        diff::unified_diff(&path.display().to_string(), &file.text, &migration.output)
    } else {
        None
    };

    let written = changed && !options.dry_run;
    if written {
        file.write(&migration.output)?;
    }
    tracing::info!(
        path = %path.display(),
        migrated = migration.report.migrated,
        skipped = migration.report.skipped.len(),
        written,
        "processed file"
    );

    Ok(FileOutcome {
        report: FileReport {
            path: path.to_path_buf(),
            status: FileStatus::of(&migration.report),
            changed,
            written,
            migration: migration.report,
        },
        diff,
    })
}

/// Migrates every input, calling `on_file` as each one finishes.
pub fn run<F>(
    inputs: &[PathBuf],
    config: &MigrationConfig,
    options: RunOptions,
    mut on_file: F,
) -> RunSummary
where
    F: FnMut(&Path, &Result<FileOutcome, MigrateError>),
{
    let mut summary = RunSummary::default();

    for input in expand_inputs(inputs) {
        let (path, result) = match input {
            Input::File(path) => {
                let result = migrate_file(&path, config, options);
                (path, result)
            }
            Input::Missing(path) => {
                let err = MigrateError::MissingFile(path.clone());
                (path, Err(err))
            }
        };
        on_file(&path, &result);
        match result {
            Ok(outcome) => summary.files.push(outcome.report),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "file failed");
                summary.failures.push(FileFailure {
                    path,
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        }
    }

    summary
}
