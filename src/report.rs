//! # Reporting
//!
//! Per-file and per-run results, serializable for `--json` and rendered as
//! styled lines for the terminal.

use crate::migrator::MigrationReport;
use console::style;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// No block of the family needed migrating.
    NoMatches,
    /// Some blocks were skipped. The file is still written with the others.
    Partial,
    Migrated,
}

impl FileStatus {
    pub fn of(report: &MigrationReport) -> Self {
        if report.attempted == 0 {
            FileStatus::NoMatches
        } else if report.skipped.is_empty() {
            FileStatus::Migrated
        } else {
            FileStatus::Partial
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// The migrated text differs from what was read.
    pub changed: bool,
    /// The change was written to disk (false on dry runs).
    pub written: bool,
    #[serde(flatten)]
    pub migration: MigrationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    pub fn files_changed(&self) -> usize {
        self.files.iter().filter(|file| file.changed).count()
    }

    pub fn blocks_migrated(&self) -> usize {
        self.files.iter().map(|file| file.migration.migrated).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Progress line(s) for one processed file.
pub fn file_lines(report: &FileReport) -> Vec<String> {
    let path = report.path.display();
    let migration = &report.migration;
    let mut lines = Vec::new();

    match report.status {
        FileStatus::NoMatches if migration.already_migrated > 0 => lines.push(
            style(format!(
                "{path}: already migrated ({} normalizer(s))",
                migration.already_migrated
            ))
            .dim()
            .to_string(),
        ),
        FileStatus::NoMatches => {
            lines.push(style(format!("{path}: no normalizers found")).dim().to_string())
        }
        FileStatus::Migrated => lines.push(
            style(format!(
                "✓ {path}: migrated {} normalizer(s){}",
                migration.migrated,
                dry_run_suffix(report)
            ))
            .green()
            .to_string(),
        ),
        FileStatus::Partial => {
            lines.push(
                style(format!(
                    "{path}: migrated {} of {} normalizer(s){}",
                    migration.migrated,
                    migration.attempted,
                    dry_run_suffix(report)
                ))
                .yellow()
                .to_string(),
            );
            for skipped in &migration.skipped {
                lines.push(
                    style(format!("  skipped {}: {}", skipped.type_name, skipped.reason))
                        .yellow()
                        .to_string(),
                );
            }
        }
    }
    lines
}

fn dry_run_suffix(report: &FileReport) -> &'static str {
    if report.changed && !report.written {
        " (dry run, not written)"
    } else {
        ""
    }
}

/// Closing line of a run.
pub fn summary_line(summary: &RunSummary) -> String {
    let line = format!(
        "Changed {} file(s), migrated {} normalizer(s)",
        summary.files_changed(),
        summary.blocks_migrated()
    );
    if summary.has_failures() {
        style(format!("{line}, {} file(s) failed", summary.failures.len()))
            .red()
            .bold()
            .to_string()
    } else {
        style(line).bold().to_string()
    }
}
