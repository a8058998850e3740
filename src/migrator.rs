//! # Source Migration
//!
//! Runs locate, extract, synthesize and compose over one source buffer and
//! applies every resulting edit in a single pass. Pure: no file access here.

use crate::composer;
use crate::config::MigrationConfig;
use crate::edit::{Edit, apply_edits};
use crate::error::{MigrateError, SkipReason};
use crate::extractor;
use crate::imports;
use crate::locator::{self, BlockSpan, ImplementationMatch};
use crate::synthesizer::{self, SynthesisError};
use crate::syntax;
use serde::Serialize;

/// What happened to the blocks of one buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Sync blocks that still needed migrating.
    pub attempted: usize,
    pub migrated: usize,
    /// Sync blocks that already have an async sibling or carry the fallback marker.
    pub already_migrated: usize,
    pub skipped: Vec<SkippedBlock>,
    pub migrated_types: Vec<String>,
    pub import_added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    pub type_name: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct SourceMigration {
    pub output: String,
    pub report: MigrationReport,
}

impl SourceMigration {
    pub fn changed(&self, original: &str) -> bool {
        self.output != original
    }
}

pub fn migrate_source(source: &str, config: &MigrationConfig) -> Result<SourceMigration, MigrateError> {
    let tree = syntax::parse_rust(source)?;
    let located = locator::locate(&tree, source, config);

    let mut report = MigrationReport::default();
    let mut block_edits: Vec<Edit> = Vec::new();
    let mut needs_import = false;

    for m in &located.matches {
        if block_edits.iter().any(|edit| edit.span.contains(&m.impl_keyword)) {
            tracing::debug!(type_name = %m.type_name, "nested inside a migrated block, carried along");
            continue;
        }
        if located.already_async.contains(&m.type_name) {
            tracing::debug!(type_name = %m.type_name, "async implementation already present");
            report.already_migrated += 1;
            continue;
        }

        let span = match m.block_span() {
            Ok(span) => span,
            Err(reason) => {
                report.attempted += 1;
                skip(&mut report, m, reason);
                continue;
            }
        };
        if composer::has_fallback_marker(&source[span.range()]) {
            tracing::debug!(type_name = %m.type_name, "sync block already carries the fallback marker");
            report.already_migrated += 1;
            continue;
        }

        report.attempted += 1;
        match migrate_block(source, m, &span, config) {
            Ok(edit) => {
                tracing::debug!(type_name = %m.type_name, "migrated");
                block_edits.push(edit);
                needs_import |= !m.nested;
                report.migrated += 1;
                report.migrated_types.push(m.type_name.clone());
            }
            Err(SynthesisError::Skip(reason)) => skip(&mut report, m, reason),
            Err(SynthesisError::Edit(err)) => return Err(err.into()),
        }
    }

    let mut edits = Vec::with_capacity(block_edits.len() + 1);
    if needs_import && config.add_async_trait_import {
        // Ahead of the block edits so an insertion at a block's first byte lands before it.
        if let Some(import) = imports::async_trait_import(&tree, source) {
            edits.push(import);
            report.import_added = true;
        }
    }
    edits.extend(block_edits);

    let output = apply_edits(source, &edits)?;
    Ok(SourceMigration { output, report })
}

fn migrate_block(
    source: &str,
    m: &ImplementationMatch,
    span: &BlockSpan,
    config: &MigrationConfig,
) -> Result<Edit, SynthesisError> {
    let fragment = extractor::extract(m, span, source, config).map_err(SynthesisError::Skip)?;
    let async_block = synthesizer::async_block(source, m, span, &fragment, config)?;
    Ok(composer::compose(source, span, &fragment, &async_block)?)
}

fn skip(report: &mut MigrationReport, m: &ImplementationMatch, reason: SkipReason) {
    tracing::warn!(type_name = %m.type_name, reason = %reason, "skipping implementation block");
    report.skipped.push(SkippedBlock {
        type_name: m.type_name.clone(),
        reason,
    });
}
