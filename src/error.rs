use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Why a located implementation block was left untouched.
///
/// None of these abort the file: the block is reported and processing continues
/// with the next match.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no `{method}` method with the expected signature")]
    MissingNormalizeMethod { method: String },

    #[error("no `let {binding} = {function}(&{raw_param});` statement in `{method}`")]
    MissingTagExtraction {
        method: String,
        binding: String,
        function: String,
        raw_param: String,
    },

    #[error("no binding derived from `{raw_param}` before the tag extraction")]
    MissingResourceId { raw_param: String },

    #[error("ambiguous resource identifier: `{chosen}` chosen among {candidates:?}")]
    AmbiguousResourceId {
        chosen: String,
        candidates: Vec<String>,
    },

    #[error("`{method}` does not return a string literal")]
    MissingTypeTag { method: String },

    #[error("block is not closed before end of file")]
    UnbalancedBlock,

    #[error("implementation header has no body")]
    MissingBody,
}

/// Errors that abort processing of one file.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rust grammar could not be loaded: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("source could not be parsed")]
    Parse,

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl MigrateError {
    /// Short machine-readable label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            MigrateError::MissingFile(_) => "missing_file",
            MigrateError::Read { .. } => "read_failed",
            MigrateError::Write { .. } => "write_failed",
            MigrateError::Grammar(_) | MigrateError::Parse => "parse_failed",
            MigrateError::Edit(_) => "edit_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit {start}..{end} overlaps a previous edit")]
    Overlap { start: usize, end: usize },

    #[error("edit {start}..{end} is outside the buffer of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("edit {start}..{end} does not fall on a char boundary")]
    NotCharBoundary { start: usize, end: usize },
}
