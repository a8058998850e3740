//! # Source Files
//!
//! A file is read once into memory and written back at most once. Writes go
//! through a temporary file in the same directory that replaces the original on
//! success, so a failed write leaves the original untouched.

use crate::error::MigrateError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self, MigrateError> {
        if !path.exists() {
            return Err(MigrateError::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| MigrateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Replaces the file's content with `contents`.
    pub fn write(&self, contents: &str) -> Result<(), MigrateError> {
        let write_error = |source: std::io::Error| MigrateError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
        temp.write_all(contents.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;

        // Keep the original's mode bits; the temp file is created 0600.
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_error)?;
        }

        temp.persist(&self.path)
            .map_err(|err| write_error(err.error))?;
        Ok(())
    }
}
