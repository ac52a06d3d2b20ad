//! Record loading and writing
//!
//! Every table lives in its own directory as one `<ID>.oex.yaml` file per
//! row. A table is always read in a single directory pass so aggregation
//! needs one read per level rather than one per parent.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::project::RECORD_SUFFIX;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(oex::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }
}

/// Errors reading or writing a record file
#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(Box<YamlSyntaxError>),

    #[error("failed to serialize record: {0}")]
    Serialize(String),
}

/// Convert 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Suggest a fix for common YAML mistakes
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("missing field") {
        return Some("Add the missing field or recreate the record with `oex ... new`.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("unknown variant") {
        return Some("Check the allowed values with `oex <command> --help`.".to_string());
    }

    None
}

/// All record files in a directory, sorted by file name (and so by id)
pub fn record_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().to_string_lossy().ends_with(RECORD_SUFFIX))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Parse a single record file
pub fn parse_record<T: DeserializeOwned>(path: &Path) -> Result<T, RecordError> {
    let content = fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yml::from_str::<T>(&content).map_err(|e| {
        RecordError::Syntax(Box::new(YamlSyntaxError::from_serde_error(
            &e,
            &content,
            &path.display().to_string(),
        )))
    })
}

/// Load every record of type T from a directory
///
/// Files that fail to parse are skipped with a warning.
pub fn load_all<T: DeserializeOwned>(dir: &Path) -> Vec<T> {
    let files = record_files(dir);
    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        match parse_record::<T>(path) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    debug!("loaded {} record(s) from {}", records.len(), dir.display());
    records
}

/// Serialize a record to YAML and write it to `path`
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), RecordError> {
    let yaml = serde_yml::to_string(record).map_err(|e| RecordError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RecordError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, yaml).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a record file
pub fn remove_record(path: &Path) -> Result<(), RecordError> {
    fs::remove_file(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })
}
