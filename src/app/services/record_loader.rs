//! Record source for raw JSON exports
//!
//! Exports are JSON arrays of flat objects. Some of them open with a synthetic
//! legend row whose every value is a `字段中文名：...` description; that row is
//! stripped here so the normalizers only ever see data records.

use crate::app::models::RawRecord;
use crate::constants::LEGEND_PREFIX;
use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether a record is the field-name legend row
///
/// Every non-null value must be text starting with the legend prefix; a
/// record with no non-null values is not a legend.
pub fn is_legend_row(record: &RawRecord) -> bool {
    let mut values = record.values().filter(|v| !v.is_null()).peekable();
    if values.peek().is_none() {
        return false;
    }
    values.all(|value| match value {
        Value::String(text) => text.starts_with(LEGEND_PREFIX),
        other => other.to_string().starts_with(LEGEND_PREFIX),
    })
}

/// Turn a parsed JSON document into data records
///
/// Non-object elements are dropped, and at most the first surviving record is
/// removed when it is a legend row. Anything other than an array yields no
/// records.
pub fn strip_header(document: Value) -> Vec<RawRecord> {
    let Value::Array(elements) = document else {
        return Vec::new();
    };

    let mut records: Vec<RawRecord> = elements
        .into_iter()
        .filter_map(|element| match element {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.first().is_some_and(is_legend_row) {
        records.remove(0);
    }
    records
}

/// Load and legend-strip the records of one export file
///
/// A missing or unreadable file is fatal: it means the pipeline was pointed
/// at the wrong place, not that the data is dirty.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path)?;
    let document: Value =
        serde_json::from_str(&text).map_err(|e| PipelineError::invalid_source(path, e))?;
    let records = strip_header(document);

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// List files in `dir` matching a file-name pattern, sorted by path
pub fn list_files(dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/{}", escaped_dir, file_pattern);

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    debug!("Pattern {} matched {} files", pattern, files.len());
    Ok(files)
}
