//! JSON persistence for cleaned tables, chart payloads and run reports
//!
//! Tables are written as compact arrays of records in column order; chart
//! payloads and reports are indented. Non-ASCII text is written as-is and
//! output directories are created on demand.

use crate::app::models::{Chart, DatasetReport, RunReport};
use crate::app::services::frame_conversion::{frame_to_records, records_to_frame};
use crate::constants::PROJECT_NAME;
use crate::error::{PipelineError, Result};
use chrono::Local;
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of a dataset's JSON file inside `dir`
pub fn dataset_path(dir: &Path, dataset: &str) -> PathBuf {
    dir.join(format!("{}.json", dataset))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a frame as a JSON array of records, returning the file path
pub fn write_table(frame: &DataFrame, dir: &Path, dataset: &str) -> Result<PathBuf> {
    let path = dataset_path(dir, dataset);
    write_json(&path, &frame_to_records(frame)?, false)?;

    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(path)
}

/// Read a cleaned table back
///
/// A missing file reads as an empty table so the chart stage can run over
/// a partial set of datasets.
pub fn read_table(dir: &Path, dataset: &str) -> Result<DataFrame> {
    let path = dataset_path(dir, dataset);
    if !path.exists() {
        debug!("No cleaned file at {}, treating as empty", path.display());
        return Ok(DataFrame::empty());
    }

    let text = fs::read_to_string(&path)?;
    let document: Value =
        serde_json::from_str(&text).map_err(|e| PipelineError::invalid_source(&path, e))?;
    let records: Vec<_> = match document {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    records_to_frame(&records)
}

/// Write one chart payload as indented JSON
pub fn write_chart(chart: &Chart, dir: &Path) -> Result<PathBuf> {
    let path = dataset_path(dir, &chart.name);
    write_json(&path, &chart.payload, true)?;

    debug!("Wrote chart {} to {}", chart.name, path.display());
    Ok(path)
}

/// Assemble a run report stamped with the local time
pub fn build_report(datasets: Vec<DatasetReport>) -> RunReport {
    RunReport {
        project: PROJECT_NAME.to_string(),
        generated_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        datasets,
    }
}

pub fn write_report(report: &RunReport, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    write_json(&path, report, true)?;
    Ok(path)
}
