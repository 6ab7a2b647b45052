//! Atmospheric grid monitoring history normalization
//!
//! The history arrives split over several numbered exports. Each file is
//! normalized on its own, tagged with its file name, then the files are
//! stacked in sorted path order.

use super::{normalize, DatasetProfile, NumericFields};
use crate::app::models::RawRecord;
use crate::app::services::frame_conversion::datetime_series;
use crate::constants::datasets;
use crate::constants::grid::*;
use crate::error::Result;
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::debug;

/// Parse a `Mon Jan 06 08:00:00 CST 2025` style timestamp
pub fn parse_recv_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), RECV_TIME_FORMAT).ok()
}

/// Trim surrounding whitespace from field names
///
/// Names that collide after trimming merge into one field, keeping the first
/// non-null value of each record.
pub fn trim_field_names(records: &[RawRecord]) -> Vec<RawRecord> {
    records
        .iter()
        .map(|record| {
            let mut trimmed = RawRecord::new();
            for (key, value) in record {
                let name = key.trim();
                if let Some(existing) = trimmed.get_mut(name) {
                    if existing.is_null() {
                        *existing = value.clone();
                    }
                    continue;
                }
                trimmed.insert(name.to_string(), value.clone());
            }
            trimmed
        })
        .collect()
}

/// Normalize the records of one grid export
pub fn normalize_grid_file(records: &[RawRecord], source_file: &str) -> Result<DataFrame> {
    let tag_source = |frame: &mut DataFrame| -> Result<()> {
        *frame = std::mem::take(frame)
            .lazy()
            .with_column(lit(source_file).alias(SOURCE_FILE))
            .collect()?;
        Ok(())
    };

    let profile = DatasetProfile::new(datasets::GRID_HISTORY_WIDE)
        .with_prepare(parse_timestamps)
        .with_numeric_fields(NumericFields::AllExcept(&[RECV_TIME, TIMESTAMP]))
        .with_derive(tag_source)
        .with_required_any(&[TIMESTAMP, STATION_ID])
        .with_sort_keys(SORT_FIELDS);

    normalize(&trim_field_names(records), &profile)
}

fn parse_timestamps(frame: &mut DataFrame) -> Result<()> {
    let timestamps: Vec<Option<NaiveDateTime>> = match frame.column(RECV_TIME) {
        Ok(column) if column.dtype() == &DataType::String => column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|text| text.and_then(parse_recv_time))
            .collect(),
        _ => vec![None; frame.height()],
    };
    frame.with_column(datetime_series(TIMESTAMP, timestamps))?;
    Ok(())
}

/// Normalize and stack several grid exports
///
/// Batches are `(file name, records)` pairs and are stacked in the order
/// given; callers pass them in sorted path order. Columns missing from a
/// file read as null, and a column typed differently across files takes the
/// common supertype.
pub fn combine_grid_files(batches: &[(String, Vec<RawRecord>)]) -> Result<DataFrame> {
    let mut frames: Vec<LazyFrame> = Vec::with_capacity(batches.len());
    for (source_file, records) in batches {
        let frame = normalize_grid_file(records, source_file)?;
        if frame.height() > 0 {
            frames.push(frame.lazy());
        }
    }

    debug!(
        "Combining {} non-empty grid files out of {}",
        frames.len(),
        batches.len()
    );
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }

    let combined = concat_lf_diagonal(
        frames,
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )?
    .collect()?;
    Ok(combined)
}
