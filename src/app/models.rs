//! Core data structures for the normalization and chart pipeline
//!
//! Raw records come straight from the JSON exports and are normalized into
//! polars frames. The [`chart`] module carries the payloads consumed by the
//! dashboard.

pub mod chart;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub use chart::{
    AxisLabel, Chart, ChartItem, ChartPayload, ExtremeItem, ItemsPayload, MatrixPayload,
    MetricStats, NamedSeries, QualitySummary, SeriesPayload, StationRecords, TagCount,
};

/// One exported record: field name to scalar, in source order
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Resolved reading of an ambiguous period field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Bare month number, 1..=12
    Month(u32),
    /// Calendar date
    Date(NaiveDate),
    Unknown,
}

impl Period {
    /// Label stored in the `period_type` column
    pub fn kind(&self) -> &'static str {
        match self {
            Period::Month(_) => "month",
            Period::Date(_) => "date",
            Period::Unknown => "unknown",
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Period::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Month of the period; dates report their calendar month
    pub fn month(&self) -> Option<u32> {
        match self {
            Period::Month(month) => Some(*month),
            Period::Date(date) => Some(date.month()),
            Period::Unknown => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.date().map(|date| date.year())
    }
}

/// Row-count metadata for one written dataset or chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub json_path: String,
}

impl DatasetReport {
    pub fn new(dataset: impl Into<String>, rows_in: usize, rows_out: usize) -> Self {
        Self {
            dataset: dataset.into(),
            rows_in,
            rows_out,
            json_path: String::new(),
        }
    }
}

/// Report file written after each pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub project: String,
    pub generated_at: String,
    pub datasets: Vec<DatasetReport>,
}
