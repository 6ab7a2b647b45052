//! Shared fixtures for the chart builder tests

use crate::app::models::Chart;
use crate::app::services::frame_conversion::records_to_frame;
use polars::prelude::DataFrame;
use serde_json::Value;

mod air_quality_tests;

/// Build a table from a `json!` array, the way cleaned files are read back
pub fn table(document: Value) -> DataFrame {
    let records: Vec<_> = document
        .as_array()
        .map(|items| items.iter().filter_map(|item| item.as_object().cloned()).collect())
        .unwrap_or_default();
    records_to_frame(&records).unwrap()
}

pub fn find<'a>(charts: &'a [Chart], name: &str) -> &'a Chart {
    charts
        .iter()
        .find(|chart| chart.name == name)
        .unwrap_or_else(|| panic!("chart {name} not built"))
}

pub fn payload_json(chart: &Chart) -> Value {
    serde_json::to_value(&chart.payload).unwrap()
}
