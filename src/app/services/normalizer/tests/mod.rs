//! Shared fixtures for the dataset normalizer tests

use crate::app::models::RawRecord;
use crate::app::services::frame_conversion::{
    date_values, datetime_values, f64_values, text_values,
};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde_json::Value;

mod grid_history_tests;
mod normalize_tests;
mod yearly_weather_tests;

/// Turn a `json!` array into raw records, skipping non-objects
pub fn records(document: Value) -> Vec<RawRecord> {
    match document {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn texts(frame: &DataFrame, column: &str) -> Vec<Option<String>> {
    text_values(frame, column).unwrap()
}

pub fn nums(frame: &DataFrame, column: &str) -> Vec<Option<f64>> {
    f64_values(frame, column).unwrap()
}

/// Values of an integer column; fails on any other dtype
pub fn ints(frame: &DataFrame, column: &str) -> Vec<Option<i64>> {
    frame
        .column(column)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn flags(frame: &DataFrame, column: &str) -> Vec<Option<bool>> {
    frame
        .column(column)
        .unwrap()
        .as_materialized_series()
        .bool()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn dates(frame: &DataFrame, column: &str) -> Vec<Option<NaiveDate>> {
    date_values(frame, column).unwrap()
}

pub fn datetimes(frame: &DataFrame, column: &str) -> Vec<Option<NaiveDateTime>> {
    datetime_values(frame, column).unwrap()
}

pub fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok()
}
