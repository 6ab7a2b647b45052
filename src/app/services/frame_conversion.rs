//! Conversion between raw JSON records and polars frames
//!
//! Exports are loosely typed: one field can hold numbers in some records and
//! text in others. [`records_to_frame`] settles on one dtype per column from
//! the values it sees, and [`frame_to_records`] lowers a frame back into JSON
//! objects in column order. The typed readers give the normalizers and the
//! chart stage a uniform view of columns, whether they were built in memory
//! or read back from disk.

use crate::app::models::RawRecord;
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde_json::{Number, Value};
use std::collections::HashSet;

/// Layout used when writing datetimes
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Layout used when writing dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Datetime layouts accepted when reading persisted tables back
const DATETIME_READ_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const NULL_VALUE: &Value = &Value::Null;

/// Kind of the JSON values seen in one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonKind {
    Empty,
    Bool,
    Int,
    Float,
    Text,
    Mixed,
}

impl JsonKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Empty,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(n) if n.is_i64() => JsonKind::Int,
            Value::Number(_) => JsonKind::Float,
            Value::String(_) => JsonKind::Text,
            Value::Array(_) | Value::Object(_) => JsonKind::Mixed,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (JsonKind::Empty, kind) | (kind, JsonKind::Empty) => kind,
            (a, b) if a == b => a,
            (JsonKind::Int, JsonKind::Float) | (JsonKind::Float, JsonKind::Int) => JsonKind::Float,
            _ => JsonKind::Mixed,
        }
    }
}

/// Textual rendering of a JSON scalar
///
/// Integral floats render without a fractional part so `45000.0` reads as
/// `45000`. Nested arrays and objects render as their JSON text.
pub fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_text(number)),
        other => Some(other.to_string()),
    }
}

fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => format!("{}", float as i64),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

fn json_series(name: &str, values: &[&Value]) -> Series {
    let kind = values
        .iter()
        .fold(JsonKind::Empty, |kind, value| kind.merge(JsonKind::of(value)));
    let name = PlSmallStr::from_str(name);

    match kind {
        JsonKind::Bool => {
            let flags: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
            Series::new(name, flags)
        }
        JsonKind::Int => {
            let ints: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
            Series::new(name, ints)
        }
        JsonKind::Float => {
            let floats: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
            Series::new(name, floats)
        }
        // Mixed fields and fields that are null throughout are kept as text
        JsonKind::Empty | JsonKind::Text | JsonKind::Mixed => {
            let texts: Vec<Option<String>> = values.iter().map(|v| json_text(v)).collect();
            Series::new(name, texts)
        }
    }
}

/// Build a frame from raw records
///
/// Columns are the union of record keys in order of first appearance; a key
/// absent from a record reads as null.
pub fn records_to_frame(records: &[RawRecord]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .map(|name| {
            let values: Vec<&Value> = records
                .iter()
                .map(|record| record.get(*name).unwrap_or(NULL_VALUE))
                .collect();
            json_series(name, &values).into_column()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn float_json(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn text_json(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

/// JSON values of one column, dates as ISO text and NaN as null
fn json_values(series: &Series) -> Result<Vec<Value>> {
    let values = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| text_json(v.map(str::to_string)))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let floats = series.cast(&DataType::Float64)?;
            floats.f64()?.into_iter().map(float_json).collect()
        }
        DataType::Date => series
            .date()?
            .as_date_iter()
            .map(|d| text_json(d.map(|d| d.format(DATE_FORMAT).to_string())))
            .collect(),
        DataType::Datetime(_, _) => series
            .datetime()?
            .as_datetime_iter()
            .map(|dt| text_json(dt.map(|dt| dt.format(DATETIME_FORMAT).to_string())))
            .collect(),
        DataType::Null => vec![Value::Null; series.len()],
        dtype if dtype.is_integer() => {
            let ints = series.cast(&DataType::Int64)?;
            ints.i64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::from))
                .collect()
        }
        _ => {
            let texts = series.cast(&DataType::String)?;
            texts
                .str()?
                .into_iter()
                .map(|v| text_json(v.map(str::to_string)))
                .collect()
        }
    };
    Ok(values)
}

/// Lower a frame into JSON records, keeping column order
pub fn frame_to_records(frame: &DataFrame) -> Result<Vec<RawRecord>> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut columns: Vec<std::vec::IntoIter<Value>> = frame
        .get_columns()
        .iter()
        .map(|column| json_values(column.as_materialized_series()).map(Vec::into_iter))
        .collect::<Result<_>>()?;

    let records = (0..frame.height())
        .map(|_| {
            names
                .iter()
                .zip(columns.iter_mut())
                .map(|(name, values)| (name.clone(), values.next().unwrap_or(Value::Null)))
                .collect::<RawRecord>()
        })
        .collect();
    Ok(records)
}

pub fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Coerce a column to floats, unparseable values becoming null
///
/// Text is trimmed before parsing and booleans count as 0/1. Dates never
/// coerce.
pub fn coerce_numeric(series: &Series) -> Result<Series> {
    let name = series.name().clone();
    let coerced = match series.dtype() {
        DataType::String => {
            let parsed: Float64Chunked = series
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_number))
                .collect();
            parsed.with_name(name).into_series()
        }
        DataType::Date | DataType::Datetime(_, _) => {
            Series::full_null(name, series.len(), &DataType::Float64)
        }
        _ => series.cast(&DataType::Float64)?,
    };
    Ok(coerced)
}

/// Coerce a column to integers, rounding to the nearest whole number
pub fn coerce_integer(series: &Series) -> Result<Series> {
    let floats = coerce_numeric(series)?;
    let ints: Int64Chunked = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()).map(|v| v.round() as i64))
        .collect();
    Ok(ints.with_name(series.name().clone()).into_series())
}

pub fn date_series(name: &str, values: Vec<Option<NaiveDate>>) -> Series {
    DateChunked::from_naive_date_options(name.into(), values).into_series()
}

pub fn datetime_series(name: &str, values: Vec<Option<NaiveDateTime>>) -> Series {
    DatetimeChunked::from_naive_datetime_options(name.into(), values, TimeUnit::Microseconds)
        .into_series()
}

/// Numeric reading of a column, all null when the column is absent
pub fn f64_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let Ok(column) = frame.column(name) else {
        return Ok(vec![None; frame.height()]);
    };
    let floats = coerce_numeric(column.as_materialized_series())?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Textual reading of a column, rendered the way [`json_text`] renders
pub fn text_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let Ok(column) = frame.column(name) else {
        return Ok(vec![None; frame.height()]);
    };
    Ok(json_values(column.as_materialized_series())?
        .iter()
        .map(json_text)
        .collect())
}

/// Datetime reading of a column, re-parsing ISO text from persisted tables
pub fn datetime_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let Ok(column) = frame.column(name) else {
        return Ok(vec![None; frame.height()]);
    };
    let series = column.as_materialized_series();
    let values = match series.dtype() {
        DataType::Datetime(_, _) => series.datetime()?.as_datetime_iter().collect(),
        DataType::Date => series
            .date()?
            .as_date_iter()
            .map(|d| d.and_then(|d| d.and_hms_opt(0, 0, 0)))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_iso_datetime))
            .collect(),
        _ => vec![None; series.len()],
    };
    Ok(values)
}

pub fn date_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    Ok(datetime_values(frame, name)?
        .into_iter()
        .map(|dt| dt.map(|dt| dt.date()))
        .collect())
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_READ_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
