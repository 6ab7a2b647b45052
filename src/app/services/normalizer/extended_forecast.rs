//! Extended-range forecast bulletin normalization
//!
//! Bulletins are free text. The three text fields are cleaned first; the
//! publication date and the temperature/rainfall ranges are then mined from
//! the cleaned text.

use super::text_range::RangeExtractor;
use super::{normalize, DatasetProfile};
use crate::app::models::RawRecord;
use crate::app::services::frame_conversion::{date_series, has_column, text_values};
use crate::app::services::period_parser::parse_chinese_date_text;
use crate::constants::datasets;
use crate::constants::forecast::*;
use crate::error::Result;
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const PREFERRED_COLUMNS: &[&str] = &[
    FORECAST_ID,
    PUBLISH_DATE,
    PUBLISH_TEXT,
    TEMP_MIN,
    TEMP_MAX,
    RAIN_MIN,
    RAIN_MAX,
    TREND_TEXT,
    PROCESS_TEXT,
];

pub fn normalize_extended_forecast(records: &[RawRecord]) -> Result<DataFrame> {
    let profile = DatasetProfile::new(datasets::EXTENDED_FORECAST)
        .with_prepare(clean_text_fields)
        .with_derive(derive_forecast_columns)
        .with_required_any(TEXT_FIELDS)
        .with_sort_keys(&[PUBLISH_DATE])
        .with_finalize(assign_forecast_ids)
        .with_preferred_columns(PREFERRED_COLUMNS);

    normalize(records, &profile)
}

/// Null becomes empty, newlines and whitespace runs become one space
pub fn clean_text(text: Option<&str>) -> String {
    let text = text.unwrap_or_default().replace('\n', " ");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

fn clean_text_fields(frame: &mut DataFrame) -> Result<()> {
    for field in TEXT_FIELDS {
        if !has_column(frame, field) {
            continue;
        }
        let cleaned: Vec<String> = text_values(frame, field)?
            .iter()
            .map(|text| clean_text(text.as_deref()))
            .collect();
        frame.with_column(Series::new((*field).into(), cleaned))?;
    }
    Ok(())
}

fn derive_forecast_columns(frame: &mut DataFrame) -> Result<()> {
    let publish_dates = text_values(frame, PUBLISH_TEXT)?
        .iter()
        .map(|text| text.as_deref().and_then(parse_chinese_date_text))
        .collect();

    let trends: Vec<String> = text_values(frame, TREND_TEXT)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();

    let temperature = RangeExtractor::new(TEMP_KEYWORD);
    let rainfall = RangeExtractor::new(RAIN_KEYWORD);
    let (temp_min, temp_max): (Vec<Option<f64>>, Vec<Option<f64>>) =
        trends.iter().map(|text| temperature.extract(text)).unzip();
    let (rain_min, rain_max): (Vec<Option<f64>>, Vec<Option<f64>>) =
        trends.iter().map(|text| rainfall.extract(text)).unzip();

    frame.with_column(date_series(PUBLISH_DATE, publish_dates))?;
    frame.with_column(Series::new(TEMP_MIN.into(), temp_min))?;
    frame.with_column(Series::new(TEMP_MAX.into(), temp_max))?;
    frame.with_column(Series::new(RAIN_MIN.into(), rain_min))?;
    frame.with_column(Series::new(RAIN_MAX.into(), rain_max))?;
    Ok(())
}

/// Number rows 1..=n in their final order
fn assign_forecast_ids(frame: &mut DataFrame) -> Result<()> {
    let ids: Vec<i64> = (1..=frame.height() as i64).collect();
    frame.with_column(Series::new(FORECAST_ID.into(), ids))?;
    Ok(())
}
