//! Extended forecast charts: range timeline and weather event tags

use super::aggregate::{count_occurrences, numeric_frame, round_all};
use crate::app::models::{
    AxisLabel, Chart, ChartItem, ChartPayload, ItemsPayload, NamedSeries, SeriesPayload, TagCount,
};
use crate::app::services::frame_conversion::{date_series, date_values, f64_values, text_values};
use crate::constants::charts::{FORECAST_EVENT_TAGS, FORECAST_PRECISION, FORECAST_TIMELINE};
use crate::constants::forecast::*;
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

const TEMP_AVG: &str = "temp_avg";
const RAIN_AVG: &str = "rain_avg_mm";

pub fn build_forecast_charts(frame: &DataFrame) -> Result<Vec<Chart>> {
    if frame.height() == 0 {
        debug!("Forecast table is empty, no charts");
        return Ok(Vec::new());
    }
    Ok(vec![timeline_chart(frame)?, event_tags_chart(frame)?])
}

/// Bulletins by publish date then id, undated ones last
fn timeline_chart(frame: &DataFrame) -> Result<Chart> {
    let mut numeric =
        numeric_frame(frame, &[FORECAST_ID, TEMP_MIN, TEMP_MAX, RAIN_MIN, RAIN_MAX])?;
    numeric.with_column(date_series(PUBLISH_DATE, date_values(frame, PUBLISH_DATE)?))?;

    let ordered = numeric
        .lazy()
        .sort_by_exprs(
            [col(PUBLISH_DATE), col(FORECAST_ID)],
            SortMultipleOptions::default()
                .with_maintain_order(true)
                .with_nulls_last(true),
        )
        .with_columns([
            ((col(TEMP_MIN) + col(TEMP_MAX)) / lit(2.0)).alias(TEMP_AVG),
            ((col(RAIN_MIN) + col(RAIN_MAX)) / lit(2.0)).alias(RAIN_AVG),
        ])
        .collect()?;

    let x_axis: Vec<AxisLabel> = date_values(&ordered, PUBLISH_DATE)?
        .into_iter()
        .map(|date| {
            AxisLabel::Text(
                date.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            )
        })
        .collect();

    let digits = FORECAST_PRECISION;
    let mut series = NamedSeries::new();
    for name in [TEMP_MIN, TEMP_MAX, TEMP_AVG, RAIN_MIN, RAIN_MAX, RAIN_AVG] {
        series.push(name, round_all(&f64_values(&ordered, name)?, digits));
    }

    Ok(Chart::new(
        FORECAST_TIMELINE,
        frame.height(),
        ordered.height(),
        ChartPayload::Series(SeriesPayload { x_axis, series }),
    ))
}

/// Occurrences of each weather tag across trend and process text
fn event_tags_chart(frame: &DataFrame) -> Result<Chart> {
    let trends = text_values(frame, TREND_TEXT)?;
    let processes = text_values(frame, PROCESS_TEXT)?;
    let texts: Vec<String> = trends
        .into_iter()
        .zip(processes)
        .map(|(trend, process)| {
            format!(
                "{} {}",
                trend.unwrap_or_default(),
                process.unwrap_or_default()
            )
        })
        .collect();

    let items: Vec<ChartItem> = WEATHER_TAGS
        .iter()
        .map(|tag| {
            let count = texts.iter().map(|text| count_occurrences(text, tag)).sum();
            ChartItem::Tag(TagCount {
                tag: tag.to_string(),
                count,
            })
        })
        .collect();

    let rows_out = items.len();
    Ok(Chart::new(
        FORECAST_EVENT_TAGS,
        frame.height(),
        rows_out,
        ChartPayload::Items(ItemsPayload { items }),
    ))
}
