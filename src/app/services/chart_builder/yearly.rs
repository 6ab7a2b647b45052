//! Yearly weather charts: trends, correlation heatmap and extreme years

use super::aggregate::{arg_extrema, correlation_matrix, numeric_frame, round_all, round_to};
use crate::app::models::{
    AxisLabel, Chart, ChartItem, ChartPayload, ExtremeItem, ItemsPayload, MatrixPayload,
    NamedSeries, SeriesPayload,
};
use crate::app::services::frame_conversion::{f64_values, has_column};
use crate::constants::charts::{
    CORRELATION_MATRIX, CORRELATION_PRECISION, YEARLY_EXTREMES, YEARLY_PRECISION, YEARLY_TRENDS,
};
use crate::constants::yearly::*;
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Series of the trend chart and the column each one reads
const TREND_SERIES: &[(&str, &str)] = &[
    ("avg_temp", AVG_TEMP),
    ("rainfall", RAINFALL),
    ("humidity", HUMIDITY),
    ("pressure", PRESSURE),
];

/// Rows with a year, in ascending year order
///
/// Read-back tables may carry stray text, so every charted column is
/// re-coerced and rows are re-sorted stably.
fn yearly_rows(frame: &DataFrame) -> Result<DataFrame> {
    let mut columns: Vec<&str> = vec![YEAR];
    let charted = TREND_SERIES
        .iter()
        .map(|(_, column)| *column)
        .chain(CORRELATION_FIELDS.iter().copied())
        .chain(EXTREME_FIELDS.iter().copied());
    for column in charted {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    Ok(numeric_frame(frame, &columns)?
        .lazy()
        .filter(col(YEAR).is_not_null())
        .sort_by_exprs(
            [col(YEAR)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?)
}

pub fn build_yearly_charts(frame: &DataFrame) -> Result<Vec<Chart>> {
    if frame.height() == 0 {
        debug!("Yearly weather table is empty, no charts");
        return Ok(Vec::new());
    }

    let rows = yearly_rows(frame)?;
    let years = f64_values(&rows, YEAR)?;
    Ok(vec![
        trends_chart(&rows, &years)?,
        correlation_chart(frame, &rows)?,
        extremes_chart(frame, &rows, &years)?,
    ])
}

fn year_of(year: Option<f64>) -> i64 {
    year.map_or(0, |y| y.round() as i64)
}

fn trends_chart(rows: &DataFrame, years: &[Option<f64>]) -> Result<Chart> {
    let x_axis: Vec<AxisLabel> = years
        .iter()
        .map(|year| AxisLabel::Text(format!("{}", year_of(*year))))
        .collect();

    let mut series = NamedSeries::new();
    for (name, column) in TREND_SERIES {
        series.push(*name, round_all(&f64_values(rows, column)?, YEARLY_PRECISION));
    }

    let rows_out = x_axis.len();
    Ok(Chart::new(
        YEARLY_TRENDS,
        rows.height(),
        rows_out,
        ChartPayload::Series(SeriesPayload { x_axis, series }),
    ))
}

/// Heatmap over the correlation fields present in the table
fn correlation_chart(frame: &DataFrame, rows: &DataFrame) -> Result<Chart> {
    let metrics: Vec<String> = CORRELATION_FIELDS
        .iter()
        .filter(|field| has_column(frame, field))
        .map(|field| field.to_string())
        .collect();
    let matrix = correlation_matrix(rows, &metrics, CORRELATION_PRECISION)?;

    let rows_out = metrics.len();
    Ok(Chart::new(
        CORRELATION_MATRIX,
        rows.height(),
        rows_out,
        ChartPayload::Matrix(MatrixPayload { metrics, matrix }),
    ))
}

/// Hottest/coldest style years per metric; earliest year wins ties
fn extremes_chart(frame: &DataFrame, rows: &DataFrame, years: &[Option<f64>]) -> Result<Chart> {
    let mut items: Vec<ChartItem> = Vec::new();
    for metric in EXTREME_FIELDS.iter().filter(|metric| has_column(frame, metric)) {
        let values = f64_values(rows, metric)?;
        let Some((max_idx, min_idx)) = arg_extrema(&values) else {
            continue;
        };
        let (Some(max_value), Some(min_value)) = (values[max_idx], values[min_idx]) else {
            continue;
        };
        items.push(ChartItem::Extreme(ExtremeItem {
            metric: metric.to_string(),
            max_year: year_of(years[max_idx]),
            max_value: round_to(max_value, YEARLY_PRECISION),
            min_year: year_of(years[min_idx]),
            min_value: round_to(min_value, YEARLY_PRECISION),
        }));
    }

    let rows_out = items.len();
    Ok(Chart::new(
        YEARLY_EXTREMES,
        rows.height(),
        rows_out,
        ChartPayload::Items(ItemsPayload { items }),
    ))
}
