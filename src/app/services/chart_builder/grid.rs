//! Grid monitoring charts: per-metric statistics, top-metric daily trends
//! and the busiest stations

use super::aggregate::{round_opt, round_to, top_k_by_count, COUNT};
use crate::app::models::{
    AxisLabel, Chart, ChartItem, ChartPayload, ItemsPayload, MetricStats, NamedSeries,
    SeriesPayload, StationRecords,
};
use crate::app::services::frame_conversion::{
    date_series, date_values, f64_values, has_column, text_values,
};
use crate::constants::charts::{
    DEFAULT_TOP_METRICS, DEFAULT_TOP_STATIONS, GRID_METRIC_STATS, GRID_METRIC_TRENDS,
    GRID_PRECISION, GRID_STATION_OVERVIEW,
};
use crate::constants::grid::{METRIC, STATION_ID, TIMESTAMP, VALUE};
use crate::error::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const DAY: &str = "day";

/// Ranking limits for the grid charts
#[derive(Debug, Clone, Copy)]
pub struct GridChartOptions {
    pub top_metrics: usize,
    pub top_stations: usize,
}

impl Default for GridChartOptions {
    fn default() -> Self {
        Self {
            top_metrics: DEFAULT_TOP_METRICS,
            top_stations: DEFAULT_TOP_STATIONS,
        }
    }
}

/// Build the grid charts from the wide and long tables
///
/// Metric charts need the long table and the station overview needs the
/// wide table with a station column; each is skipped when its input is
/// missing.
pub fn build_grid_charts(
    wide: &DataFrame,
    long: &DataFrame,
    options: GridChartOptions,
) -> Result<Vec<Chart>> {
    let mut charts = Vec::new();

    if long.height() > 0 {
        let rows = metric_rows(long)?;
        charts.push(metric_stats_chart(long, &rows)?);
        charts.extend(metric_trends_chart(long, &rows, options.top_metrics)?);
    } else {
        debug!("Grid long table is empty, skipping metric charts");
    }

    if wide.height() > 0 && has_column(wide, STATION_ID) {
        charts.extend(station_overview_chart(wide, options.top_stations)?);
    }
    Ok(charts)
}

/// Long-table rows with both a metric name and a value, plus their day
fn metric_rows(long: &DataFrame) -> Result<DataFrame> {
    let frame = DataFrame::new(vec![
        Series::new(METRIC.into(), text_values(long, METRIC)?).into_column(),
        Series::new(VALUE.into(), f64_values(long, VALUE)?).into_column(),
        date_series(DAY, date_values(long, TIMESTAMP)?).into_column(),
    ])?;
    Ok(frame
        .lazy()
        .filter(col(METRIC).is_not_null().and(col(VALUE).is_not_null()))
        .collect()?)
}

fn metric_stats_chart(long: &DataFrame, rows: &DataFrame) -> Result<Chart> {
    let stats = rows
        .clone()
        .lazy()
        .group_by([col(METRIC)])
        .agg([
            col(VALUE).count().alias("count"),
            col(VALUE).mean().alias("mean"),
            col(VALUE).min().alias("min"),
            col(VALUE).max().alias("max"),
            col(VALUE).std(1).alias("std"),
        ])
        .sort_by_exprs([col(METRIC)], SortMultipleOptions::default())
        .collect()?;

    let metrics = text_values(&stats, METRIC)?;
    let counts = f64_values(&stats, "count")?;
    let means = f64_values(&stats, "mean")?;
    let mins = f64_values(&stats, "min")?;
    let maxs = f64_values(&stats, "max")?;
    let stds = f64_values(&stats, "std")?;

    let digits = GRID_PRECISION;
    let items: Vec<ChartItem> = (0..stats.height())
        .filter_map(|idx| {
            let count = counts[idx]? as usize;
            Some(ChartItem::Metric(MetricStats {
                metric: metrics[idx].clone()?,
                count,
                mean: round_to(means[idx]?, digits),
                min: round_to(mins[idx]?, digits),
                max: round_to(maxs[idx]?, digits),
                std: round_opt(stds[idx].filter(|_| count > 1), digits),
            }))
        })
        .collect();

    let rows_out = items.len();
    Ok(Chart::new(
        GRID_METRIC_STATS,
        long.height(),
        rows_out,
        ChartPayload::Items(ItemsPayload { items }),
    ))
}

/// Daily means of the most reported metrics
///
/// Skipped when no row carries a timestamp.
fn metric_trends_chart(
    long: &DataFrame,
    rows: &DataFrame,
    top_k: usize,
) -> Result<Option<Chart>> {
    if date_values(long, TIMESTAMP)?.iter().all(Option::is_none) {
        debug!("Grid long table has no timestamps, skipping trends");
        return Ok(None);
    }

    let top: Vec<String> = text_values(&top_k_by_count(rows, METRIC, top_k)?, METRIC)?
        .into_iter()
        .flatten()
        .collect();

    let daily = rows
        .clone()
        .lazy()
        .filter(col(DAY).is_not_null())
        .group_by([col(DAY), col(METRIC)])
        .agg([col(VALUE).mean().alias(VALUE)])
        .collect()?;

    let mut means: HashMap<(NaiveDate, String), f64> = HashMap::new();
    let mut x_days: BTreeSet<NaiveDate> = BTreeSet::new();
    let days = date_values(&daily, DAY)?;
    let metrics = text_values(&daily, METRIC)?;
    let values = f64_values(&daily, VALUE)?;
    for ((day, metric), value) in days.into_iter().zip(metrics).zip(values) {
        let (Some(day), Some(metric), Some(value)) = (day, metric, value) else {
            continue;
        };
        if !top.contains(&metric) {
            continue;
        }
        x_days.insert(day);
        means.insert((day, metric), value);
    }

    let mut series = NamedSeries::new();
    for metric in &top {
        let line = x_days
            .iter()
            .map(|day| {
                means
                    .get(&(*day, metric.clone()))
                    .map(|mean| round_to(*mean, GRID_PRECISION))
            })
            .collect();
        series.push(metric.clone(), line);
    }

    let x_axis: Vec<AxisLabel> = x_days
        .iter()
        .map(|day| AxisLabel::Text(day.format("%Y-%m-%d").to_string()))
        .collect();
    let rows_out = x_axis.len();
    Ok(Some(Chart::new(
        GRID_METRIC_TRENDS,
        long.height(),
        rows_out,
        ChartPayload::Series(SeriesPayload { x_axis, series }),
    )))
}

/// Station ids are whole numbers; fractional readings are not station ids
fn station_id(value: Option<f64>) -> Option<i64> {
    value
        .filter(|id| id.is_finite() && id.fract() == 0.0)
        .map(|id| id as i64)
}

/// Stations ranked by number of records
fn station_overview_chart(wide: &DataFrame, top_k: usize) -> Result<Option<Chart>> {
    let stations: Vec<Option<i64>> = f64_values(wide, STATION_ID)?
        .into_iter()
        .map(station_id)
        .collect();
    if stations.iter().all(Option::is_none) {
        return Ok(None);
    }

    let frame = DataFrame::new(vec![Series::new(STATION_ID.into(), stations).into_column()])?;
    let ranked = top_k_by_count(&frame, STATION_ID, top_k)?;
    let items: Vec<ChartItem> = f64_values(&ranked, STATION_ID)?
        .into_iter()
        .zip(f64_values(&ranked, COUNT)?)
        .filter_map(|(sp_id, records)| {
            Some(ChartItem::Station(StationRecords {
                sp_id: sp_id? as i64,
                records: records? as usize,
            }))
        })
        .collect();

    let rows_out = items.len();
    Ok(Some(Chart::new(
        GRID_STATION_OVERVIEW,
        wide.height(),
        rows_out,
        ChartPayload::Items(ItemsPayload { items }),
    )))
}
