//! Air-quality charts: monthly stack, date timeline and quality counters

use super::aggregate::{grouped_sums, numeric_frame, round_all, round_to, with_running_totals};
use crate::app::models::{
    AxisLabel, Chart, ChartPayload, NamedSeries, QualitySummary, SeriesPayload,
};
use crate::app::services::frame_conversion::{date_series, date_values, f64_values, has_column};
use crate::constants::air_quality::*;
use crate::constants::charts::{
    AIR_QUALITY_MONTHLY, AIR_QUALITY_PRECISION, AIR_QUALITY_QUALITY, AIR_QUALITY_TIMELINE,
};
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

const CUM_SUFFIX: &str = "_cum";

/// Month number in 1..=12, if the value is one
fn valid_month(value: Option<f64>) -> Option<i64> {
    value
        .filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
        .map(|m| m as i64)
}

pub fn build_air_quality_charts(frame: &DataFrame) -> Result<Vec<Chart>> {
    if frame.height() == 0 {
        debug!("Air quality table is empty, no charts");
        return Ok(Vec::new());
    }

    let mut charts = Vec::new();
    charts.extend(monthly_chart(frame)?);
    charts.extend(timeline_chart(frame)?);
    charts.push(quality_chart(frame)?);
    Ok(charts)
}

/// Stacked monthly counts; months with no data at all report 0
pub fn monthly_chart(frame: &DataFrame) -> Result<Option<Chart>> {
    let months: Vec<Option<i64>> = f64_values(frame, MONTH)?
        .into_iter()
        .map(valid_month)
        .collect();
    let mut counts = numeric_frame(frame, COUNT_FIELDS)?;
    counts.with_column(Series::new(MONTH.into(), months))?;

    let groups = grouped_sums(counts, MONTH, COUNT_FIELDS)?;
    if groups.height() == 0 {
        return Ok(None);
    }

    let digits = AIR_QUALITY_PRECISION;
    let filled = |field: &str| -> Result<Vec<f64>> {
        Ok(f64_values(&groups, field)?
            .into_iter()
            .map(|sum| sum.unwrap_or(0.0))
            .collect())
    };
    let good = filled(GOOD_DAYS)?;
    let moderate = filled(MODERATE_DAYS)?;
    let exceed = filled(EXCEED_DAYS)?;

    let x_axis: Vec<AxisLabel> = f64_values(&groups, MONTH)?
        .into_iter()
        .flatten()
        .map(|month| AxisLabel::Number(month as i64))
        .collect();
    let totals: Vec<f64> = (0..groups.height())
        .map(|idx| good[idx] + moderate[idx] + exceed[idx])
        .collect();
    let rates: Vec<Option<f64>> = good
        .iter()
        .zip(&totals)
        .map(|(good, days)| {
            let rate = good / days;
            Some(if rate.is_finite() { round_to(rate, digits) } else { 0.0 })
        })
        .collect();
    let rounded = |values: &[f64]| -> Vec<Option<f64>> {
        values.iter().map(|v| Some(round_to(*v, digits))).collect()
    };

    let mut series = NamedSeries::new();
    series.push("good_days", rounded(&good));
    series.push("moderate_days", rounded(&moderate));
    series.push("exceed_days", rounded(&exceed));
    series.push("total_days", rounded(&totals));
    series.push("good_rate", rates);

    Ok(Some(Chart::new(
        AIR_QUALITY_MONTHLY,
        frame.height(),
        groups.height(),
        ChartPayload::Series(SeriesPayload { x_axis, series }),
    )))
}

/// Per-date counts with running totals; missing sums stay missing
pub fn timeline_chart(frame: &DataFrame) -> Result<Option<Chart>> {
    let mut counts = numeric_frame(frame, COUNT_FIELDS)?;
    counts.with_column(date_series(PERIOD_DATE, date_values(frame, PERIOD_DATE)?))?;

    let groups = grouped_sums(counts, PERIOD_DATE, COUNT_FIELDS)?;
    if groups.height() == 0 {
        return Ok(None);
    }
    let groups = with_running_totals(groups, COUNT_FIELDS, CUM_SUFFIX)?;

    let digits = AIR_QUALITY_PRECISION;
    let x_axis = date_values(&groups, PERIOD_DATE)?
        .into_iter()
        .flatten()
        .map(|date| AxisLabel::Text(date.format("%Y-%m-%d").to_string()))
        .collect();
    let column = |name: &str| -> Result<Vec<Option<f64>>> {
        Ok(round_all(&f64_values(&groups, name)?, digits))
    };
    let running = |name: &str| column(format!("{name}{CUM_SUFFIX}").as_str());

    let mut series = NamedSeries::new();
    series.push("good_days", column(GOOD_DAYS)?);
    series.push("moderate_days", column(MODERATE_DAYS)?);
    series.push("exceed_days", column(EXCEED_DAYS)?);
    series.push("good_days_cum", running(GOOD_DAYS)?);
    series.push("moderate_days_cum", running(MODERATE_DAYS)?);
    series.push("exceed_days_cum", running(EXCEED_DAYS)?);

    Ok(Some(Chart::new(
        AIR_QUALITY_TIMELINE,
        frame.height(),
        groups.height(),
        ChartPayload::Series(SeriesPayload { x_axis, series }),
    )))
}

/// Counters for the data-quality review panel
pub fn quality_chart(frame: &DataFrame) -> Result<Chart> {
    let invalid_month_rows = if has_column(frame, MONTH) {
        f64_values(frame, MONTH)?
            .into_iter()
            .filter(|m| valid_month(*m).is_none())
            .count()
    } else {
        0
    };
    let total_gt_31_rows = f64_values(frame, TOTAL_DAYS)?
        .into_iter()
        .filter(|total| total.is_some_and(|t| t > 31.0))
        .count();
    let missing_exceed_rows = if has_column(frame, EXCEED_DAYS) {
        f64_values(frame, EXCEED_DAYS)?
            .into_iter()
            .filter(Option::is_none)
            .count()
    } else {
        0
    };

    let summary = QualitySummary {
        rows: frame.height(),
        invalid_month_rows,
        total_gt_31_rows,
        missing_exceed_rows,
    };
    Ok(Chart::new(
        AIR_QUALITY_QUALITY,
        frame.height(),
        1,
        ChartPayload::Quality(summary),
    ))
}
