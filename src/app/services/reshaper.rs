//! Wide-to-long reshaping
//!
//! Turns one-row-per-observation frames into a present-value index of
//! `(ids..., metric, value)` rows, the shape the metric charts aggregate over.

use crate::app::services::frame_conversion::has_column;
use crate::constants::grid::{METRIC, VALUE};
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Numeric columns are metrics, and so is a column with no present value
/// (a column that was coerced and came out all-missing)
fn is_metric_column(series: &Series) -> bool {
    let dtype = series.dtype();
    dtype.is_integer() || dtype.is_float() || series.null_count() == series.len()
}

fn empty_long_frame(frame: &DataFrame, id_columns: &[&str]) -> Result<DataFrame> {
    let mut long = frame.select(id_columns.iter().copied())?.clear();
    long.with_column(Series::new_empty(METRIC.into(), &DataType::String))?;
    long.with_column(Series::new_empty(VALUE.into(), &DataType::Float64))?;
    Ok(long)
}

/// Reshape a wide frame into a long frame
///
/// Identifying columns are the present subset of `id_candidates`, in that
/// order. Metric columns are every other numeric column not listed in
/// `excluded`. Rows are emitted metric-major: all observations of the first
/// metric, then the next. Missing values are skipped.
pub fn wide_to_long(
    frame: &DataFrame,
    id_candidates: &[&str],
    excluded: &[&str],
) -> Result<DataFrame> {
    let id_columns: Vec<&str> = id_candidates
        .iter()
        .copied()
        .filter(|name| has_column(frame, name))
        .collect();

    let metrics: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|column| {
            let name = column.name().as_str();
            !id_columns.contains(&name) && !excluded.contains(&name)
        })
        .filter(|column| is_metric_column(column.as_materialized_series()))
        .map(|column| column.name().to_string())
        .collect();

    if metrics.is_empty() {
        debug!("No metric columns among {} rows", frame.height());
        return empty_long_frame(frame, &id_columns);
    }

    let per_metric: Vec<LazyFrame> = metrics
        .iter()
        .map(|metric| {
            let mut selection: Vec<Expr> = id_columns.iter().map(|name| col(*name)).collect();
            selection.push(lit(metric.as_str()).alias(METRIC));
            selection.push(col(metric.as_str()).cast(DataType::Float64).alias(VALUE));
            frame
                .clone()
                .lazy()
                .select(selection)
                .filter(col(VALUE).is_not_null())
        })
        .collect();
    let long = concat(per_metric, UnionArgs::default())?.collect()?;

    debug!(
        "Reshaped {} rows x {} metrics into {} long rows",
        frame.height(),
        metrics.len(),
        long.height()
    );
    Ok(long)
}
