//! Air-quality good-days normalization

use super::{normalize, DatasetProfile, NumericFields};
use crate::app::models::{Period, RawRecord};
use crate::app::services::frame_conversion::{date_series, has_column, text_values};
use crate::app::services::period_parser::parse_period;
use crate::constants::air_quality::*;
use crate::constants::datasets;
use crate::error::Result;
use polars::prelude::*;

const SORT_KEYS: &[&str] = &[PERIOD_DATE, MONTH, PERIOD_RAW];

const PREFERRED_COLUMNS: &[&str] = &[
    PERIOD_RAW,
    PERIOD_TYPE,
    PERIOD_DATE,
    YEAR,
    MONTH,
    GOOD_DAYS,
    MODERATE_DAYS,
    EXCEED_DAYS,
    TOTAL_DAYS,
    TOTAL_GT_31,
];

pub fn normalize_air_quality(records: &[RawRecord]) -> Result<DataFrame> {
    let profile = DatasetProfile::new(datasets::AIR_QUALITY)
        .with_prepare(derive_period_columns)
        .with_numeric_fields(NumericFields::Listed(COUNT_FIELDS))
        .with_zero_fill_fields(&[EXCEED_DAYS])
        .with_derive(derive_total_days)
        .with_sort_keys(SORT_KEYS)
        .with_dedup_key(PERIOD_RAW)
        .with_preferred_columns(PREFERRED_COLUMNS);

    normalize(records, &profile)
}

/// Keep the raw period and split it into type, date, month and year
fn derive_period_columns(frame: &mut DataFrame) -> Result<()> {
    let raw = match frame.column(PERIOD) {
        Ok(column) => column
            .as_materialized_series()
            .clone()
            .with_name(PERIOD_RAW.into()),
        Err(_) => Series::new(PERIOD_RAW.into(), vec![""; frame.height()]),
    };
    let periods: Vec<Period> = text_values(frame, PERIOD)?
        .iter()
        .map(|text| parse_period(text.as_deref()))
        .collect();

    let kinds: Vec<&str> = periods.iter().map(Period::kind).collect();
    let months: Vec<Option<i64>> = periods.iter().map(|p| p.month().map(i64::from)).collect();
    let years: Vec<Option<i64>> = periods.iter().map(|p| p.year().map(i64::from)).collect();

    frame.with_column(raw)?;
    frame.with_column(Series::new(PERIOD_TYPE.into(), kinds))?;
    frame.with_column(date_series(PERIOD_DATE, periods.iter().map(Period::date).collect()))?;
    frame.with_column(Series::new(MONTH.into(), months))?;
    frame.with_column(Series::new(YEAR.into(), years))?;
    Ok(())
}

/// Sum the three counts and flag implausible month totals
///
/// An absent count column contributes 0; a missing value in a present column
/// makes the total missing. The flag is informational and never filters.
fn derive_total_days(frame: &mut DataFrame) -> Result<()> {
    let total = COUNT_FIELDS
        .iter()
        .filter(|field| has_column(frame, field))
        .map(|field| col(*field))
        .reduce(|sum, count| sum + count)
        .unwrap_or_else(|| lit(0.0));

    *frame = std::mem::take(frame)
        .lazy()
        .with_column(total.alias(TOTAL_DAYS))
        .with_column(
            col(TOTAL_DAYS)
                .gt(lit(31.0))
                .fill_null(lit(false))
                .alias(TOTAL_GT_31),
        )
        .collect()?;
    Ok(())
}
