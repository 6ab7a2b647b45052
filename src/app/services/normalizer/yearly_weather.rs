//! Yearly weather summary normalization

use super::{normalize, DatasetProfile, NumericFields};
use crate::app::models::RawRecord;
use crate::constants::datasets;
use crate::constants::yearly::*;
use crate::error::Result;
use polars::prelude::*;

const SORT_KEYS: &[&str] = &[YEAR, SEQUENCE];

const PREFERRED_COLUMNS: &[&str] = &[
    DISTRICT,
    YEAR,
    AVG_TEMP,
    RAINFALL,
    HUMIDITY,
    PRESSURE,
    WIND_SPEED,
    SUNSHINE,
    FROST_FREE_DAYS,
    SEQUENCE,
];

/// Normalize the yearly records of one district
///
/// Rows without a year are dropped (all rows, when the year column is
/// absent). Integer fields keep missing values as null.
pub fn normalize_yearly_weather(records: &[RawRecord], district: &str) -> Result<DataFrame> {
    let label_district = |frame: &mut DataFrame| -> Result<()> {
        *frame = std::mem::take(frame)
            .lazy()
            .with_column(lit(district).alias(DISTRICT))
            .collect()?;
        Ok(())
    };

    let profile = DatasetProfile::new(datasets::YEARLY_WEATHER)
        .with_numeric_fields(NumericFields::Listed(NUMERIC_FIELDS))
        .with_integer_fields(INTEGER_FIELDS)
        .with_required_any(&[YEAR])
        .with_sort_keys(SORT_KEYS)
        .with_dedup_key(YEAR)
        .with_finalize(label_district)
        .with_preferred_columns(PREFERRED_COLUMNS);

    normalize(records, &profile)
}
