//! Configuration-driven dataset normalization
//!
//! All four datasets share one cleaning skeleton. A [`DatasetProfile`] names
//! the fields each step applies to, and optional hooks add the columns that
//! are specific to a dataset. [`normalize`] runs the steps in a fixed order:
//!
//! 1. `prepare` hook (raw-text fixes that must happen before coercion)
//! 2. numeric coercion (unparseable values become missing)
//! 3. integer rounding, then zero-filling of count-like fields
//! 4. `derive` hook (computed columns)
//! 5. primary-key row drop
//! 6. stable sort, then last-wins dedup
//! 7. `finalize` hook, then preferred column order
//!
//! Each step is a polars operation on the dataset frame. Empty input yields
//! an empty frame.

pub mod air_quality;
pub mod extended_forecast;
pub mod grid_history;
pub mod text_range;
pub mod yearly_weather;

#[cfg(test)]
mod tests;

use crate::app::models::RawRecord;
use crate::app::services::frame_conversion::{
    coerce_integer, coerce_numeric, has_column, records_to_frame,
};
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

pub use air_quality::normalize_air_quality;
pub use extended_forecast::normalize_extended_forecast;
pub use grid_history::{combine_grid_files, normalize_grid_file};
pub use text_range::{extract_range, RangeExtractor};
pub use yearly_weather::normalize_yearly_weather;

/// Frame rewrite applied at a fixed point of [`normalize`]
pub type FrameHook<'a> = Box<dyn Fn(&mut DataFrame) -> Result<()> + 'a>;

/// Which columns numeric coercion applies to
#[derive(Debug, Clone, Copy)]
pub enum NumericFields<'a> {
    /// The listed columns, when present
    Listed(&'a [&'a str]),
    /// Every column except the listed ones
    AllExcept(&'a [&'a str]),
}

impl NumericFields<'_> {
    fn resolve(&self, frame: &DataFrame) -> Vec<String> {
        match self {
            NumericFields::Listed(fields) => fields
                .iter()
                .filter(|f| has_column(frame, f))
                .map(|f| f.to_string())
                .collect(),
            NumericFields::AllExcept(skipped) => frame
                .get_column_names()
                .iter()
                .map(|name| name.as_str())
                .filter(|name| !skipped.contains(name))
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Per-dataset cleaning rules
pub struct DatasetProfile<'a> {
    pub name: &'a str,
    pub numeric_fields: NumericFields<'a>,
    pub integer_fields: &'a [&'a str],
    /// Count-like fields whose missing values become 0
    pub zero_fill_fields: &'a [&'a str],
    /// A row survives when at least one of these is present; absent columns
    /// count as missing and empty text counts as missing
    pub required_any: &'a [&'a str],
    pub sort_keys: &'a [&'a str],
    pub dedup_key: Option<&'a str>,
    pub preferred_columns: &'a [&'a str],
    pub prepare: Option<FrameHook<'a>>,
    pub derive: Option<FrameHook<'a>>,
    pub finalize: Option<FrameHook<'a>>,
}

impl<'a> DatasetProfile<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            numeric_fields: NumericFields::Listed(&[]),
            integer_fields: &[],
            zero_fill_fields: &[],
            required_any: &[],
            sort_keys: &[],
            dedup_key: None,
            preferred_columns: &[],
            prepare: None,
            derive: None,
            finalize: None,
        }
    }

    pub fn with_numeric_fields(mut self, fields: NumericFields<'a>) -> Self {
        self.numeric_fields = fields;
        self
    }

    pub fn with_integer_fields(mut self, fields: &'a [&'a str]) -> Self {
        self.integer_fields = fields;
        self
    }

    pub fn with_zero_fill_fields(mut self, fields: &'a [&'a str]) -> Self {
        self.zero_fill_fields = fields;
        self
    }

    pub fn with_required_any(mut self, fields: &'a [&'a str]) -> Self {
        self.required_any = fields;
        self
    }

    pub fn with_sort_keys(mut self, keys: &'a [&'a str]) -> Self {
        self.sort_keys = keys;
        self
    }

    pub fn with_dedup_key(mut self, key: &'a str) -> Self {
        self.dedup_key = Some(key);
        self
    }

    pub fn with_preferred_columns(mut self, columns: &'a [&'a str]) -> Self {
        self.preferred_columns = columns;
        self
    }

    pub fn with_prepare(mut self, hook: impl Fn(&mut DataFrame) -> Result<()> + 'a) -> Self {
        self.prepare = Some(Box::new(hook));
        self
    }

    pub fn with_derive(mut self, hook: impl Fn(&mut DataFrame) -> Result<()> + 'a) -> Self {
        self.derive = Some(Box::new(hook));
        self
    }

    pub fn with_finalize(mut self, hook: impl Fn(&mut DataFrame) -> Result<()> + 'a) -> Self {
        self.finalize = Some(Box::new(hook));
        self
    }
}

/// Run the shared cleaning skeleton over raw records
pub fn normalize(records: &[RawRecord], profile: &DatasetProfile) -> Result<DataFrame> {
    let mut frame = records_to_frame(records)?;
    if frame.height() == 0 {
        debug!("{}: no records to normalize", profile.name);
        return Ok(frame);
    }

    if let Some(prepare) = &profile.prepare {
        prepare(&mut frame)?;
    }

    for field in profile.numeric_fields.resolve(&frame) {
        let coerced = coerce_numeric(frame.column(&field)?.as_materialized_series())?;
        frame.with_column(coerced)?;
    }
    for field in profile.integer_fields {
        if has_column(&frame, field) {
            let rounded = coerce_integer(frame.column(field)?.as_materialized_series())?;
            frame.with_column(rounded)?;
        }
    }
    for field in profile.zero_fill_fields {
        if has_column(&frame, field) {
            let filled = frame
                .column(field)?
                .as_materialized_series()
                .fill_null(FillNullStrategy::Zero)?;
            frame.with_column(filled)?;
        }
    }

    if let Some(derive) = &profile.derive {
        derive(&mut frame)?;
    }

    if !profile.required_any.is_empty() {
        let before = frame.height();
        frame = frame.filter(&presence_mask(&frame, profile.required_any)?)?;
        if frame.height() < before {
            debug!(
                "{}: dropped {} rows without {:?}",
                profile.name,
                before - frame.height(),
                profile.required_any
            );
        }
    }

    let sort_keys: Vec<Expr> = profile
        .sort_keys
        .iter()
        .filter(|key| has_column(&frame, key))
        .map(|key| col(*key))
        .collect();
    if !sort_keys.is_empty() {
        frame = frame
            .lazy()
            .sort_by_exprs(
                sort_keys,
                SortMultipleOptions::default()
                    .with_maintain_order(true)
                    .with_nulls_last(true),
            )
            .collect()?;
    }

    if let Some(key) = profile.dedup_key.filter(|key| has_column(&frame, key)) {
        let before = frame.height();
        frame = frame.unique_stable(Some(&[key.to_string()]), UniqueKeepStrategy::Last, None)?;
        if frame.height() < before {
            debug!(
                "{}: removed {} duplicate rows by {}",
                profile.name,
                before - frame.height(),
                key
            );
        }
    }

    if let Some(finalize) = &profile.finalize {
        finalize(&mut frame)?;
    }

    let frame = frame.select(preferred_order(&frame, profile.preferred_columns))?;
    debug!(
        "{}: normalized {} records into {} rows",
        profile.name,
        records.len(),
        frame.height()
    );
    Ok(frame)
}

/// Preferred columns that exist, followed by the rest in their current order
fn preferred_order(frame: &DataFrame, preferred: &[&str]) -> Vec<String> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut order: Vec<String> = preferred
        .iter()
        .filter(|name| names.iter().any(|n| n == *name))
        .map(|name| name.to_string())
        .collect();
    order.extend(names.into_iter().filter(|name| !preferred.contains(&name.as_str())));
    order
}

/// Rows where any of `fields` is present; blank text counts as missing
pub(crate) fn presence_mask(frame: &DataFrame, fields: &[&str]) -> Result<BooleanChunked> {
    let mut keep = vec![false; frame.height()];
    for field in fields {
        let Ok(column) = frame.column(field) else {
            continue;
        };
        let series = column.as_materialized_series();
        let present: Vec<bool> = match series.dtype() {
            DataType::String => series
                .str()?
                .into_iter()
                .map(|text| text.is_some_and(|t| !t.trim().is_empty()))
                .collect(),
            _ => {
                let mask = series.is_not_null();
                (&mask).into_iter().map(|flag| flag.unwrap_or(false)).collect()
            }
        };
        for (kept, present) in keep.iter_mut().zip(present) {
            *kept |= present;
        }
    }
    Ok(BooleanChunked::from_slice("present".into(), &keep))
}
