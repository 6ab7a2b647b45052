//! Aggregation primitives shared by the chart builders
//!
//! Frame-level helpers run as polars lazy queries over float columns; values
//! come back as `Option<f64>` with `None` for a missing value. The helpers
//! never invent data. A sum over nothing but missing values is missing
//! (minimum count of one), and an undefined correlation is reported as
//! `None` so the caller decides how to render it.

use crate::app::services::frame_conversion::{coerce_numeric, f64_values};
use crate::error::Result;
use polars::prelude::*;

/// Name of the count column produced by [`top_k_by_count`]
pub const COUNT: &str = "count";

/// Round half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    // Normalise negative zero so it serializes as 0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round a present value; non-finite values become missing
pub fn round_opt(value: Option<f64>, digits: u32) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| round_to(v, digits))
}

pub fn round_all(values: &[Option<f64>], digits: u32) -> Vec<Option<f64>> {
    values.iter().map(|v| round_opt(*v, digits)).collect()
}

/// The requested columns of `frame` coerced to floats
///
/// Absent columns come back all-null so later queries can name them.
pub fn numeric_frame(frame: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let columns = columns
        .iter()
        .map(|name| {
            let series = match frame.column(name) {
                Ok(column) => coerce_numeric(column.as_materialized_series())?,
                Err(_) => {
                    Series::full_null((*name).into(), frame.height(), &DataType::Float64)
                }
            };
            Ok(series.into_column())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DataFrame::new(columns)?)
}

fn count_alias(name: &str) -> String {
    format!("{name}__present")
}

/// Per-key sums of several value columns, keys ascending
///
/// Rows whose key is missing are ignored. Each column is summed with a
/// minimum count of one. The result holds `key` followed by `columns`.
pub fn grouped_sums(frame: DataFrame, key: &str, columns: &[&str]) -> Result<DataFrame> {
    let mut aggregations = Vec::with_capacity(columns.len() * 2);
    for name in columns {
        aggregations.push(col(*name).sum().alias(*name));
        aggregations.push(col(*name).count().alias(count_alias(name)));
    }

    let grouped = frame
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg(aggregations)
        .sort_by_exprs([col(key)], SortMultipleOptions::default())
        .collect()?;

    let mut guarded = grouped.select([key])?;
    for name in columns {
        let sums = f64_values(&grouped, name)?;
        let present = f64_values(&grouped, &count_alias(name))?;
        let values: Vec<Option<f64>> = sums
            .into_iter()
            .zip(present)
            .map(|(sum, present)| sum.filter(|_| present.unwrap_or(0.0) > 0.0))
            .collect();
        guarded.with_column(Series::new((*name).into(), values))?;
    }
    Ok(guarded)
}

/// Append a running total `<name><suffix>` for each column
///
/// A missing input stays missing in the output, and the total carries on
/// past it.
pub fn with_running_totals(
    frame: DataFrame,
    columns: &[&str],
    suffix: &str,
) -> Result<DataFrame> {
    let totals: Vec<Expr> = columns
        .iter()
        .map(|name| col(*name).cum_sum(false).alias(format!("{name}{suffix}")))
        .collect();
    Ok(frame.lazy().with_columns(totals).collect()?)
}

/// Pearson correlation over the rows where both columns are present
///
/// `None` when fewer than two complete pairs exist or either side has
/// zero variance.
pub fn pearson(frame: &DataFrame, x: &str, y: &str) -> Result<Option<f64>> {
    let result = frame
        .clone()
        .lazy()
        .filter(col(x).is_not_null().and(col(y).is_not_null()))
        .select([pearson_corr(col(x), col(y)).alias("r")])
        .collect()?;

    let r = f64_values(&result, "r")?.into_iter().next().flatten();
    Ok(r.filter(|r| r.is_finite()).map(|r| r.clamp(-1.0, 1.0)))
}

/// Square Pearson matrix; undefined entries, the diagonal included, are 0
pub fn correlation_matrix(
    frame: &DataFrame,
    columns: &[String],
    digits: u32,
) -> Result<Vec<Vec<f64>>> {
    columns
        .iter()
        .map(|x| {
            columns
                .iter()
                .map(|y| Ok(pearson(frame, x, y)?.map_or(0.0, |r| round_to(r, digits))))
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

/// Positions of the maximum and minimum present values
///
/// The first occurrence wins ties.
pub fn arg_extrema(values: &[Option<f64>]) -> Option<(usize, usize)> {
    let mut present = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.map(|v| (idx, v)));
    let (first_idx, first) = present.next()?;

    let (mut max_idx, mut max) = (first_idx, first);
    let (mut min_idx, mut min) = (first_idx, first);
    for (idx, value) in present {
        if value > max {
            max_idx = idx;
            max = value;
        }
        if value < min {
            min_idx = idx;
            min = value;
        }
    }
    Some((max_idx, min_idx))
}

/// The `k` most frequent values of `key` with their [`COUNT`]
///
/// Ordered by descending count; equal counts keep first-encounter order.
/// Missing keys are not counted.
pub fn top_k_by_count(frame: &DataFrame, key: &str, k: usize) -> Result<DataFrame> {
    let limit = IdxSize::try_from(k).unwrap_or(IdxSize::MAX);
    let ranked = frame
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([len().alias(COUNT)])
        .sort_by_exprs(
            [col(COUNT)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(limit)
        .collect()?;
    Ok(ranked)
}

/// Non-overlapping occurrences of `tag` in `text`
pub fn count_occurrences(text: &str, tag: &str) -> usize {
    if tag.is_empty() {
        return 0;
    }
    text.matches(tag).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::frame_conversion::text_values;

    fn floats(columns: Vec<(&str, Vec<Option<f64>>)>) -> DataFrame {
        DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Series::new(name.into(), values).into_column())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.789_473_684, 4), 0.7895);
        assert_eq!(round_to(2.0004, 3), 2.0);
        assert_eq!(round_to(-0.00001, 3), 0.0);
        assert_eq!(round_opt(Some(f64::NAN), 2), None);
        assert_eq!(round_opt(Some(f64::INFINITY), 2), None);
    }

    #[test]
    fn test_numeric_frame_fills_absent_columns() {
        let frame = floats(vec![("a", vec![Some(1.0), None])]);
        let numeric = numeric_frame(&frame, &["a", "b"]).unwrap();

        assert_eq!(f64_values(&numeric, "a").unwrap(), vec![Some(1.0), None]);
        assert_eq!(f64_values(&numeric, "b").unwrap(), vec![None, None]);
    }

    #[test]
    fn test_grouped_sums_skip_missing_keys() {
        let mut frame = floats(vec![
            ("a", vec![Some(1.0), Some(5.0), Some(100.0), Some(2.0)]),
            ("b", vec![None, None, Some(1.0), Some(4.0)]),
        ]);
        frame
            .with_column(Series::new("key".into(), vec![Some(2i64), Some(1), None, Some(2)]))
            .unwrap();
        let groups = grouped_sums(frame, "key", &["a", "b"]).unwrap();

        assert_eq!(f64_values(&groups, "key").unwrap(), vec![Some(1.0), Some(2.0)]);
        assert_eq!(f64_values(&groups, "a").unwrap(), vec![Some(5.0), Some(3.0)]);
        assert_eq!(f64_values(&groups, "b").unwrap(), vec![None, Some(4.0)]);
    }

    #[test]
    fn test_running_total_skips_missing() {
        let frame = floats(vec![("a", vec![Some(1.0), None, Some(2.0), Some(3.0)])]);
        let totals = with_running_totals(frame, &["a"], "_cum").unwrap();

        assert_eq!(
            f64_values(&totals, "a_cum").unwrap(),
            vec![Some(1.0), None, Some(3.0), Some(6.0)]
        );
    }

    #[test]
    fn test_pearson_perfect_anti_correlation() {
        let frame = floats(vec![
            ("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("y", vec![Some(8.0), Some(6.0), Some(4.0), Some(2.0)]),
        ]);

        let r = pearson(&frame, "x", "y").unwrap().unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_uses_complete_pairs_only() {
        let frame = floats(vec![
            ("x", vec![Some(1.0), None, Some(2.0), Some(3.0)]),
            ("y", vec![Some(2.0), Some(100.0), Some(4.0), Some(6.0)]),
        ]);
        assert!((pearson(&frame, "x", "y").unwrap().unwrap() - 1.0).abs() < 1e-9);

        let single = floats(vec![("x", vec![Some(1.0)]), ("y", vec![Some(2.0)])]);
        assert_eq!(pearson(&single, "x", "y").unwrap(), None);
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let frame = floats(vec![
            ("flat", vec![Some(5.0), Some(5.0), Some(5.0)]),
            ("rising", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ]);

        assert_eq!(pearson(&frame, "flat", "rising").unwrap(), None);
        let columns = vec!["flat".to_string(), "rising".to_string()];
        let matrix = correlation_matrix(&frame, &columns, 4).unwrap();
        assert_eq!(matrix, vec![vec![0.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_arg_extrema_first_occurrence_wins() {
        let values = vec![Some(3.0), None, Some(9.0), Some(1.0), Some(9.0), Some(1.0)];
        assert_eq!(arg_extrema(&values), Some((2, 3)));
        assert_eq!(arg_extrema(&[None, None]), None);
    }

    #[test]
    fn test_top_k_ties_keep_encounter_order() {
        let frame = DataFrame::new(vec![Series::new(
            "key".into(),
            vec![Some("b"), Some("a"), Some("c"), None, Some("a"), Some("c"), Some("d")],
        )
        .into_column()])
        .unwrap();
        let ranked = top_k_by_count(&frame, "key", 3).unwrap();

        assert_eq!(
            text_values(&ranked, "key").unwrap(),
            vec![Some("a".to_string()), Some("c".to_string()), Some("b".to_string())]
        );
        assert_eq!(
            f64_values(&ranked, COUNT).unwrap(),
            vec![Some(2.0), Some(2.0), Some(1.0)]
        );
    }

    #[test]
    fn test_count_occurrences() {
        assert_eq!(count_occurrences("小雨转中雨，局部小雨", "小雨"), 2);
        assert_eq!(count_occurrences("雨夹雪", "小雪"), 0);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
    }
}
