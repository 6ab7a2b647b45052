//! Tests for the shared normalization skeleton

use super::*;
use crate::app::services::frame_conversion::f64_values;
use crate::app::services::normalizer::{normalize, DatasetProfile, NumericFields};
use polars::prelude::*;
use serde_json::json;

#[test]
fn test_empty_input_is_an_empty_table() {
    let profile = DatasetProfile::new("empty").with_sort_keys(&["a"]);
    let frame = normalize(&[], &profile).unwrap();

    assert_eq!(frame.height(), 0);
    assert_eq!(frame.width(), 0);
}

#[test]
fn test_numeric_coercion_yields_missing_not_zero() {
    let input = records(json!([
        {"a": "1.5", "b": "x"},
        {"a": "n/a", "b": "2"},
    ]));
    let profile = DatasetProfile::new("coerce").with_numeric_fields(NumericFields::Listed(&["a"]));
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(nums(&frame, "a"), vec![Some(1.5), None]);
    // Unlisted columns keep their raw text
    assert_eq!(frame.column("b").unwrap().dtype(), &DataType::String);
    assert_eq!(texts(&frame, "b"), vec![text("x"), text("2")]);
}

#[test]
fn test_zero_fill_only_touches_declared_fields() {
    let input = records(json!([{"a": null, "b": null}]));
    let profile = DatasetProfile::new("fill")
        .with_numeric_fields(NumericFields::Listed(&["a", "b"]))
        .with_zero_fill_fields(&["a"]);
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(nums(&frame, "a"), vec![Some(0.0)]);
    assert_eq!(nums(&frame, "b"), vec![None]);
}

#[test]
fn test_stable_sort_then_dedup_keeps_last() {
    let input = records(json!([
        {"k": 2, "tag": "first"},
        {"k": 1, "tag": "only"},
        {"k": 2, "tag": "second"},
        {"k": null, "tag": "missing"},
    ]));
    let profile = DatasetProfile::new("dedup")
        .with_sort_keys(&["k"])
        .with_dedup_key("k");
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(
        texts(&frame, "tag"),
        vec![text("only"), text("second"), text("missing")]
    );
}

#[test]
fn test_required_any_drops_rows_without_any_key() {
    let input = records(json!([
        {"a": 1, "b": null},
        {"a": null, "b": "  "},
        {"a": null, "b": "x"},
    ]));
    let profile = DatasetProfile::new("required").with_required_any(&["a", "b"]);
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(frame.height(), 2);
    assert_eq!(texts(&frame, "b"), vec![None, text("x")]);
}

#[test]
fn test_required_key_column_absent_drops_everything() {
    let input = records(json!([{"a": 1}, {"a": 2}]));
    let profile = DatasetProfile::new("absent").with_required_any(&["key"]);

    assert_eq!(normalize(&input, &profile).unwrap().height(), 0);
}

#[test]
fn test_preferred_columns_first_rest_in_input_order() {
    let input = records(json!([{"z": 1, "a": 2, "m": 3, "b": 4}]));
    let profile = DatasetProfile::new("order").with_preferred_columns(&["b", "missing", "a"]);
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(names(&frame), vec!["b", "a", "z", "m"]);
}

#[test]
fn test_hooks_run_in_order() {
    let input = records(json!([{"v": "3"}, {"v": "1"}]));
    let profile = DatasetProfile::new("hooks")
        .with_prepare(|frame: &mut DataFrame| {
            let raw = frame
                .column("v")?
                .as_materialized_series()
                .clone()
                .with_name("raw".into());
            frame.with_column(raw)?;
            Ok(())
        })
        .with_numeric_fields(NumericFields::Listed(&["v"]))
        .with_derive(|frame: &mut DataFrame| {
            let doubled: Vec<Option<f64>> = f64_values(frame, "v")?
                .into_iter()
                .map(|v| v.map(|v| v * 2.0))
                .collect();
            frame.with_column(Series::new("doubled".into(), doubled))?;
            Ok(())
        })
        .with_sort_keys(&["v"])
        .with_finalize(|frame: &mut DataFrame| {
            let rank: Vec<i64> = (0..frame.height() as i64).collect();
            frame.with_column(Series::new("rank".into(), rank))?;
            Ok(())
        });
    let frame = normalize(&input, &profile).unwrap();

    assert_eq!(texts(&frame, "raw"), vec![text("1"), text("3")]);
    assert_eq!(nums(&frame, "doubled"), vec![Some(2.0), Some(6.0)]);
    assert_eq!(ints(&frame, "rank"), vec![Some(0), Some(1)]);
}
