//! Tests for the air-quality chart payloads

use super::*;
use crate::app::services::chart_builder::air_quality::{
    monthly_chart, quality_chart, timeline_chart,
};
use crate::app::services::chart_builder::build_air_quality_charts;
use crate::constants::charts::*;
use serde_json::json;

#[test]
fn test_monthly_sums_and_good_rate() {
    let source = table(json!([
        {"month": 1, "youdetianshu": 10, "liangdetianshu": 2, "chaobiaotianshu": 0},
        {"month": 1, "youdetianshu": 5, "liangdetianshu": 1, "chaobiaotianshu": 1},
    ]));
    let chart = monthly_chart(&source).unwrap().unwrap();
    let series = chart.as_series().unwrap();

    assert_eq!(payload_json(&chart)["xAxis"], json!([1]));
    assert_eq!(series.series.get("good_days").unwrap(), &[Some(15.0)]);
    assert_eq!(series.series.get("moderate_days").unwrap(), &[Some(3.0)]);
    assert_eq!(series.series.get("exceed_days").unwrap(), &[Some(1.0)]);
    assert_eq!(series.series.get("total_days").unwrap(), &[Some(19.0)]);
    assert_eq!(series.series.get("good_rate").unwrap(), &[Some(0.7895)]);
    assert_eq!((chart.rows_in, chart.rows_out), (2, 1));
}

#[test]
fn test_monthly_fills_empty_groups_with_zero() {
    let source = table(json!([
        {"month": 3, "youdetianshu": null, "liangdetianshu": null, "chaobiaotianshu": null},
        {"month": 2, "youdetianshu": "8", "liangdetianshu": "1", "chaobiaotianshu": "0"},
        {"month": 13, "youdetianshu": 99},
        {"month": null, "youdetianshu": 99},
    ]));
    let chart = monthly_chart(&source).unwrap().unwrap();
    let series = chart.as_series().unwrap();

    assert_eq!(payload_json(&chart)["xAxis"], json!([2, 3]));
    assert_eq!(series.series.get("good_days").unwrap(), &[Some(8.0), Some(0.0)]);
    // 0 / 0 is reported as a 0 rate
    assert_eq!(series.series.get("good_rate").unwrap(), &[Some(0.8889), Some(0.0)]);
    assert!(series.is_aligned());
}

#[test]
fn test_monthly_skipped_without_valid_months() {
    let source = table(json!([{"month": 0, "youdetianshu": 1}, {"youdetianshu": 2}]));
    assert!(monthly_chart(&source).unwrap().is_none());
}

#[test]
fn test_timeline_keeps_missing_sums_and_skips_them_in_running_totals() {
    let source = table(json!([
        {"period_date": "2025-02-01", "youdetianshu": 3, "liangdetianshu": null, "chaobiaotianshu": 0},
        {"period_date": "2025-01-01", "youdetianshu": 2, "liangdetianshu": 1, "chaobiaotianshu": 0},
        {"period_date": "2025-03-01", "youdetianshu": 4, "liangdetianshu": 2, "chaobiaotianshu": 1},
        {"period_date": "2025-01-01", "youdetianshu": 1, "liangdetianshu": null, "chaobiaotianshu": 0},
        {"period_date": null, "youdetianshu": 50, "liangdetianshu": 50, "chaobiaotianshu": 50},
    ]));
    let chart = timeline_chart(&source).unwrap().unwrap();
    let series = chart.as_series().unwrap();

    assert_eq!(
        payload_json(&chart)["xAxis"],
        json!(["2025-01-01", "2025-02-01", "2025-03-01"])
    );
    assert_eq!(
        series.series.get("good_days").unwrap(),
        &[Some(3.0), Some(3.0), Some(4.0)]
    );
    assert_eq!(
        series.series.get("moderate_days").unwrap(),
        &[Some(1.0), None, Some(2.0)]
    );
    assert_eq!(
        series.series.get("moderate_days_cum").unwrap(),
        &[Some(1.0), None, Some(3.0)]
    );
    assert_eq!(
        series.series.get("good_days_cum").unwrap(),
        &[Some(3.0), Some(6.0), Some(10.0)]
    );
    assert_eq!(chart.rows_out, 3);
}

#[test]
fn test_quality_counters() {
    let source = table(json!([
        {"month": 1, "total_days": 31, "chaobiaotianshu": 0},
        {"month": 14, "total_days": 40, "chaobiaotianshu": null},
        {"month": null, "total_days": null, "chaobiaotianshu": "x"},
    ]));
    let chart = quality_chart(&source).unwrap();

    assert_eq!(
        payload_json(&chart),
        json!({
            "rows": 3,
            "invalid_month_rows": 2,
            "total_gt_31_rows": 1,
            "missing_exceed_rows": 2
        })
    );
}

#[test]
fn test_quality_counters_with_absent_columns() {
    let source = table(json!([{"yf": "1"}]));

    assert_eq!(
        payload_json(&quality_chart(&source).unwrap()),
        json!({
            "rows": 1,
            "invalid_month_rows": 0,
            "total_gt_31_rows": 0,
            "missing_exceed_rows": 0
        })
    );
}

#[test]
fn test_build_all_air_quality_charts() {
    let source = table(json!([
        {"period_date": "2025-01-01", "month": 1, "youdetianshu": 20, "liangdetianshu": 10, "chaobiaotianshu": 1},
    ]));
    let names: Vec<String> = build_air_quality_charts(&source)
        .unwrap()
        .into_iter()
        .map(|chart| chart.name)
        .collect();

    assert_eq!(
        names,
        vec![AIR_QUALITY_MONTHLY, AIR_QUALITY_TIMELINE, AIR_QUALITY_QUALITY]
    );
    assert!(build_air_quality_charts(&DataFrame::empty()).unwrap().is_empty());
}
