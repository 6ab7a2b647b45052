//! Tests for the grid history normalizer

use super::*;
use crate::app::services::frame_conversion::has_column;
use crate::app::services::normalizer::grid_history::{parse_recv_time, trim_field_names};
use crate::app::services::normalizer::{combine_grid_files, normalize_grid_file};
use crate::app::services::reshaper::wide_to_long;
use crate::constants::grid::*;
use serde_json::json;

fn first_file() -> Vec<RawRecord> {
    records(json!([
        {"id": "2", "sp_id": "12", "recv_time": "Tue Jan 07 09:00:00 CST 2025", " pm25 ": "40", "name": "站点A"},
        {"id": "1", "sp_id": "12", "recv_time": "Mon Jan 06 08:00:00 CST 2025", " pm25 ": "35", "name": "站点A"},
        {"id": "3", "sp_id": null, "recv_time": "garbled", " pm25 ": "50"},
        {"id": "4", "sp_id": "7", "recv_time": null, " pm25 ": "bad"},
    ]))
}

#[test]
fn test_parse_recv_time() {
    assert_eq!(
        parse_recv_time("Mon Jan 06 08:00:00 CST 2025"),
        datetime("2025-01-06 08:00:00")
    );
    assert_eq!(
        parse_recv_time(" Mon Jan 06 08:00:00 CST 2025 "),
        datetime("2025-01-06 08:00:00")
    );
    assert_eq!(parse_recv_time("2025-01-06 08:00:00"), None);
    assert_eq!(parse_recv_time(""), None);
}

#[test]
fn test_single_file_cleaning() {
    let table = normalize_grid_file(&first_file(), "grid(1).json").unwrap();

    // Row with neither timestamp nor station is dropped
    assert_eq!(table.height(), 3);
    assert!(has_column(&table, "pm25"));
    assert_eq!(nums(&table, STATION_ID), vec![Some(7.0), Some(12.0), Some(12.0)]);
    assert_eq!(
        datetimes(&table, TIMESTAMP),
        vec![
            None,
            datetime("2025-01-06 08:00:00"),
            datetime("2025-01-07 09:00:00")
        ]
    );
    assert_eq!(nums(&table, "pm25"), vec![None, Some(35.0), Some(40.0)]);
    // Non-numeric text columns become missing
    assert_eq!(nums(&table, "name"), vec![None, None, None]);
    // The raw receive time is kept as text
    assert_eq!(
        texts(&table, RECV_TIME),
        vec![
            None,
            text("Mon Jan 06 08:00:00 CST 2025"),
            text("Tue Jan 07 09:00:00 CST 2025")
        ]
    );
    assert_eq!(texts(&table, SOURCE_FILE), vec![text("grid(1).json"); 3]);
}

#[test]
fn test_absent_station_column_counts_as_missing() {
    let input = records(json!([
        {"recv_time": "Mon Jan 06 08:00:00 CST 2025", "pm25": "1"},
        {"recv_time": "nope", "pm25": "2"},
    ]));
    let table = normalize_grid_file(&input, "grid(1).json").unwrap();

    assert_eq!(table.height(), 1);
    assert_eq!(nums(&table, "pm25"), vec![Some(1.0)]);
}

#[test]
fn test_absent_recv_time_column() {
    let input = records(json!([{"sp_id": "3", "pm25": "9"}]));
    let table = normalize_grid_file(&input, "grid(1).json").unwrap();

    assert_eq!(table.height(), 1);
    assert_eq!(datetimes(&table, TIMESTAMP), vec![None]);
}

#[test]
fn test_trimmed_names_merge_first_present_value() {
    let input = records(json!([
        {" pm25": 10, "pm25 ": 20, "no2": 1},
        {" pm25": null, "pm25 ": 20, " no2 ": 2},
    ]));
    let trimmed = trim_field_names(&input);

    let keys: Vec<&str> = trimmed[0].keys().map(String::as_str).collect();
    assert_eq!(keys, ["pm25", "no2"]);
    assert_eq!(trimmed[0]["pm25"], json!(10));
    // A null first spelling takes the later value
    assert_eq!(trimmed[1]["pm25"], json!(20));
    assert_eq!(trimmed[1]["no2"], json!(2));
}

#[test]
fn test_colliding_names_yield_one_metric() {
    let input = records(json!([
        {"id": "1", "sp_id": "5", " pm25": 10, "pm25 ": 20},
    ]));
    let table = normalize_grid_file(&input, "grid(1).json").unwrap();

    assert_eq!(nums(&table, "pm25"), vec![Some(10.0)]);
    assert_eq!(names(&table).iter().filter(|name| name.as_str() == "pm25").count(), 1);

    let long = wide_to_long(&table, LONG_ID_FIELDS, NON_METRIC_FIELDS).unwrap();
    let pm25_rows = texts(&long, METRIC)
        .into_iter()
        .filter(|metric| metric.as_deref() == Some("pm25"))
        .count();
    assert_eq!(pm25_rows, 1);
    assert_eq!(nums(&long, VALUE), vec![Some(10.0)]);
}

#[test]
fn test_combine_stacks_files_with_column_union() {
    let second = records(json!([
        {"id": "9", "sp_id": "1", "recv_time": "Mon Jan 06 10:00:00 CST 2025", "pm25": "20", "no2": "11"},
    ]));
    let batches = vec![
        ("grid(1).json".to_string(), first_file()),
        ("grid(2).json".to_string(), Vec::new()),
        ("grid(3).json".to_string(), second),
    ];
    let table = combine_grid_files(&batches).unwrap();

    assert_eq!(table.height(), 4);
    assert!(has_column(&table, "no2"));
    assert_eq!(
        texts(&table, SOURCE_FILE),
        vec![
            text("grid(1).json"),
            text("grid(1).json"),
            text("grid(1).json"),
            text("grid(3).json")
        ]
    );
    // Rows of the first file have no value for the second file's extra column
    assert_eq!(nums(&table, "no2"), vec![None, None, None, Some(11.0)]);
}

#[test]
fn test_combine_nothing() {
    assert_eq!(combine_grid_files(&[]).unwrap().height(), 0);
}
