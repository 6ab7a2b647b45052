//! Tests for the yearly weather normalizer

use super::*;
use crate::app::services::normalizer::normalize_yearly_weather;
use crate::constants::yearly::*;
use serde_json::json;

#[test]
fn test_numeric_and_integer_coercion() {
    let input = records(json!([
        {"xh": "2", "nf": "2020", "pjqw": "18.5", "pjxdsd": "79.6", "jsl": "--", "wsq": "330"},
    ]));
    let table = normalize_yearly_weather(&input, DEFAULT_DISTRICT).unwrap();

    assert_eq!(ints(&table, YEAR), vec![Some(2020)]);
    assert_eq!(ints(&table, SEQUENCE), vec![Some(2)]);
    assert_eq!(ints(&table, HUMIDITY), vec![Some(80)]);
    assert_eq!(ints(&table, FROST_FREE_DAYS), vec![Some(330)]);
    assert_eq!(nums(&table, AVG_TEMP), vec![Some(18.5)]);
    // Unparseable values stay missing rather than becoming 0
    assert_eq!(nums(&table, RAINFALL), vec![None]);
}

#[test]
fn test_integer_fields_keep_missing_as_null() {
    let input = records(json!([{"nf": "2019", "xh": null, "wsq": "n/a"}]));
    let table = normalize_yearly_weather(&input, DEFAULT_DISTRICT).unwrap();

    assert_eq!(ints(&table, SEQUENCE), vec![None]);
    assert_eq!(ints(&table, FROST_FREE_DAYS), vec![None]);
}

#[test]
fn test_rows_without_year_are_dropped() {
    let input = records(json!([
        {"nf": "2020", "pjqw": "18"},
        {"nf": "", "pjqw": "19"},
        {"nf": null, "pjqw": "20"},
        {"pjqw": "21"},
    ]));
    let table = normalize_yearly_weather(&input, DEFAULT_DISTRICT).unwrap();

    assert_eq!(table.height(), 1);
    assert_eq!(nums(&table, AVG_TEMP), vec![Some(18.0)]);
}

#[test]
fn test_absent_year_column_yields_empty_table() {
    let input = records(json!([{"pjqw": "18"}, {"pjqw": "19"}]));

    let table = normalize_yearly_weather(&input, DEFAULT_DISTRICT).unwrap();
    assert_eq!(table.height(), 0);
}

#[test]
fn test_sorted_by_year_and_sequence_last_duplicate_wins() {
    let input = records(json!([
        {"xh": "3", "nf": "2021", "pjqw": "19.0"},
        {"xh": "1", "nf": "2020", "pjqw": "18.0"},
        {"xh": "2", "nf": "2021", "pjqw": "19.5"},
    ]));
    let table = normalize_yearly_weather(&input, DEFAULT_DISTRICT).unwrap();

    assert_eq!(ints(&table, YEAR), vec![Some(2020), Some(2021)]);
    // Sorting by sequence puts xh=3 last among the 2021 rows
    assert_eq!(ints(&table, SEQUENCE), vec![Some(1), Some(3)]);
    assert_eq!(nums(&table, AVG_TEMP), vec![Some(18.0), Some(19.0)]);
}

#[test]
fn test_district_label_and_column_order() {
    let input = records(json!([
        {"extra": "x", "xh": "1", "nf": "2020", "rzss": "1200", "pjqw": "18"},
    ]));
    let table = normalize_yearly_weather(&input, "合川区").unwrap();

    assert_eq!(texts(&table, DISTRICT), vec![text("合川区")]);
    assert_eq!(
        names(&table),
        [DISTRICT, YEAR, AVG_TEMP, SUNSHINE, SEQUENCE, "extra"]
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(normalize_yearly_weather(&[], DEFAULT_DISTRICT).unwrap().height(), 0);
}
