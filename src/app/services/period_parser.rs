//! Period and date-text parsing
//!
//! Period fields in the air-quality export mix three encodings: bare month
//! numbers, Excel serial dates and free Chinese date text. [`parse_period`]
//! resolves them with a fixed-priority chain of readers, each of which either
//! yields a value or declines. Nothing here fails; unreadable input is
//! [`Period::Unknown`].

use crate::app::models::Period;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Accepted Excel serial range (roughly 1954 through 2146)
pub const EXCEL_SERIAL_MIN: i64 = 20_000;
pub const EXCEL_SERIAL_MAX: i64 = 90_000;

static CHINESE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").expect("valid date regex")
});

static SEPARATED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[./-](\d{1,2})[./-](\d{1,2})").expect("valid date regex")
});

/// Layouts tried by the generic fallback, full-string matches only
const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d/%m/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
];
/// Year-month layouts, resolved to the first of the month
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%Y.%m"];

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Resolve one raw period value, missing values being unknown
pub fn parse_period(value: Option<&str>) -> Period {
    value.map_or(Period::Unknown, parse_period_text)
}

/// Resolve a period from its textual form
pub fn parse_period_text(raw: &str) -> Period {
    let raw = raw.trim();
    if raw.is_empty() {
        return Period::Unknown;
    }

    month_number(raw)
        .map(Period::Month)
        .or_else(|| excel_serial_text(raw).map(Period::Date))
        .or_else(|| parse_chinese_date_text(raw).map(Period::Date))
        .unwrap_or(Period::Unknown)
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn month_number(text: &str) -> Option<u32> {
    if !is_all_digits(text) {
        return None;
    }
    text.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

fn excel_serial_text(text: &str) -> Option<NaiveDate> {
    if !is_all_digits(text) {
        return None;
    }
    text.parse::<i64>().ok().and_then(excel_serial_to_date)
}

/// Decode an Excel (1900 system) serial day number
pub fn excel_serial_to_date(serial: i64) -> Option<NaiveDate> {
    if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial))
}

/// Extract the first date from free text
///
/// Tries `YYYY年MM月DD日`, then `YYYY.MM.DD` with `.`, `-` or `/`
/// separators, anywhere in the text. Only the first matching pattern is
/// used; when no pattern matches, or the match is an impossible calendar
/// date, the generic parse of the whole trimmed text decides.
pub fn parse_chinese_date_text(text: &str) -> Option<NaiveDate> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }

    [&*CHINESE_DATE, &*SEPARATED_DATE]
        .iter()
        .find_map(|pattern| pattern.captures(raw))
        .and_then(|caps| {
            let year = caps[1].parse::<i32>().ok();
            let month = caps[2].parse::<u32>().ok();
            let day = caps[3].parse::<u32>().ok();
            match (year, month, day) {
                (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
                _ => None,
            }
        })
        .or_else(|| parse_generic_date(raw))
}

/// Best-effort parse of common date and datetime layouts
pub fn parse_generic_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            GENERIC_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        })
        .or_else(|| {
            YEAR_MONTH_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(&format!("{text} 1"), &format!("{format} %d")).ok()
            })
        })
        .or_else(|| year_only(text))
        .or_else(|| chrono::DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// A bare four-digit year reads as January 1st
fn year_only(text: &str) -> Option<NaiveDate> {
    if text.len() != 4 || !is_all_digits(text) {
        return None;
    }
    text.parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}
