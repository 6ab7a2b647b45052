//! Chart payloads consumed by the dashboard
//!
//! Every payload is built once by the chart builder, serialized to indented
//! JSON and discarded. Series payloads keep one value per x-axis label, with
//! `null` standing in for missing values.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisLabel {
    Number(i64),
    Text(String),
}

/// Named series in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSeries(Vec<(String, Vec<Option<f64>>)>);

impl NamedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.0.push((name.into(), values));
    }
}

#[cfg(test)]
impl NamedSeries {
    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for NamedSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPayload {
    #[serde(rename = "xAxis")]
    pub x_axis: Vec<AxisLabel>,
    pub series: NamedSeries,
}

#[cfg(test)]
impl SeriesPayload {
    /// Whether every series has exactly one value per x-axis label
    pub fn is_aligned(&self) -> bool {
        self.series
            .0
            .iter()
            .all(|(_, values)| values.len() == self.x_axis.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeItem {
    pub metric: String,
    pub max_year: i64,
    pub max_value: f64,
    pub min_year: i64,
    pub min_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStats {
    pub metric: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationRecords {
    pub sp_id: i64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartItem {
    Extreme(ExtremeItem),
    Tag(TagCount),
    Metric(MetricStats),
    Station(StationRecords),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsPayload {
    pub items: Vec<ChartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixPayload {
    pub metrics: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

/// Data-quality counters for the air-quality review panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualitySummary {
    pub rows: usize,
    pub invalid_month_rows: usize,
    pub total_gt_31_rows: usize,
    pub missing_exceed_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPayload {
    Series(SeriesPayload),
    Items(ItemsPayload),
    Matrix(MatrixPayload),
    Quality(QualitySummary),
}

/// A named payload together with its row-count metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub name: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub payload: ChartPayload,
}

impl Chart {
    pub fn new(name: &str, rows_in: usize, rows_out: usize, payload: ChartPayload) -> Self {
        Self {
            name: name.to_string(),
            rows_in,
            rows_out,
            payload,
        }
    }
}

#[cfg(test)]
impl Chart {
    pub fn as_series(&self) -> Option<&SeriesPayload> {
        match &self.payload {
            ChartPayload::Series(series) => Some(series),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[ChartItem]> {
        match &self.payload {
            ChartPayload::Items(items) => Some(&items.items),
            _ => None,
        }
    }
}
