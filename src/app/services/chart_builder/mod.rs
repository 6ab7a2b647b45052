//! Chart payload builders
//!
//! Each builder takes a cleaned table as read back from disk and emits the
//! payloads the dashboard consumes. Builders re-coerce numbers and re-parse
//! ISO dates themselves, so they only depend on column names. An empty
//! source table produces no charts.

pub mod aggregate;
pub mod air_quality;
pub mod forecast;
pub mod grid;
pub mod yearly;

#[cfg(test)]
mod tests;

pub use air_quality::build_air_quality_charts;
pub use forecast::build_forecast_charts;
pub use grid::{build_grid_charts, GridChartOptions};
pub use yearly::build_yearly_charts;
