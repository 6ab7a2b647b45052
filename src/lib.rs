//! DPV-CQW Pipeline Library
//!
//! Turns the meteorological and air-quality JSON exports of the DPV-CQW
//! dashboard into normalized tables and chart-ready payloads.
//!
//! This library provides tools for:
//! - Loading raw exports and stripping their field-name legend rows
//! - Parsing ambiguous period encodings (month numbers, Excel serials, Chinese dates)
//! - Normalizing each dataset into a polars frame with deterministic sort and dedup rules
//! - Reshaping the wide grid monitoring table into (metric, value) rows
//! - Aggregating cleaned tables into chart payloads
//! - Writing cleaned tables, charts and run reports as JSON

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod chart_builder;
        pub mod frame_conversion;
        pub mod json_writer;
        pub mod normalizer;
        pub mod period_parser;
        pub mod record_loader;
        pub mod reshaper;
    }
}

pub mod cli;
pub mod processor;

// Re-export commonly used types
pub use app::models::{Chart, ChartPayload, DatasetReport, Period, RawRecord};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use processor::Pipeline;
