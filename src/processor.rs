//! Pipeline orchestration.
//!
//! The preprocess stage loads the raw exports, normalizes each dataset and
//! writes the cleaned tables. The chart stage reads the cleaned tables back,
//! builds every chart payload and writes one JSON file per chart. Each stage
//! finishes by writing a run report next to its outputs.

use crate::app::models::{Chart, DatasetReport, RawRecord};
use crate::app::services::chart_builder::{
    GridChartOptions, build_air_quality_charts, build_forecast_charts, build_grid_charts,
    build_yearly_charts,
};
use crate::app::services::json_writer::{
    build_report, read_table, write_chart, write_report, write_table,
};
use crate::app::services::normalizer::{
    combine_grid_files, normalize_air_quality, normalize_extended_forecast,
    normalize_yearly_weather,
};
use crate::app::services::record_loader::{list_files, load_records};
use crate::app::services::reshaper::wide_to_long;
use crate::config::PipelineConfig;
use crate::constants::grid::{LONG_ID_FIELDS, NON_METRIC_FIELDS};
use crate::constants::{PREPROCESSING_REPORT_FILE, PROCESSING_REPORT_FILE, datasets, raw_files};
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cleaned tables written by the preprocess stage
const CLEANED_DATASET_COUNT: u64 = 5;

/// What one stage wrote
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub datasets: Vec<DatasetReport>,
    pub report_path: PathBuf,
}

/// Outcome of a full run, preprocess followed by charts
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub preprocessing: StageOutcome,
    pub processing: StageOutcome,
}

/// Runs the pipeline stages against the configured directories
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Normalize every raw export into `cleaned_dir`
    ///
    /// A missing single-file export is fatal; an absent set of grid files
    /// yields empty grid tables.
    pub fn preprocess(&self) -> Result<StageOutcome> {
        let start_time = Instant::now();
        let cleaned_dir = &self.config.cleaned_dir;
        info!(
            "Preprocessing raw exports from {}",
            self.config.raw_dir.display()
        );

        let progress = self.progress_bar(CLEANED_DATASET_COUNT, "Preprocessing");
        let mut reports = Vec::new();

        progress.set_message(datasets::YEARLY_WEATHER);
        let records = self.load_raw(raw_files::YEARLY_WEATHER)?;
        let table = normalize_yearly_weather(&records, &self.config.district_label)?;
        reports.push(write_cleaned(cleaned_dir, datasets::YEARLY_WEATHER, records.len(), &table)?);
        progress.inc(1);

        progress.set_message(datasets::AIR_QUALITY);
        let records = self.load_raw(raw_files::AIR_QUALITY)?;
        let table = normalize_air_quality(&records)?;
        reports.push(write_cleaned(cleaned_dir, datasets::AIR_QUALITY, records.len(), &table)?);
        progress.inc(1);

        progress.set_message(datasets::EXTENDED_FORECAST);
        let records = self.load_raw(raw_files::EXTENDED_FORECAST)?;
        let table = normalize_extended_forecast(&records)?;
        reports.push(write_cleaned(
            cleaned_dir,
            datasets::EXTENDED_FORECAST,
            records.len(),
            &table,
        )?);
        progress.inc(1);

        progress.set_message("grid history");
        let batches = self.load_grid_batches()?;
        let rows_in: usize = batches.iter().map(|(_, records)| records.len()).sum();
        let wide = combine_grid_files(&batches)?;
        let long = wide_to_long(&wide, LONG_ID_FIELDS, NON_METRIC_FIELDS)?;
        reports.push(write_cleaned(cleaned_dir, datasets::GRID_HISTORY_WIDE, rows_in, &wide)?);
        progress.inc(1);
        reports.push(write_cleaned(cleaned_dir, datasets::GRID_HISTORY_LONG, rows_in, &long)?);
        progress.inc(1);
        progress.finish_and_clear();

        let report = build_report(reports);
        let report_path = write_report(&report, cleaned_dir, PREPROCESSING_REPORT_FILE)?;
        info!(
            "Preprocessing finished in {:.2?}, report at {}",
            start_time.elapsed(),
            report_path.display()
        );

        Ok(StageOutcome {
            datasets: report.datasets,
            report_path,
        })
    }

    /// Build every chart payload from the cleaned tables into `processed_dir`
    ///
    /// Cleaned files that do not exist read as empty tables, whose charts
    /// are skipped.
    pub fn build_charts(&self) -> Result<StageOutcome> {
        let start_time = Instant::now();
        let cleaned_dir = &self.config.cleaned_dir;
        let processed_dir = &self.config.processed_dir;
        info!("Building charts from {}", cleaned_dir.display());

        let yearly = load_cleaned(cleaned_dir, datasets::YEARLY_WEATHER)?;
        let air_quality = load_cleaned(cleaned_dir, datasets::AIR_QUALITY)?;
        let forecast = load_cleaned(cleaned_dir, datasets::EXTENDED_FORECAST)?;
        let grid_wide = load_cleaned(cleaned_dir, datasets::GRID_HISTORY_WIDE)?;
        let grid_long = load_cleaned(cleaned_dir, datasets::GRID_HISTORY_LONG)?;

        let options = GridChartOptions {
            top_metrics: self.config.top_metrics,
            top_stations: self.config.top_stations,
        };
        let mut charts: Vec<Chart> = build_yearly_charts(&yearly)?;
        charts.extend(build_air_quality_charts(&air_quality)?);
        charts.extend(build_forecast_charts(&forecast)?);
        charts.extend(build_grid_charts(&grid_wide, &grid_long, options)?);

        let progress = self.progress_bar(charts.len() as u64, "Writing charts");
        let mut reports = Vec::with_capacity(charts.len());
        for chart in &charts {
            progress.set_message(chart.name.clone());
            let path = write_chart(chart, processed_dir)?;

            let mut report = DatasetReport::new(&chart.name, chart.rows_in, chart.rows_out);
            report.json_path = path.display().to_string();
            reports.push(report);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let report = build_report(reports);
        let report_path = write_report(&report, processed_dir, PROCESSING_REPORT_FILE)?;
        info!(
            "Wrote {} charts in {:.2?}, report at {}",
            report.datasets.len(),
            start_time.elapsed(),
            report_path.display()
        );

        Ok(StageOutcome {
            datasets: report.datasets,
            report_path,
        })
    }

    /// Preprocess, then build charts
    pub fn run(&self) -> Result<RunOutcome> {
        let preprocessing = self.preprocess()?;
        let processing = self.build_charts()?;
        Ok(RunOutcome {
            preprocessing,
            processing,
        })
    }

    fn load_raw(&self, file_name: &str) -> Result<Vec<RawRecord>> {
        load_records(&self.config.raw_dir.join(file_name))
    }

    fn load_grid_batches(&self) -> Result<Vec<(String, Vec<RawRecord>)>> {
        let files = list_files(&self.config.raw_dir, raw_files::GRID_HISTORY_GLOB)?;
        debug!("Found {} grid history exports", files.len());
        if files.is_empty() {
            warn!(
                "No grid history exports in {}",
                self.config.raw_dir.display()
            );
        }

        files
            .iter()
            .map(|path| {
                let records = load_records(path)?;
                let source_file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok((source_file, records))
            })
            .collect()
    }

    fn progress_bar(&self, total: u64, message: &'static str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message(message);
        pb
    }
}

fn write_cleaned(
    dir: &Path,
    dataset: &str,
    rows_in: usize,
    table: &DataFrame,
) -> Result<DatasetReport> {
    if table.height() == 0 {
        warn!("{} has no rows after normalization", dataset);
    }

    let path = write_table(table, dir, dataset)?;
    info!("{}: {} rows in, {} rows out", dataset, rows_in, table.height());

    let mut report = DatasetReport::new(dataset, rows_in, table.height());
    report.json_path = path.display().to_string();
    Ok(report)
}

fn load_cleaned(dir: &Path, dataset: &str) -> Result<DataFrame> {
    let table = read_table(dir, dataset)?;
    if table.height() == 0 {
        warn!("No cleaned rows for {}, its charts are skipped", dataset);
    }
    Ok(table)
}
