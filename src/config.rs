//! Configuration management and validation.
//!
//! Settings are resolved in layers: built-in defaults, then an optional JSON
//! config file, then environment variables. Command-line overrides are
//! applied on top by the CLI before [`PipelineConfig::validate`] runs.

use crate::constants::charts::{DEFAULT_TOP_METRICS, DEFAULT_TOP_STATIONS};
use crate::constants::yearly::DEFAULT_DISTRICT;
use crate::constants::{DEFAULT_CLEANED_DIR, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR, env_vars};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR_NAME: &str = "dpv-cqw";
const CONFIG_FILE_NAME: &str = "config.json";

/// Pipeline settings shared by the preprocess and chart stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the raw JSON exports
    pub raw_dir: PathBuf,

    /// Output directory for normalized datasets
    pub cleaned_dir: PathBuf,

    /// Output directory for chart payloads
    pub processed_dir: PathBuf,

    /// Label written into the yearly weather `district` column
    pub district_label: String,

    pub show_progress: bool,

    /// Number of metrics plotted by the grid trend chart
    pub top_metrics: usize,

    /// Number of stations listed by the grid station overview
    pub top_stations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            cleaned_dir: PathBuf::from(DEFAULT_CLEANED_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            district_label: DEFAULT_DISTRICT.to_string(),
            show_progress: true,
            top_metrics: DEFAULT_TOP_METRICS,
            top_stations: DEFAULT_TOP_STATIONS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = dir.into();
        self
    }

    pub fn with_cleaned_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cleaned_dir = dir.into();
        self
    }

    pub fn with_processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = dir.into();
        self
    }

    pub fn with_district_label(mut self, label: impl Into<String>) -> Self {
        self.district_label = label.into();
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn with_top_metrics(mut self, count: usize) -> Self {
        self.top_metrics = count;
        self
    }

    pub fn with_top_stations(mut self, count: usize) -> Self {
        self.top_stations = count;
        self
    }

    /// Default config file location, `<config dir>/dpv-cqw/config.json`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| PipelineError::configuration("Could not determine config directory"))
    }

    /// Read settings from a JSON file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| PipelineError::invalid_source(path, e))
    }

    /// Apply directory overrides found through `lookup`
    ///
    /// Blank values are ignored. The lookup is usually `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (env_vars::RAW_DIR, &mut self.raw_dir),
            (env_vars::CLEANED_DIR, &mut self.cleaned_dir),
            (env_vars::PROCESSED_DIR, &mut self.processed_dir),
        ];

        for (name, target) in targets {
            if let Some(value) = lookup(name).filter(|value| !value.trim().is_empty()) {
                debug!("{} overrides {} with {}", name, target.display(), value);
                *target = PathBuf::from(value);
            }
        }
    }

    /// Defaults, then the config file if given, then the environment
    pub fn load_layered<F>(config_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        Ok(config)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        let directories = [
            ("raw_dir", &self.raw_dir),
            ("cleaned_dir", &self.cleaned_dir),
            ("processed_dir", &self.processed_dir),
        ];
        for (name, dir) in directories {
            if dir.as_os_str().is_empty() {
                return Err(PipelineError::configuration(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        if self.top_metrics == 0 {
            return Err(PipelineError::configuration(
                "top_metrics must be greater than 0",
            ));
        }

        if self.top_stations == 0 {
            return Err(PipelineError::configuration(
                "top_stations must be greater than 0",
            ));
        }

        Ok(())
    }
}
