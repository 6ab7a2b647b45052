//! Application constants for the DPV-CQW pipeline
//!
//! Dataset names, raw export file names, field names and the fixed
//! vocabularies used by the normalizers and chart builders.

/// Project name written into run reports
pub const PROJECT_NAME: &str = "DPV-CQW";

/// Prefix shared by every value of the synthetic field-name legend row
pub const LEGEND_PREFIX: &str = "字段中文名";

// =============================================================================
// Directories and Report Files
// =============================================================================

pub const DEFAULT_RAW_DIR: &str = "data";
pub const DEFAULT_CLEANED_DIR: &str = "data_cleaned";
pub const DEFAULT_PROCESSED_DIR: &str = "data_processed";

pub const PREPROCESSING_REPORT_FILE: &str = "preprocessing_report.json";
pub const PROCESSING_REPORT_FILE: &str = "processing_report.json";

/// Environment variables consulted by the layered configuration
pub mod env_vars {
    pub const RAW_DIR: &str = "DPV_CQW_RAW_DIR";
    pub const CLEANED_DIR: &str = "DPV_CQW_CLEANED_DIR";
    pub const PROCESSED_DIR: &str = "DPV_CQW_PROCESSED_DIR";
}

// =============================================================================
// Datasets
// =============================================================================

pub mod datasets {
    pub const YEARLY_WEATHER: &str = "beibei_yearly_weather";
    pub const AIR_QUALITY: &str = "air_quality_good_days";
    pub const EXTENDED_FORECAST: &str = "extended_forecast";
    pub const GRID_HISTORY_WIDE: &str = "grid_history_wide";
    pub const GRID_HISTORY_LONG: &str = "grid_history_long";
}

/// Raw export file names as delivered by the data portal
pub mod raw_files {
    pub const YEARLY_WEATHER: &str = "北碚区主要年份气象基本情况信息(1).json";
    pub const AIR_QUALITY: &str = "空气优良天数(1).json";
    pub const EXTENDED_FORECAST: &str = "延伸期预报气象服务(1).json";
    /// Grid history is split over several numbered exports
    pub const GRID_HISTORY_GLOB: &str = "大气网格化监测历史数据信息(*).json";
}

// =============================================================================
// Field Names
// =============================================================================

/// Air-quality good-days export
pub mod air_quality {
    pub const PERIOD: &str = "yf";
    pub const PERIOD_RAW: &str = "yf_raw";
    pub const GOOD_DAYS: &str = "youdetianshu";
    pub const MODERATE_DAYS: &str = "liangdetianshu";
    pub const EXCEED_DAYS: &str = "chaobiaotianshu";

    pub const PERIOD_TYPE: &str = "period_type";
    pub const PERIOD_DATE: &str = "period_date";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const TOTAL_DAYS: &str = "total_days";
    pub const TOTAL_GT_31: &str = "is_total_gt_31";

    pub const COUNT_FIELDS: &[&str] = &[GOOD_DAYS, MODERATE_DAYS, EXCEED_DAYS];
}

/// Beibei district yearly weather summary
pub mod yearly {
    pub const SEQUENCE: &str = "xh";
    pub const YEAR: &str = "nf";
    pub const RAINFALL: &str = "jsl";
    pub const WIND_SPEED: &str = "pjfs";
    pub const AVG_TEMP: &str = "pjqw";
    pub const FROST_FREE_DAYS: &str = "wsq";
    pub const PRESSURE: &str = "pjqy";
    pub const HUMIDITY: &str = "pjxdsd";
    pub const SUNSHINE: &str = "rzss";
    pub const DISTRICT: &str = "district";

    pub const DEFAULT_DISTRICT: &str = "北碚区";

    pub const NUMERIC_FIELDS: &[&str] = &[
        SEQUENCE,
        YEAR,
        RAINFALL,
        WIND_SPEED,
        AVG_TEMP,
        FROST_FREE_DAYS,
        PRESSURE,
        HUMIDITY,
        SUNSHINE,
    ];
    pub const INTEGER_FIELDS: &[&str] = &[SEQUENCE, YEAR, FROST_FREE_DAYS, HUMIDITY];

    /// Columns entering the correlation heatmap
    pub const CORRELATION_FIELDS: &[&str] = &[
        AVG_TEMP,
        RAINFALL,
        HUMIDITY,
        PRESSURE,
        WIND_SPEED,
        SUNSHINE,
        FROST_FREE_DAYS,
    ];

    /// Columns reported in the extreme-years chart
    pub const EXTREME_FIELDS: &[&str] = &[AVG_TEMP, RAINFALL, SUNSHINE, HUMIDITY];
}

/// Extended-range forecast bulletins
pub mod forecast {
    pub const PUBLISH_TEXT: &str = "fbsj";
    pub const TREND_TEXT: &str = "tqqs";
    pub const PROCESS_TEXT: &str = "zytqgc";
    pub const TEXT_FIELDS: &[&str] = &[PUBLISH_TEXT, TREND_TEXT, PROCESS_TEXT];

    pub const FORECAST_ID: &str = "forecast_id";
    pub const PUBLISH_DATE: &str = "publish_date";
    pub const TEMP_MIN: &str = "temp_min";
    pub const TEMP_MAX: &str = "temp_max";
    pub const RAIN_MIN: &str = "rain_min_mm";
    pub const RAIN_MAX: &str = "rain_max_mm";

    pub const TEMP_KEYWORD: &str = "平均气温";
    pub const RAIN_KEYWORD: &str = "降水量";

    /// Weather process tags counted in the event chart
    pub const WEATHER_TAGS: &[&str] = &[
        "小雨", "中雨", "大雨", "暴雨", "降温", "高温", "雨夹雪", "小雪",
    ];
}

/// Atmospheric grid monitoring history
pub mod grid {
    pub const RECV_TIME: &str = "recv_time";
    pub const TIMESTAMP: &str = "timestamp";
    pub const STATION_ID: &str = "sp_id";
    pub const ID: &str = "id";
    pub const SOURCE_FILE: &str = "source_file";

    /// Textual timestamp layout, e.g. `Mon Jan 06 08:00:00 CST 2025`
    pub const RECV_TIME_FORMAT: &str = "%a %b %d %H:%M:%S CST %Y";

    pub const SORT_FIELDS: &[&str] = &[STATION_ID, TIMESTAMP, ID];

    /// Identifying columns kept on every long-table row, when present
    pub const LONG_ID_FIELDS: &[&str] = &[SOURCE_FILE, TIMESTAMP, RECV_TIME, STATION_ID, ID];
    /// Numeric keys that are never treated as metrics
    pub const NON_METRIC_FIELDS: &[&str] = &[ID, STATION_ID];

    pub const METRIC: &str = "metric";
    pub const VALUE: &str = "value";
}

// =============================================================================
// Chart Output
// =============================================================================

pub mod charts {
    pub const AIR_QUALITY_MONTHLY: &str = "chart_air_quality_monthly";
    pub const AIR_QUALITY_TIMELINE: &str = "chart_air_quality_timeline";
    pub const AIR_QUALITY_QUALITY: &str = "chart_air_quality_quality";
    pub const YEARLY_TRENDS: &str = "chart_yearly_trends";
    pub const CORRELATION_MATRIX: &str = "chart_correlation_matrix";
    pub const YEARLY_EXTREMES: &str = "chart_yearly_extremes";
    pub const FORECAST_TIMELINE: &str = "chart_forecast_timeline";
    pub const FORECAST_EVENT_TAGS: &str = "chart_forecast_event_tags";
    pub const GRID_METRIC_STATS: &str = "chart_grid_metric_stats";
    pub const GRID_METRIC_TRENDS: &str = "chart_grid_metric_trends";
    pub const GRID_STATION_OVERVIEW: &str = "chart_grid_station_overview";

    /// Decimal places per payload family
    pub const AIR_QUALITY_PRECISION: u32 = 4;
    pub const YEARLY_PRECISION: u32 = 3;
    pub const CORRELATION_PRECISION: u32 = 4;
    pub const FORECAST_PRECISION: u32 = 3;
    pub const GRID_PRECISION: u32 = 4;

    pub const DEFAULT_TOP_METRICS: usize = 5;
    pub const DEFAULT_TOP_STATIONS: usize = 20;
}
