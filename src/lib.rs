//! Exploratory analysis of marketing campaign tables.
//!
//! The analysis routines are pure functions over a polars [`DataFrame`](polars::prelude::DataFrame):
//! [`classify`](classify::classify), [`describe`](statistics::describe),
//! [`categorical_summary`](categorical::categorical_summary), [`crosstab`](categorical::crosstab)
//! and [`acceptance_rate_by_group`](rates::acceptance_rate_by_group), plus the overview and
//! distribution helpers used by the report. None of them mutate the table.

pub mod categorical;
pub mod chart_export;
pub mod classify;
pub mod config;
pub mod error;
pub mod error_display;
pub mod loader;
pub mod overview;
pub mod rates;
pub mod report;
pub mod session;
pub mod statistics;

pub use campaign_eda_cli::{Args, Command, CompressionFormat, CorrelationMethod, OutputFormat};
pub use categorical::{
    categorical_summary, crosstab, CrossTab, CrossTabCells, FrequencyRow, FrequencyTable,
    MISSING_LABEL,
};
pub use classify::{classify, ColumnClasses};
pub use config::{AppConfig, ConfigManager};
pub use error::{EdaError, EdaResult};
pub use loader::{load_delimited, parse_delimited, LoadOptions};
pub use overview::{dataset_info, missing_values, null_counts, sample_rows, DatasetInfo, NullReport};
pub use rates::{acceptance_rate_by_group, GroupRate, RateTable, POSITIVE_LABEL, TARGET_DEFAULT};
pub use report::{run_report, Report, ReportSettings, SectionOutput};
pub use session::Session;
pub use statistics::{
    box_stats_by_category, correlation_matrix, describe, histogram, BoxPlotSummary, BoxStats,
    CorrelationMatrix, DescribeTable, Histogram, NumericSummary,
};

/// Application name used for the config directory
pub const APP_NAME: &str = "campaign-eda";
