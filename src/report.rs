//! Runs report sections against a table and renders them as text tables or JSON.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::categorical::{categorical_summary, crosstab, text_values, CrossTab, FrequencyTable};
use crate::chart_export::{
    write_bar_chart_png, write_box_plot_png, write_heatmap_png, write_histogram_png, BarChartData,
    ChartStyle,
};
use crate::classify::{classify, ColumnClasses};
use crate::config::AppConfig;
use crate::error::{EdaError, EdaResult};
use crate::error_display::user_message;
use crate::overview::{dataset_info, missing_values, sample_rows, DatasetInfo, NullReport};
use crate::rates::{acceptance_rate_by_group, default_target, RateTable};
use crate::statistics::{
    box_stats_by_category, correlation_matrix, describe, histogram, BoxPlotSummary,
    CorrelationMatrix, DescribeTable, Histogram,
};
use crate::{Args, Command, CorrelationMethod, OutputFormat};

/// Parameters shared by every section, resolved from CLI flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub format: OutputFormat,
    /// Target given on the command line; used as-is even when absent from the table.
    pub target_override: Option<String>,
    /// Configured target, used when the table has it.
    pub target_column: String,
    pub top_n: usize,
    pub bins: usize,
    pub sample_rows: usize,
    pub sample_seed: u64,
    pub correlation_method: CorrelationMethod,
    pub normalize_crosstab: bool,
    pub max_table_rows: usize,
    pub chart: Option<PathBuf>,
    pub chart_style: ChartStyle,
}

impl Default for ReportSettings {
    fn default() -> Self {
        let analysis = crate::config::AnalysisConfig::default();
        Self {
            format: OutputFormat::default(),
            target_override: None,
            target_column: analysis.target_column,
            top_n: analysis.top_n,
            bins: analysis.bins,
            sample_rows: analysis.sample_rows,
            sample_seed: analysis.sample_seed,
            correlation_method: CorrelationMethod::default(),
            normalize_crosstab: analysis.normalize_crosstab,
            max_table_rows: crate::config::OutputConfig::default().max_table_rows,
            chart: None,
            chart_style: ChartStyle::default(),
        }
    }
}

impl ReportSettings {
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Result<Self> {
        let analysis = &config.analysis;
        Ok(Self {
            format: match args.format {
                Some(format) => format,
                None => config.output_format()?,
            },
            target_override: args.target.clone(),
            target_column: analysis.target_column.clone(),
            top_n: analysis.top_n,
            bins: analysis.bins,
            sample_rows: analysis.sample_rows,
            sample_seed: analysis.sample_seed,
            correlation_method: config.correlation_method()?,
            normalize_crosstab: analysis.normalize_crosstab,
            max_table_rows: config.output.max_table_rows,
            chart: args.chart.clone(),
            chart_style: ChartStyle::from_config(&config.charts)?,
        })
    }

    /// Target column for `df`: CLI override, then configured name if present, then the default rule.
    pub fn resolve_target(&self, df: &DataFrame) -> Option<String> {
        if let Some(target) = &self.target_override {
            return Some(target.clone());
        }
        if df.column(&self.target_column).is_ok() {
            return Some(self.target_column.clone());
        }
        default_target(df)
    }
}

/// Every section of the full report, with default parameters.
pub fn full_report_commands() -> Vec<Command> {
    vec![
        Command::Info,
        Command::Classify,
        Command::Describe,
        Command::Missing,
        Command::Histogram {
            column: None,
            bins: None,
        },
        Command::Categorical {
            column: None,
            top_n: None,
        },
        Command::Boxplot {
            numeric: None,
            category: None,
        },
        Command::Crosstab {
            col_a: None,
            col_b: None,
            no_normalize: false,
        },
        Command::Correlation { method: None },
        Command::Rates {
            group: None,
            top_n: None,
        },
        Command::Sample {
            rows: None,
            seed: None,
        },
    ]
}

pub fn section_name(command: &Command) -> &'static str {
    match command {
        Command::Info => "info",
        Command::Classify => "classify",
        Command::Describe => "describe",
        Command::Missing => "missing",
        Command::Histogram { .. } => "histogram",
        Command::Categorical { .. } => "categorical",
        Command::Boxplot { .. } => "boxplot",
        Command::Crosstab { .. } => "crosstab",
        Command::Correlation { .. } => "correlation",
        Command::Rates { .. } => "rates",
        Command::Sample { .. } => "sample",
    }
}

/// Sampled rows; the frame is rendered as a table, the text cells as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SampleTable {
    #[serde(skip)]
    pub frame: DataFrame,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SampleTable {
    pub fn from_dataframe(frame: DataFrame) -> EdaResult<Self> {
        let columns: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let cells: Vec<Vec<Option<String>>> = frame
            .get_columns()
            .iter()
            .map(|c| text_values(c.as_materialized_series()))
            .collect::<EdaResult<_>>()?;
        let rows = (0..frame.height())
            .map(|i| cells.iter().map(|col| col[i].clone()).collect())
            .collect();
        Ok(Self {
            frame,
            columns,
            rows,
        })
    }
}

/// The typed result of one section.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SectionOutput {
    Info(DatasetInfo),
    Classify(ColumnClasses),
    Describe(DescribeTable),
    Missing(NullReport),
    Histogram(Histogram),
    Categorical(FrequencyTable),
    Boxplot(BoxPlotSummary),
    Crosstab(CrossTab),
    Correlation(CorrelationMatrix),
    Rates(RateTable),
    Sample(SampleTable),
}

fn first_numeric(classes: &ColumnClasses) -> EdaResult<String> {
    classes.require_numeric(1)?;
    Ok(classes.numeric[0].clone())
}

/// First categorical column not listed in `exclude`.
fn pick_categorical(classes: &ColumnClasses, exclude: &[&str]) -> EdaResult<String> {
    let candidates: Vec<&String> = classes
        .categorical
        .iter()
        .filter(|c| !exclude.contains(&c.as_str()))
        .collect();
    candidates
        .first()
        .map(|c| c.to_string())
        .ok_or(EdaError::EmptyCategoricalSet {
            required: exclude.len() + 1,
            found: classes.categorical.len(),
        })
}

/// Compute one section, filling unspecified columns and parameters with defaults.
pub fn run_section(
    df: &DataFrame,
    command: &Command,
    settings: &ReportSettings,
) -> EdaResult<SectionOutput> {
    let classes = classify(df);
    let output = match command {
        Command::Info => SectionOutput::Info(dataset_info(df)),
        Command::Classify => SectionOutput::Classify(classes),
        Command::Describe => SectionOutput::Describe(describe(df)?),
        Command::Missing => SectionOutput::Missing(missing_values(df)),
        Command::Histogram { column, bins } => {
            let column = match column {
                Some(c) => c.clone(),
                None => first_numeric(&classes)?,
            };
            SectionOutput::Histogram(histogram(df, &column, bins.unwrap_or(settings.bins))?)
        }
        Command::Categorical { column, top_n } => {
            let column = match column {
                Some(c) => c.clone(),
                None => pick_categorical(&classes, &[])?,
            };
            let table = categorical_summary(df, &column)?;
            SectionOutput::Categorical(table.head(top_n.unwrap_or(settings.top_n)))
        }
        Command::Boxplot { numeric, category } => {
            let numeric = match numeric {
                Some(c) => c.clone(),
                None => first_numeric(&classes)?,
            };
            let category = match category {
                Some(c) => c.clone(),
                None => pick_categorical(&classes, &[])?,
            };
            SectionOutput::Boxplot(box_stats_by_category(df, &numeric, &category)?)
        }
        Command::Crosstab {
            col_a,
            col_b,
            no_normalize,
        } => {
            let col_a = match col_a {
                Some(c) => c.clone(),
                None => pick_categorical(&classes, &[])?,
            };
            let col_b = match col_b {
                Some(c) => c.clone(),
                None => pick_categorical(&classes, &[col_a.as_str()])?,
            };
            let normalize = settings.normalize_crosstab && !no_normalize;
            SectionOutput::Crosstab(crosstab(df, &col_a, &col_b, normalize)?)
        }
        Command::Correlation { method } => SectionOutput::Correlation(correlation_matrix(
            df,
            method.unwrap_or(settings.correlation_method),
        )?),
        Command::Rates { group, top_n } => {
            let target = settings.resolve_target(df).ok_or_else(|| EdaError::InvalidColumn {
                column: settings.target_column.clone(),
                reason: "table has no columns".to_string(),
            })?;
            let group = match group {
                Some(g) => g.clone(),
                None => pick_categorical(&classes, &[target.as_str()])?,
            };
            let rates = acceptance_rate_by_group(df, &group, &target)?;
            SectionOutput::Rates(rates.head(top_n.unwrap_or(settings.top_n)))
        }
        Command::Sample { rows, seed } => {
            let frame = sample_rows(
                df,
                rows.unwrap_or(settings.sample_rows),
                seed.unwrap_or(settings.sample_seed),
            )?;
            SectionOutput::Sample(SampleTable::from_dataframe(frame)?)
        }
    };
    Ok(output)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionOutcome {
    Output(SectionOutput),
    /// Nothing to show for this table (warning).
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionResult {
    pub section: &'static str,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub sections: Vec<SectionResult>,
}

/// Run each command in turn; a failing section is recorded and the rest still run.
pub fn run_report(df: &DataFrame, commands: &[Command], settings: &ReportSettings) -> Report {
    let mut report = Report::default();
    for command in commands {
        let section = section_name(command);
        let start = Instant::now();
        let outcome = match run_section(df, command, settings) {
            Ok(output) => SectionOutcome::Output(output),
            Err(e) if e.is_warning() => {
                log::warn!("{} skipped: {}", section, e);
                SectionOutcome::Skipped {
                    reason: user_message(&e),
                }
            }
            Err(e) => {
                log::error!("{} failed: {}", section, e);
                SectionOutcome::Failed {
                    error: user_message(&e),
                }
            }
        };
        log::debug!("section {} finished in {:?}", section, start.elapsed());
        report.sections.push(SectionResult { section, outcome });
    }
    report
}

impl Report {
    pub fn failures(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s.outcome, SectionOutcome::Failed { .. }))
            .count()
    }

    pub fn render(&self, settings: &ReportSettings) -> Result<String> {
        match settings.format {
            OutputFormat::Json => {
                if let [only] = self.sections.as_slice() {
                    Ok(serde_json::to_string_pretty(only)?)
                } else {
                    Ok(serde_json::to_string_pretty(self)?)
                }
            }
            OutputFormat::Table => {
                let mut out = String::new();
                for (i, result) in self.sections.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    render_section_text(result, settings.max_table_rows, &mut out)?;
                }
                Ok(out)
            }
        }
    }
}

fn section_title(output: &SectionOutput) -> String {
    match output {
        SectionOutput::Info(_) => "Dataset info".to_string(),
        SectionOutput::Classify(_) => "Column classes".to_string(),
        SectionOutput::Describe(_) => "Descriptive statistics".to_string(),
        SectionOutput::Missing(_) => "Missing values".to_string(),
        SectionOutput::Histogram(h) => format!("Histogram of {}", h.column),
        SectionOutput::Categorical(t) => {
            format!("Frequencies of {} ({} rows)", t.column, t.total_rows)
        }
        SectionOutput::Boxplot(b) => format!("{} by {}", b.numeric_column, b.category_column),
        SectionOutput::Crosstab(c) => format!(
            "Crosstab {} x {}{}",
            c.row_column,
            c.col_column,
            if c.is_normalized() { " (row proportions)" } else { "" }
        ),
        SectionOutput::Correlation(m) => format!("Correlation matrix ({})", m.method),
        SectionOutput::Rates(r) => format!(
            "Acceptance rate of {} by {}",
            r.target_column, r.group_column
        ),
        SectionOutput::Sample(s) => format!("Sample of {} rows", s.frame.height()),
    }
}

fn write_frame(df: &DataFrame, max_rows: usize, out: &mut String) -> std::fmt::Result {
    if df.height() > max_rows {
        writeln!(out, "{}", df.head(Some(max_rows)))?;
        writeln!(out, "... {} more rows", df.height() - max_rows)
    } else {
        writeln!(out, "{}", df)
    }
}

fn render_section_text(result: &SectionResult, max_rows: usize, out: &mut String) -> Result<()> {
    let output = match &result.outcome {
        SectionOutcome::Output(output) => output,
        SectionOutcome::Skipped { reason } => {
            writeln!(out, "== {} ==\nskipped: {}", result.section, reason)?;
            return Ok(());
        }
        SectionOutcome::Failed { error } => {
            writeln!(out, "== {} ==\nerror: {}", result.section, error)?;
            return Ok(());
        }
    };

    writeln!(out, "== {} ==", section_title(output))?;
    match output {
        SectionOutput::Info(info) => writeln!(out, "{info}")?,
        SectionOutput::Describe(table) if table.is_empty() => {
            writeln!(out, "No numeric columns.")?
        }
        SectionOutput::Missing(report) if report.is_empty() => {
            writeln!(out, "No missing values.")?
        }
        SectionOutput::Sample(sample) => write_frame(&sample.frame, max_rows, out)?,
        other => write_frame(&section_frame(other)?, max_rows, out)?,
    }
    Ok(())
}

fn section_frame(output: &SectionOutput) -> PolarsResult<DataFrame> {
    match output {
        SectionOutput::Info(info) => info.to_dataframe(),
        SectionOutput::Classify(classes) => classes.to_dataframe(),
        SectionOutput::Describe(table) => table.to_dataframe(),
        SectionOutput::Missing(report) => report.to_dataframe(),
        SectionOutput::Histogram(hist) => hist.to_dataframe(),
        SectionOutput::Categorical(table) => table.to_dataframe(),
        SectionOutput::Boxplot(summary) => summary.to_dataframe(),
        SectionOutput::Crosstab(ct) => ct.to_dataframe(),
        SectionOutput::Correlation(matrix) => matrix.to_dataframe(),
        SectionOutput::Rates(rates) => rates.to_dataframe(),
        SectionOutput::Sample(sample) => Ok(sample.frame.clone()),
    }
}

/// Write the PNG chart for a section. Sections without a chart are an error.
pub fn export_chart(output: &SectionOutput, path: &Path, style: &ChartStyle) -> Result<()> {
    match output {
        SectionOutput::Histogram(hist) => write_histogram_png(path, hist, style),
        SectionOutput::Boxplot(summary) => write_box_plot_png(path, summary, style),
        SectionOutput::Correlation(matrix) => write_heatmap_png(path, matrix, style),
        SectionOutput::Categorical(table) => write_bar_chart_png(
            path,
            &BarChartData {
                title: format!("Top {} values of {}", table.len(), table.column),
                x_label: table.column.clone(),
                y_label: "count".to_string(),
                labels: table.rows.iter().map(|r| r.value.clone()).collect(),
                values: table.rows.iter().map(|r| r.count as f64).collect(),
            },
            style,
        ),
        SectionOutput::Rates(rates) => write_bar_chart_png(
            path,
            &BarChartData {
                title: format!("Acceptance rate by {}", rates.group_column),
                x_label: rates.group_column.clone(),
                y_label: "acceptance rate".to_string(),
                labels: rates.rows.iter().map(|r| r.group.clone()).collect(),
                values: rates.rows.iter().map(|r| r.acceptance_rate).collect(),
            },
            style,
        ),
        SectionOutput::Missing(report) => write_bar_chart_png(
            path,
            &BarChartData {
                title: "Missing values per column".to_string(),
                x_label: "column".to_string(),
                y_label: "nulls".to_string(),
                labels: report.rows.iter().map(|r| r.column.clone()).collect(),
                values: report.rows.iter().map(|r| r.nulls as f64).collect(),
            },
            style,
        ),
        other => Err(eyre!(
            "The {} section has no chart",
            section_title(other).to_lowercase()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> DataFrame {
        df!(
            "age" => [Some(30i64), Some(41), None, Some(52), Some(38)],
            "balance" => [100.0f64, -20.0, 3000.0, 45.5, 0.0],
            "job" => ["admin.", "services", "admin.", "technician", "services"],
            "marital" => [Some("married"), None, Some("single"), Some("married"), Some("single")],
            "y" => ["no", "yes", "yes", "no", "no"]
        )
        .unwrap()
    }

    #[test]
    fn test_full_report_runs_every_section() {
        let report = run_report(&bank(), &full_report_commands(), &ReportSettings::default());
        assert_eq!(report.sections.len(), 11);
        assert_eq!(report.failures(), 0);
        assert!(report
            .sections
            .iter()
            .all(|s| matches!(s.outcome, SectionOutcome::Output(_))));
        let text = report.render(&ReportSettings::default()).unwrap();
        assert!(text.contains("== Dataset info =="));
        assert!(text.contains("Acceptance rate of y by job"));
    }

    #[test]
    fn test_warnings_skip_sections() {
        let df = df!("job" => ["a", "b"], "y" => ["yes", "no"]).unwrap();
        let report = run_report(&df, &full_report_commands(), &ReportSettings::default());
        let skipped: Vec<&str> = report
            .sections
            .iter()
            .filter(|s| matches!(s.outcome, SectionOutcome::Skipped { .. }))
            .map(|s| s.section)
            .collect();
        assert_eq!(skipped, vec!["histogram", "boxplot", "correlation"]);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn test_errors_do_not_stop_the_report() {
        let commands = vec![
            Command::Categorical {
                column: Some("nope".to_string()),
                top_n: None,
            },
            Command::Describe,
        ];
        let report = run_report(&bank(), &commands, &ReportSettings::default());
        assert_eq!(report.failures(), 1);
        assert!(matches!(
            report.sections[1].outcome,
            SectionOutcome::Output(SectionOutput::Describe(_))
        ));
    }

    #[test]
    fn test_rates_default_group_skips_target() {
        let command = Command::Rates {
            group: None,
            top_n: None,
        };
        let output = run_section(&bank(), &command, &ReportSettings::default()).unwrap();
        let SectionOutput::Rates(rates) = output else {
            panic!("expected rates");
        };
        assert_eq!(rates.group_column, "job");
        assert_eq!(rates.target_column, "y");
        assert_eq!(rates.rows[0].group, "admin.");
        assert_eq!(rates.rows[0].acceptance_rate, 0.5);
    }

    #[test]
    fn test_target_override() {
        let settings = ReportSettings {
            target_override: Some("marital".to_string()),
            ..ReportSettings::default()
        };
        assert_eq!(settings.resolve_target(&bank()).as_deref(), Some("marital"));
        let no_y = df!("a" => [1i64], "b" => ["x"]).unwrap();
        assert_eq!(
            ReportSettings::default().resolve_target(&no_y).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_crosstab_defaults_and_json() {
        let command = Command::Crosstab {
            col_a: None,
            col_b: None,
            no_normalize: true,
        };
        let settings = ReportSettings {
            format: OutputFormat::Json,
            ..ReportSettings::default()
        };
        let report = run_report(&bank(), &[command], &settings);
        let json: serde_json::Value = serde_json::from_str(&report.render(&settings).unwrap()).unwrap();
        assert_eq!(json["section"], "crosstab");
        assert_eq!(json["output"]["row_column"], "job");
        assert_eq!(json["output"]["col_column"], "marital");
        assert_eq!(json["output"]["cells"]["kind"], "counts");
    }

    #[test]
    fn test_sample_table_cells() {
        let command = Command::Sample {
            rows: Some(2),
            seed: Some(0),
        };
        let output = run_section(&bank(), &command, &ReportSettings::default()).unwrap();
        let SectionOutput::Sample(sample) = output else {
            panic!("expected sample");
        };
        assert_eq!(sample.columns.len(), 5);
        assert_eq!(sample.rows.len(), 2);
        assert_eq!(sample.rows[0][0].as_deref(), Some("30"));
    }

    #[test]
    fn test_rates_chart_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.png");
        let style = ChartStyle {
            width: 320,
            height: 240,
            ..ChartStyle::default()
        };
        let command = Command::Rates {
            group: Some("job".to_string()),
            top_n: None,
        };
        let output = run_section(&bank(), &command, &ReportSettings::default()).unwrap();
        assert!(matches!(output, SectionOutput::Rates(_)));
        crate::chart_export::tests::assert_png_written(
            export_chart(&output, &path, &style),
            &path,
        );
    }

    #[test]
    fn test_sections_without_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_section(&bank(), &Command::Info, &ReportSettings::default()).unwrap();
        let err = export_chart(&output, &dir.path().join("x.png"), &ChartStyle::default());
        assert!(err.is_err());
    }
}
