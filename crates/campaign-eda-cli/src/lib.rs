//! Shared CLI definitions for campaign-eda.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz) - Most common, good balance of speed and compression
    Gzip,
    /// Zstandard compression (.zst) - Modern, fast compression with good ratios
    Zstd,
    /// Bzip2 compression (.bz2) - Good compression ratio, slower than gzip
    Bzip2,
    /// XZ compression (.xz) - Excellent compression ratio, slower than bzip2
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            Self::from_name(ext)
        } else {
            None
        }
    }

    /// Parse a format from an extension or config name ("gz", "gzip", "zst", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" | "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Get file extension for this compression format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

/// How section results are written to stdout
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
        }
    }
}

/// Correlation coefficient used for the correlation matrix
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Linear (Pearson product-moment) correlation
    #[default]
    Pearson,
    /// Rank (Spearman) correlation
    Spearman,
    /// Kendall tau-b rank correlation
    Kendall,
}

impl CorrelationMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pearson" => Some(Self::Pearson),
            "spearman" => Some(Self::Spearman),
            "kendall" => Some(Self::Kendall),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        }
    }
}

/// Command-line arguments for campaign-eda
#[derive(Clone, Parser, Debug)]
#[command(
    name = "campaign-eda",
    version,
    about = "Exploratory analysis of marketing campaign tables",
    long_about = "Loads a comma or semicolon delimited file and reports summary statistics, \
distributions, cross-tabulations and acceptance rates (target value \"yes\") per segment.\n\n\
Run without a command to print the full report."
)]
pub struct Args {
    /// Path to the delimited data file (not required with --generate-config)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Force a single delimiter instead of comma with semicolon fallback
    #[arg(long = "delimiter", global = true)]
    pub delimiter: Option<char>,

    /// Treat this value as null when reading the file. Use once per value
    #[arg(long = "null-value", value_name = "VAL", global = true)]
    pub null_value: Vec<String>,

    /// Do not read the built-in markers (NA, N/A, NaN, null, ...) as null
    #[arg(long = "no-default-nulls", action, global = true)]
    pub no_default_nulls: bool,

    /// Number of rows used to infer column types (default: 1000)
    #[arg(long = "infer-schema-length", value_name = "N", global = true)]
    pub infer_schema_length: Option<usize>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum, global = true)]
    pub compression: Option<CompressionFormat>,

    /// Output format for section results
    #[arg(long = "format", value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Name of the target (campaign outcome) column (default: y)
    #[arg(long = "target", value_name = "COLUMN", global = true)]
    pub target: Option<String>,

    /// Write a PNG chart for the selected section to this file
    #[arg(long = "chart", value_name = "FILE", global = true)]
    pub chart: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long = "debug", action, global = true)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/campaign-eda/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// One report section per command; no command runs all of them
#[derive(Clone, Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Shape, column types and null counts
    Info,
    /// Split columns into numeric and categorical
    Classify,
    /// Descriptive statistics of the numeric columns
    Describe,
    /// Columns with missing values
    Missing,
    /// Histogram bins of a numeric column
    Histogram {
        /// Numeric column (default: first numeric column)
        column: Option<String>,
        /// Number of equal-width bins
        #[arg(long = "bins")]
        bins: Option<usize>,
    },
    /// Counts and proportions of a categorical column
    Categorical {
        /// Categorical column (default: first categorical column)
        column: Option<String>,
        /// Show only the N most frequent values
        #[arg(long = "top-n")]
        top_n: Option<usize>,
    },
    /// Box-plot summary of a numeric column per category
    Boxplot {
        /// Numeric column (default: first numeric column)
        numeric: Option<String>,
        /// Categorical column (default: first categorical column)
        category: Option<String>,
    },
    /// Cross-tabulation of two categorical columns
    Crosstab {
        /// Row column (default: first categorical column)
        col_a: Option<String>,
        /// Column column (default: next categorical column)
        col_b: Option<String>,
        /// Show raw counts instead of row proportions
        #[arg(long = "no-normalize", action)]
        no_normalize: bool,
    },
    /// Correlation matrix of the numeric columns
    Correlation {
        /// Correlation coefficient
        #[arg(long = "method", value_enum)]
        method: Option<CorrelationMethod>,
    },
    /// Acceptance rate (target == "yes") per segment
    Rates {
        /// Grouping column (default: first categorical column other than the target)
        group: Option<String>,
        /// Show only the N highest-rate segments
        #[arg(long = "top-n")]
        top_n: Option<usize>,
    },
    /// Deterministic sample of rows
    Sample {
        /// Number of rows to show
        #[arg(long = "rows")]
        rows: Option<usize>,
        /// Seed used to pick the rows
        #[arg(long = "seed")]
        seed: Option<u64>,
    },
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn render_arguments(cmd: &clap::Command, skip_globals: bool, out: &mut String) {
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" || (skip_globals && arg.is_global_set()) {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }
}

/// Render command-line options and commands as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    render_arguments(&cmd, false, &mut out);

    for sub in cmd.get_subcommands() {
        if sub.get_name() == "help" {
            continue;
        }
        out.push_str(&format!("\n## `{}`\n\n", sub.get_name()));
        if let Some(about) = sub.get_about() {
            out.push_str(&format!("{}\n\n", about));
        }
        if sub.get_arguments().any(|a| {
            let id = a.get_id().as_ref();
            id != "help" && !a.is_global_set()
        }) {
            render_arguments(sub, true, &mut out);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("bank.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("bank.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("bank.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("bank.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("bank.csv")),
            None
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("bank")), None);
    }

    #[test]
    fn test_compression_names() {
        assert_eq!(CompressionFormat::from_name("gzip"), Some(CompressionFormat::Gzip));
        assert_eq!(CompressionFormat::from_name("BZIP2"), Some(CompressionFormat::Bzip2));
        assert_eq!(CompressionFormat::from_name("rar"), None);
        assert_eq!(CompressionFormat::Zstd.extension(), "zst");
    }

    #[test]
    fn test_method_and_format_names() {
        for method in [
            CorrelationMethod::Pearson,
            CorrelationMethod::Spearman,
            CorrelationMethod::Kendall,
        ] {
            assert_eq!(CorrelationMethod::from_name(method.as_str()), Some(method));
        }
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("csv"), None);
    }

    #[test]
    fn test_parse_path_and_command() {
        let args = Args::try_parse_from([
            "campaign-eda",
            "bank.csv",
            "rates",
            "job",
            "--top-n",
            "5",
            "--target",
            "deposit",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("bank.csv")));
        assert_eq!(args.target.as_deref(), Some("deposit"));
        assert_eq!(
            args.command,
            Some(Command::Rates {
                group: Some("job".to_string()),
                top_n: Some(5),
            })
        );
    }

    #[test]
    fn test_path_required_unless_generating_config() {
        assert!(Args::try_parse_from(["campaign-eda"]).is_err());
        let args = Args::try_parse_from(["campaign-eda", "--generate-config"]).unwrap();
        assert!(args.generate_config);
        assert!(args.path.is_none());
    }

    #[test]
    fn test_options_markdown_lists_commands() {
        let md = render_options_markdown();
        assert!(md.contains("--null-value"));
        assert!(md.contains("## `rates`"));
        assert!(md.contains("--top-n"));
    }
}
