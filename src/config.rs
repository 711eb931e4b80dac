use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{CompressionFormat, CorrelationMethod, OutputFormat};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Parse `config.toml` from this directory; a missing file yields the defaults.
    pub fn read_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    /// Single-character delimiter; unset means comma with semicolon fallback.
    pub delimiter: Option<String>,
    pub null_values: Option<Vec<String>>,
    /// Read the built-in missing markers as null; unset means true.
    pub default_null_values: Option<bool>,
    pub infer_schema_length: Option<usize>,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub target_column: String,
    pub top_n: usize,
    pub bins: usize,
    pub sample_rows: usize,
    pub sample_seed: u64,
    pub correlation_method: String,
    pub normalize_crosstab: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    /// Rows shown per table in `table` format.
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Bar and box fill, `#rrggbb`.
    pub color: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_column: crate::rates::TARGET_DEFAULT.to_string(),
            top_n: 15,
            bins: 30,
            sample_rows: 20,
            sample_seed: 42,
            correlation_method: "pearson".to_string(),
            normalize_crosstab: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            max_table_rows: 50,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            color: "#1f77b4".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(manager.read_config()?);
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.analysis.merge(other.analysis);
        self.output.merge(other.output);
        self.charts.merge(other.charts);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if let Some(delimiter) = &self.file_loading.delimiter {
            parse_delimiter(delimiter)?;
        }
        if let Some(name) = &self.file_loading.compression {
            CompressionFormat::from_name(name)
                .ok_or_else(|| eyre!("Invalid compression: {}. Must be one of gzip, zstd, bzip2, xz", name))?;
        }

        if self.analysis.target_column.is_empty() {
            return Err(eyre!("target_column must not be empty"));
        }
        if self.analysis.top_n == 0 {
            return Err(eyre!("top_n must be greater than 0"));
        }
        if self.analysis.bins == 0 {
            return Err(eyre!("bins must be greater than 0"));
        }
        if self.analysis.sample_rows == 0 {
            return Err(eyre!("sample_rows must be greater than 0"));
        }
        self.correlation_method()?;

        self.output_format()?;
        if self.output.max_table_rows == 0 {
            return Err(eyre!("max_table_rows must be greater than 0"));
        }

        if self.charts.width < 100 || self.charts.height < 100 {
            return Err(eyre!(
                "Chart size {}x{} is too small. Both sides must be at least 100 pixels",
                self.charts.width,
                self.charts.height
            ));
        }
        parse_hex(&self.charts.color)?;

        Ok(())
    }

    pub fn correlation_method(&self) -> Result<CorrelationMethod> {
        CorrelationMethod::from_name(&self.analysis.correlation_method).ok_or_else(|| {
            eyre!(
                "Invalid correlation_method: {}. Must be 'pearson', 'spearman', or 'kendall'",
                self.analysis.correlation_method
            )
        })
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_name(&self.output.format).ok_or_else(|| {
            eyre!(
                "Invalid output format: {}. Must be 'table' or 'json'",
                self.output.format
            )
        })
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.null_values.is_some() {
            self.null_values = other.null_values;
        }
        if other.default_null_values.is_some() {
            self.default_null_values = other.default_null_values;
        }
        if other.infer_schema_length.is_some() {
            self.infer_schema_length = other.infer_schema_length;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl AnalysisConfig {
    pub fn merge(&mut self, other: Self) {
        let default = AnalysisConfig::default();
        if other.target_column != default.target_column {
            self.target_column = other.target_column;
        }
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
        if other.bins != default.bins {
            self.bins = other.bins;
        }
        if other.sample_rows != default.sample_rows {
            self.sample_rows = other.sample_rows;
        }
        if other.sample_seed != default.sample_seed {
            self.sample_seed = other.sample_seed;
        }
        if other.correlation_method != default.correlation_method {
            self.correlation_method = other.correlation_method;
        }
        if other.normalize_crosstab != default.normalize_crosstab {
            self.normalize_crosstab = other.normalize_crosstab;
        }
    }
}

impl OutputConfig {
    pub fn merge(&mut self, other: Self) {
        let default = OutputConfig::default();
        if other.format != default.format {
            self.format = other.format;
        }
        if other.max_table_rows != default.max_table_rows {
            self.max_table_rows = other.max_table_rows;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
        if other.color != default.color {
            self.color = other.color;
        }
    }

    /// Fill color as RGB components.
    pub fn rgb(&self) -> Result<(u8, u8, u8)> {
        parse_hex(&self.color)
    }
}

/// A delimiter given as text must be exactly one ASCII character.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(eyre!(
            "Invalid delimiter: '{}'. Expected a single ASCII character",
            s
        )),
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
