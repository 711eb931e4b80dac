//! Reading delimited text (optionally compressed) into a `DataFrame`.

use polars::io::csv::read::NullValues;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::config::{parse_delimiter, AppConfig};
use crate::error::{EdaError, EdaResult};
use crate::error_display::{user_message_from_io, user_message_from_polars};
use crate::{Args, CompressionFormat};

/// Rows scanned for type inference when nothing else is configured.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 1000;

/// Cell texts read as missing unless disabled; empty fields are always missing.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn default_null_values() -> Vec<String> {
    DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Parse with this delimiter only; `None` tries comma then semicolon.
    pub delimiter: Option<u8>,
    /// Every text read as null; starts from [`DEFAULT_NULL_VALUES`].
    pub null_values: Vec<String>,
    pub infer_schema_length: Option<usize>,
    /// Overrides detection from the file extension.
    pub compression: Option<CompressionFormat>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            null_values: default_null_values(),
            infer_schema_length: Some(DEFAULT_INFER_SCHEMA_LENGTH),
            compression: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Replace the null markers, built-in ones included.
    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = values;
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    /// CLI flags take precedence over the config file, which takes precedence over defaults.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let file_loading = &config.file_loading;
        let mut opts = LoadOptions::new();

        opts.delimiter = args
            .delimiter
            .filter(char::is_ascii)
            .map(|c| c as u8)
            .or_else(|| {
                file_loading
                    .delimiter
                    .as_deref()
                    .and_then(|d| parse_delimiter(d).ok())
            });

        // Built-in markers, then the config list, then CLI values
        let keep_defaults =
            !args.no_default_nulls && file_loading.default_null_values.unwrap_or(true);
        if !keep_defaults {
            opts.null_values.clear();
        }
        for value in file_loading.null_values.iter().flatten().chain(&args.null_value) {
            if !opts.null_values.contains(value) {
                opts.null_values.push(value.clone());
            }
        }

        opts.infer_schema_length = args
            .infer_schema_length
            .or(file_loading.infer_schema_length)
            .or(Some(DEFAULT_INFER_SCHEMA_LENGTH));

        opts.compression = args.compression.or_else(|| {
            file_loading
                .compression
                .as_deref()
                .and_then(CompressionFormat::from_name)
        });

        opts
    }
}

impl From<&Args> for LoadOptions {
    fn from(args: &Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

fn read_bytes(path: &Path, compression: Option<CompressionFormat>) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut reader: Box<dyn Read> = match compression {
        None => Box::new(BufReader::new(file)),
        Some(CompressionFormat::Gzip) => {
            Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(file)))
        }
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(file)?),
        Some(CompressionFormat::Bzip2) => {
            Box::new(bzip2::read::BzDecoder::new(BufReader::new(file)))
        }
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(BufReader::new(file))),
    };
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn null_values(values: &[String]) -> Option<NullValues> {
    if values.is_empty() {
        return None;
    }
    let vals: Vec<PlSmallStr> = values.iter().map(|s| PlSmallStr::from(s.as_str())).collect();
    Some(if vals.len() == 1 {
        NullValues::AllColumnsSingle(vals[0].clone())
    } else {
        NullValues::AllColumns(vals)
    })
}

fn parse(bytes: &[u8], delimiter: u8, options: &LoadOptions) -> PolarsResult<DataFrame> {
    let nv = null_values(&options.null_values);
    let read_options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|opts| {
            let o = opts.with_separator(delimiter);
            match &nv {
                Some(n) => o.with_null_values(Some(n.clone())),
                None => o,
            }
        });
    CsvReader::new(Cursor::new(bytes))
        .with_options(read_options)
        .finish()
}

/// True when a comma parse collapsed a semicolon-delimited header into one column.
fn looks_semicolon_delimited(df: &DataFrame) -> bool {
    df.width() == 1
        && df
            .get_column_names()
            .first()
            .is_some_and(|name| name.contains(';'))
}

fn header_line(bytes: &[u8]) -> &[u8] {
    bytes.split(|b| *b == b'\n').next().unwrap_or(bytes)
}

/// Parse in-memory delimited text: explicit delimiter, or comma with semicolon fallback.
///
/// Semicolon is only tried when the header line contains one, and a semicolon
/// parse that still yields a single column is rejected.
pub fn parse_delimited(bytes: &[u8], options: &LoadOptions) -> PolarsResult<DataFrame> {
    if let Some(delimiter) = options.delimiter {
        return parse(bytes, delimiter, options);
    }
    match parse(bytes, b',', options) {
        Ok(df) if looks_semicolon_delimited(&df) => {
            log::debug!("single column header contains ';', re-reading with semicolon delimiter");
            parse(bytes, b';', options)
        }
        Ok(df) => Ok(df),
        // Quoted semicolon headers can fail to parse as comma separated
        Err(comma_err) if header_line(bytes).contains(&b';') => {
            log::debug!("comma parse failed ({comma_err}), re-reading with semicolon delimiter");
            match parse(bytes, b';', options) {
                Ok(df) if df.width() > 1 => Ok(df),
                _ => Err(comma_err),
            }
        }
        Err(comma_err) => Err(comma_err),
    }
}

/// Read the whole file at `path` into a table.
///
/// Any failure becomes [`EdaError::Load`] with the path and a reason.
pub fn load_delimited(path: &Path, options: &LoadOptions) -> EdaResult<DataFrame> {
    let compression = options
        .compression
        .or_else(|| CompressionFormat::from_extension(path));
    let load_error = |reason: String| EdaError::Load {
        path: path.to_path_buf(),
        reason,
    };

    let bytes =
        read_bytes(path, compression).map_err(|e| load_error(user_message_from_io(&e, None)))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(load_error("file is empty".to_string()));
    }
    let df =
        parse_delimited(&bytes, options).map_err(|e| load_error(user_message_from_polars(&e)))?;

    log::debug!(
        "loaded {} ({} bytes, compression {:?}): {} rows x {} columns",
        path.display(),
        bytes.len(),
        compression.map(|c| c.extension()),
        df.height(),
        df.width()
    );
    Ok(df)
}
