//! One-line, user-facing messages for errors reaching the terminal.
//!
//! Matches on typed errors (`EdaError`, `PolarsError` variants, `io::ErrorKind`)
//! instead of parsing message strings.

use polars::prelude::PolarsError;
use std::io;

use crate::error::EdaError;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. Check spelling and that the column exists.",
            msg
        ),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::ComputeError(msg) => simplify_compute_message(msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data. Check the compression format.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Message for an analysis or load error.
pub fn user_message(err: &EdaError) -> String {
    match err {
        EdaError::Load { path, reason } => format!("Failed to load {}: {}", path.display(), reason),
        EdaError::EmptyNumericSet { required: 1, .. } => "No numeric columns found.".to_string(),
        EdaError::EmptyCategoricalSet { required: 1, .. } => {
            "No categorical columns found.".to_string()
        }
        EdaError::InvalidColumn { column, reason } if reason == "no such column" => format!(
            "Column not found: {}. Check spelling and that the column exists.",
            column
        ),
        EdaError::Polars(pe) => user_message_from_polars(pe),
        other => {
            let mut msg = other.to_string();
            if let Some(first) = msg.get(..1) {
                msg = first.to_uppercase() + &msg[1..];
            }
            msg
        }
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find EdaError, PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report) -> String {
    for cause in report.chain() {
        if let Some(eda) = cause.downcast_ref::<EdaError>() {
            return user_message(eda);
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return user_message_from_polars(pe);
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(io_err, None);
        }
    }

    // Fallback: first line of display, no traceback
    let display = report.to_string();
    display
        .lines()
        .next()
        .unwrap_or("An error occurred")
        .trim()
        .to_string()
}

/// Strip polars-internal phrasing from compute errors.
fn simplify_compute_message(msg: &str) -> String {
    let msg = msg.trim();
    let msg = msg
        .split("\n\nHint:")
        .next()
        .unwrap_or(msg)
        .trim_end_matches('.');
    if msg.contains("could not parse") {
        format!(
            "{}. Try --infer-schema-length with a larger value or --null-value for placeholders.",
            msg
        )
    } else {
        msg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(
            msg.contains("not found"),
            "expected 'not found', got: {}",
            msg
        );
    }

    #[test]
    fn test_user_message_from_polars_column_not_found() {
        let err = PolarsError::ColumnNotFound("foo".into());
        let msg = user_message_from_polars(&err);
        assert!(msg.contains("foo"), "expected 'foo', got: {}", msg);
        assert!(msg.contains("Column not found"));
    }

    #[test]
    fn test_user_message_for_analysis_errors() {
        let load = EdaError::Load {
            path: PathBuf::from("bank.csv"),
            reason: "File or directory not found.".to_string(),
        };
        assert_eq!(
            user_message(&load),
            "Failed to load bank.csv: File or directory not found."
        );
        assert_eq!(
            user_message(&EdaError::EmptyNumericSet {
                required: 1,
                found: 0
            }),
            "No numeric columns found."
        );
        assert!(user_message(&EdaError::missing_column("agee")).contains("agee"));
        assert!(user_message(&EdaError::MissingDataset).starts_with("No dataset"));
    }

    #[test]
    fn test_user_message_from_report_finds_typed_error() {
        let report = color_eyre::eyre::Report::new(EdaError::MissingDataset);
        assert!(user_message_from_report(&report).starts_with("No dataset"));
        let plain = color_eyre::eyre::eyre!("first line\nsecond line");
        assert_eq!(user_message_from_report(&plain), "first line");
    }
}
