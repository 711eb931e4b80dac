use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the analysis routines and the loader.
///
/// Every variant is scoped to a single request: none of them invalidates the
/// loaded table. `EmptyNumericSet` and `EmptyCategoricalSet` are warnings;
/// callers skip the section instead of failing.
#[derive(Debug, Error)]
pub enum EdaError {
    #[error("could not read {} as delimited text: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("no dataset loaded; load a delimited file first")]
    MissingDataset,

    #[error("need at least {required} numeric column(s), found {found}")]
    EmptyNumericSet { required: usize, found: usize },

    #[error("need at least {required} categorical column(s), found {found}")]
    EmptyCategoricalSet { required: usize, found: usize },

    #[error("invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("no rows left for group '{group}' and target '{target}' after dropping missing values")]
    EmptyPopulation { group: String, target: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl EdaError {
    pub(crate) fn missing_column(column: &str) -> Self {
        EdaError::InvalidColumn {
            column: column.to_string(),
            reason: "no such column".to_string(),
        }
    }

    pub(crate) fn wrong_kind(column: &str, expected: &str) -> Self {
        EdaError::InvalidColumn {
            column: column.to_string(),
            reason: format!("expected a {expected} column"),
        }
    }

    /// Non-fatal: the section has nothing to show for this table.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            EdaError::EmptyNumericSet { .. } | EdaError::EmptyCategoricalSet { .. }
        )
    }
}

pub type EdaResult<T> = std::result::Result<T, EdaError>;
