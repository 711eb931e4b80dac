//! Frequency tables and cross-tabulations over text-coerced column values.
//!
//! Values are turned into their text form before counting, so an integer `1`
//! and the string `"1"` fall into the same category. Missing cells become the
//! literal [`MISSING_LABEL`], which also collides with a genuine `"NA"` string.

use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::classify::column_series;
use crate::error::EdaResult;

/// Label used for missing values in frequency tables and cross-tabulations.
pub const MISSING_LABEL: &str = "NA";

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Text form of every cell, `None` for missing.
pub(crate) fn text_values(series: &Series) -> EdaResult<Vec<Option<String>>> {
    let as_text = series.cast(&DataType::String)?;
    let ca = as_text.str()?;
    Ok(ca.iter().map(|v| v.map(str::to_string)).collect())
}

/// Text form of every cell with missing replaced by [`MISSING_LABEL`].
pub(crate) fn labels(series: &Series) -> EdaResult<Vec<String>> {
    Ok(text_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| MISSING_LABEL.to_string()))
        .collect())
}

/// Distinct values with their number of occurrences, in no particular order.
pub(crate) fn value_counts(values: &[String]) -> EdaResult<Vec<(String, u32)>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let series = Series::new("value".into(), values);
    let counts = series.value_counts(false, false, "count".into(), false)?;
    let distinct = counts.column("value")?.as_materialized_series().str()?.clone();
    let tallies = counts.column("count")?.cast(&DataType::UInt32)?;
    let tallies = tallies.as_materialized_series().u32()?.clone();
    Ok(distinct
        .iter()
        .zip(tallies.iter())
        .filter_map(|(value, count)| Some((value?.to_string(), count?)))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub value: String,
    pub count: u32,
    pub proportion: f64,
}

/// Counts and proportions of the distinct values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub column: String,
    pub total_rows: usize,
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, value: &str) -> Option<&FrequencyRow> {
        self.rows.iter().find(|r| r.value == value)
    }

    /// The `n` most frequent values.
    pub fn head(&self, n: usize) -> FrequencyTable {
        FrequencyTable {
            column: self.column.clone(),
            total_rows: self.total_rows,
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                self.column.as_str().into(),
                self.rows.iter().map(|r| r.value.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "count".into(),
                self.rows.iter().map(|r| r.count).collect::<Vec<_>>(),
            ),
            Column::new(
                "proportion".into(),
                self.rows.iter().map(|r| r.proportion).collect::<Vec<_>>(),
            ),
        ])
    }
}

/// Value counts of `column` sorted by count descending, ties in first-occurrence order.
///
/// Proportions are taken over every row, missing included, and rounded to 4 decimals.
pub fn categorical_summary(df: &DataFrame, column: &str) -> EdaResult<FrequencyTable> {
    let series = column_series(df, column)?;
    let values = labels(series)?;
    let total_rows = values.len();

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, value) in values.iter().enumerate() {
        first_seen.entry(value.as_str()).or_insert(i);
    }

    let mut rows: Vec<FrequencyRow> = value_counts(&values)?
        .into_iter()
        .map(|(value, count)| FrequencyRow {
            proportion: round4(count as f64 / total_rows as f64),
            value,
            count,
        })
        .collect();
    // equal counts keep first-occurrence order
    rows.sort_by_key(|r| (std::cmp::Reverse(r.count), first_seen[r.value.as_str()]));

    log::debug!(
        "categorical_summary({}): {} distinct values over {} rows",
        column,
        rows.len(),
        total_rows
    );

    Ok(FrequencyTable {
        column: column.to_string(),
        total_rows,
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum CrossTabCells {
    Counts(Vec<Vec<u32>>),
    /// Row-normalized; rows with zero total are NaN.
    Proportions(Vec<Vec<f64>>),
}

/// Contingency table of two columns. `cells[i][j]` pairs `row_labels[i]` with `col_labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_column: String,
    pub col_column: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: CrossTabCells,
}

impl CrossTab {
    pub fn is_normalized(&self) -> bool {
        matches!(self.cells, CrossTabCells::Proportions(_))
    }

    /// Cell value as f64, `None` for unknown labels.
    pub fn value(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.row_labels.iter().position(|l| l == row)?;
        let j = self.col_labels.iter().position(|l| l == col)?;
        Some(match &self.cells {
            CrossTabCells::Counts(c) => c[i][j] as f64,
            CrossTabCells::Proportions(p) => p[i][j],
        })
    }

    /// One label column named after the row column, then one column per column label.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.col_labels.len() + 1);
        let header = format!("{} \\ {}", self.row_column, self.col_column);
        columns.push(Column::new(header.into(), self.row_labels.clone()));
        for (j, label) in self.col_labels.iter().enumerate() {
            let column = match &self.cells {
                CrossTabCells::Counts(c) => Column::new(
                    label.as_str().into(),
                    c.iter().map(|row| row[j]).collect::<Vec<_>>(),
                ),
                CrossTabCells::Proportions(p) => Column::new(
                    label.as_str().into(),
                    p.iter().map(|row| row[j]).collect::<Vec<_>>(),
                ),
            };
            columns.push(column);
        }
        DataFrame::new(columns)
    }
}

/// Joint counts of `col_a` (rows) by `col_b` (columns), missing kept as its own label.
///
/// Labels are sorted ascending. With `normalize`, each row is divided by its total
/// and rounded to 4 decimals.
pub fn crosstab(df: &DataFrame, col_a: &str, col_b: &str, normalize: bool) -> EdaResult<CrossTab> {
    let a = labels(column_series(df, col_a)?)?;
    let b = labels(column_series(df, col_b)?)?;

    let row_labels: Vec<String> = a.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let col_labels: Vec<String> = b.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: HashMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(j, l)| (l.as_str(), j))
        .collect();

    let mut counts = vec![vec![0u32; col_labels.len()]; row_labels.len()];
    for (va, vb) in a.iter().zip(b.iter()) {
        counts[row_index[va.as_str()]][col_index[vb.as_str()]] += 1;
    }

    let cells = if normalize {
        CrossTabCells::Proportions(
            counts
                .iter()
                .map(|row| {
                    let total: u32 = row.iter().sum();
                    row.iter()
                        .map(|&c| {
                            if total == 0 {
                                f64::NAN
                            } else {
                                round4(c as f64 / total as f64)
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    } else {
        CrossTabCells::Counts(counts)
    };

    Ok(CrossTab {
        row_column: col_a.to_string(),
        col_column: col_b.to_string(),
        row_labels,
        col_labels,
        cells,
    })
}
