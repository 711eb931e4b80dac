//! Shape, dtypes, null counts and a deterministic sample of the loaded table.

use polars::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::error::EdaResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub nulls: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
    pub column_info: Vec<ColumnInfo>,
    pub estimated_size: usize,
}

impl DatasetInfo {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let info = &self.column_info;
        DataFrame::new(vec![
            Column::new(
                "column".into(),
                info.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "dtype".into(),
                info.iter().map(|c| c.dtype.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "non_null".into(),
                info.iter().map(|c| c.non_null as u64).collect::<Vec<_>>(),
            ),
            Column::new(
                "nulls".into(),
                info.iter().map(|c| c.nulls as u64).collect::<Vec<_>>(),
            ),
        ])
    }

    /// Plain-text listing, see the [`fmt::Display`] impl.
    pub fn info_text(&self) -> String {
        self.to_string()
    }
}

/// Entry count, one line per column, dtype tally and memory usage.
impl fmt::Display for DatasetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RangeIndex: {} entries", self.rows)?;
        writeln!(f, "Data columns (total {} columns):", self.columns)?;
        let name_width = self
            .column_info
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("Column".len());
        writeln!(f, " #   {:<name_width$}  Non-Null Count  Dtype", "Column")?;
        for (i, c) in self.column_info.iter().enumerate() {
            writeln!(
                f,
                " {:<3} {:<name_width$}  {:>8} non-null  {}",
                i, c.name, c.non_null, c.dtype
            )?;
        }

        let mut tally: Vec<(String, usize)> = Vec::new();
        for c in &self.column_info {
            match tally.iter_mut().find(|(d, _)| *d == c.dtype) {
                Some((_, n)) => *n += 1,
                None => tally.push((c.dtype.clone(), 1)),
            }
        }
        let dtypes: Vec<String> = tally.iter().map(|(d, n)| format!("{d}({n})")).collect();
        writeln!(f, "dtypes: {}", dtypes.join(", "))?;
        write!(f, "memory usage: {}", format_bytes(self.estimated_size))
    }
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} bytes")
    } else {
        format!("{value:.1}+ {}", UNITS[unit])
    }
}

pub fn dataset_info(df: &DataFrame) -> DatasetInfo {
    let column_info = df
        .get_columns()
        .iter()
        .map(|c| {
            let nulls = c.null_count();
            ColumnInfo {
                name: c.name().to_string(),
                dtype: c.dtype().to_string(),
                non_null: df.height() - nulls,
                nulls,
            }
        })
        .collect();
    DatasetInfo {
        rows: df.height(),
        columns: df.width(),
        column_info,
        estimated_size: df.estimated_size(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

/// Null counts per column, ordered by count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NullReport {
    pub rows: Vec<NullCount>,
}

impl NullReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.nulls).sum()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "column".into(),
                self.rows.iter().map(|r| r.column.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "nulls".into(),
                self.rows.iter().map(|r| r.nulls as u64).collect::<Vec<_>>(),
            ),
        ])
    }
}

/// Every column with its null count; equal counts keep column order.
pub fn null_counts(df: &DataFrame) -> NullReport {
    let mut rows: Vec<NullCount> = df
        .get_columns()
        .iter()
        .map(|c| NullCount {
            column: c.name().to_string(),
            nulls: c.null_count(),
        })
        .collect();
    rows.sort_by(|a, b| b.nulls.cmp(&a.nulls));
    NullReport { rows }
}

/// Only the columns that have at least one null. Empty means the table is complete.
pub fn missing_values(df: &DataFrame) -> NullReport {
    let mut report = null_counts(df);
    report.rows.retain(|r| r.nulls > 0);
    report
}

/// Up to `n` rows picked with an even stride and a seed-derived offset, in table order.
pub fn sample_rows(df: &DataFrame, n: usize, seed: u64) -> EdaResult<DataFrame> {
    let total_rows = df.height();
    if n >= total_rows {
        return Ok(df.clone());
    }
    if n == 0 {
        return Ok(df.head(Some(0)));
    }

    let step = total_rows / n;
    let start = (seed % step as u64) as usize;
    let indices: Vec<IdxSize> = (start..total_rows)
        .step_by(step)
        .take(n)
        .map(|i| i as IdxSize)
        .collect();
    log::trace!(
        "sample_rows: {} of {} rows, step {}, offset {}",
        indices.len(),
        total_rows,
        step,
        start
    );
    let idx = IdxCa::from_vec("idx".into(), indices);
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "age" => [Some(30i64), None, Some(52), None],
            "job" => [Some("admin."), Some("services"), None, Some("admin.")],
            "y" => ["no", "no", "yes", "no"]
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_info() {
        let info = dataset_info(&sample_df());
        assert_eq!(info.rows, 4);
        assert_eq!(info.columns, 3);
        assert_eq!(info.column_info[0].nulls, 2);
        assert_eq!(info.column_info[0].non_null, 2);
        assert_eq!(info.column_info[1].nulls, 1);
        let text = info.info_text();
        assert!(text.contains("RangeIndex: 4 entries"));
        assert!(text.contains("total 3 columns"));
        assert!(text.contains("memory usage"));
        assert!(text.contains("dtypes: i64(1), str(2)"));
        assert_eq!(text.lines().filter(|l| l.ends_with(" non-null  str")).count(), 2);
        assert_eq!(format!("{info}"), text);
        assert_eq!(info.to_dataframe().unwrap().height(), 3);
    }

    #[test]
    fn test_null_counts_sorted() {
        let report = null_counts(&sample_df());
        let order: Vec<&str> = report.rows.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(order, vec!["age", "job", "y"]);
        assert_eq!(report.total(), 3);

        let missing = missing_values(&sample_df());
        assert_eq!(missing.rows.len(), 2);
        assert!(missing_values(&df!("a" => [1i64]).unwrap()).is_empty());
    }

    #[test]
    fn test_sample_rows_deterministic() {
        let df = df!("i" => (0..100i64).collect::<Vec<_>>()).unwrap();
        let a = sample_rows(&df, 10, 7).unwrap();
        let b = sample_rows(&df, 10, 7).unwrap();
        assert_eq!(a.height(), 10);
        assert!(a.equals(&b));
        let first = a.column("i").unwrap().i64().unwrap().get(0);
        assert_eq!(first, Some(7));

        assert_eq!(sample_rows(&df, 500, 1).unwrap().height(), 100);
        assert_eq!(sample_rows(&df, 0, 1).unwrap().height(), 0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0+ KB");
    }
}
