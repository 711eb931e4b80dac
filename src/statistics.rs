use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

use crate::categorical::text_values;
use crate::classify::{classify, column_series, numeric_series};
use crate::error::{EdaError, EdaResult};
use crate::CorrelationMethod;

/// Summary of one numeric column; missing values are excluded from every figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescribeTable {
    pub rows: Vec<NumericSummary>,
}

impl DescribeTable {
    /// True when the table had no numeric columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&NumericSummary> {
        self.rows.iter().find(|r| r.column == column)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let stat = |f: fn(&NumericSummary) -> f64| self.rows.iter().map(f).collect::<Vec<f64>>();
        DataFrame::new(vec![
            Column::new(
                "column".into(),
                self.rows.iter().map(|r| r.column.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "count".into(),
                self.rows.iter().map(|r| r.count as u64).collect::<Vec<_>>(),
            ),
            Column::new("mean".into(), stat(|r| r.mean)),
            Column::new("std".into(), stat(|r| r.std)),
            Column::new("min".into(), stat(|r| r.min)),
            Column::new("25%".into(), stat(|r| r.q25)),
            Column::new("50%".into(), stat(|r| r.q50)),
            Column::new("75%".into(), stat(|r| r.q75)),
            Column::new("max".into(), stat(|r| r.max)),
        ])
    }
}

/// Non-null values of a numeric series as f64.
pub(crate) fn numeric_values(series: &Series) -> EdaResult<Vec<f64>> {
    Ok(optional_numeric_values(series)?.into_iter().flatten().collect())
}

/// Every cell of a numeric series as f64, `None` for missing. NaN counts as missing.
pub(crate) fn optional_numeric_values(series: &Series) -> EdaResult<Vec<Option<f64>>> {
    let as_f64 = series.cast(&DataType::Float64)?;
    Ok(as_f64
        .f64()?
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Quantile of already sorted values with linear interpolation between closest ranks.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); NaN below two values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

fn summarize(column: &str, series: &Series) -> EdaResult<NumericSummary> {
    let mut values = numeric_values(series)?;
    sort_values(&mut values);
    let m = mean(&values);
    Ok(NumericSummary {
        column: column.to_string(),
        count: values.len(),
        mean: m,
        std: sample_std(&values, m),
        min: values.first().copied().unwrap_or(f64::NAN),
        q25: quantile_sorted(&values, 0.25),
        q50: quantile_sorted(&values, 0.50),
        q75: quantile_sorted(&values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    })
}

/// count, mean, std, min, quartiles and max of every numeric column.
///
/// A table without numeric columns gives an empty result rather than an error.
pub fn describe(df: &DataFrame) -> EdaResult<DescribeTable> {
    let classes = classify(df);
    let mut rows = Vec::with_capacity(classes.numeric.len());
    for name in &classes.numeric {
        rows.push(summarize(name, column_series(df, name)?)?);
    }
    Ok(DescribeTable { rows })
}

/// Equal-width bins over the non-null values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` bin boundaries; empty when the column has no values.
    pub edges: Vec<f64>,
    pub counts: Vec<u32>,
}

impl Histogram {
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let n = self.counts.len().min(self.edges.len().saturating_sub(1));
        DataFrame::new(vec![
            Column::new("bin_start".into(), self.edges[..n].to_vec()),
            Column::new(
                "bin_end".into(),
                self.edges.iter().skip(1).take(n).copied().collect::<Vec<_>>(),
            ),
            Column::new("count".into(), self.counts[..n].to_vec()),
        ])
    }
}

/// Histogram of `column` with `bins` equal-width bins; the last bin is closed on the right.
pub fn histogram(df: &DataFrame, column: &str, bins: usize) -> EdaResult<Histogram> {
    if bins == 0 {
        return Err(EdaError::InvalidParameter(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let values = numeric_values(numeric_series(df, column)?)?;
    if values.is_empty() {
        return Ok(Histogram {
            column: column.to_string(),
            edges: Vec::new(),
            counts: vec![0; bins],
        });
    }

    let mut lo = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let mut hi = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0u32; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        edges,
        counts,
    })
}

/// Box-plot figures of a numeric column within one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub category: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values within 1.5 IQR of the box.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    pub numeric_column: String,
    pub category_column: String,
    pub groups: Vec<BoxStats>,
}

impl BoxPlotSummary {
    pub fn get(&self, category: &str) -> Option<&BoxStats> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let stat = |f: fn(&BoxStats) -> f64| self.groups.iter().map(f).collect::<Vec<f64>>();
        DataFrame::new(vec![
            Column::new(
                self.category_column.as_str().into(),
                self.groups.iter().map(|g| g.category.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "count".into(),
                self.groups.iter().map(|g| g.count as u64).collect::<Vec<_>>(),
            ),
            Column::new("min".into(), stat(|g| g.min)),
            Column::new("q1".into(), stat(|g| g.q1)),
            Column::new("median".into(), stat(|g| g.median)),
            Column::new("q3".into(), stat(|g| g.q3)),
            Column::new("max".into(), stat(|g| g.max)),
            Column::new("lower_whisker".into(), stat(|g| g.lower_whisker)),
            Column::new("upper_whisker".into(), stat(|g| g.upper_whisker)),
            Column::new(
                "outliers".into(),
                self.groups.iter().map(|g| g.outliers as u64).collect::<Vec<_>>(),
            ),
        ])
    }
}

fn box_stats(category: String, mut values: Vec<f64>) -> BoxStats {
    sort_values(&mut values);
    let q1 = quantile_sorted(&values, 0.25);
    let q3 = quantile_sorted(&values, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let mut lower_whisker = f64::INFINITY;
    let mut upper_whisker = f64::NEG_INFINITY;
    let mut outliers = 0;
    for &v in &values {
        if v < lower_fence || v > upper_fence {
            outliers += 1;
        } else {
            lower_whisker = lower_whisker.min(v);
            upper_whisker = upper_whisker.max(v);
        }
    }
    BoxStats {
        count: values.len(),
        min: values[0],
        q1,
        median: quantile_sorted(&values, 0.5),
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers,
        category,
    }
}

/// Five-number summary of `numeric_column` per value of `category_column`.
///
/// Rows missing either value are dropped; categories appear in first-occurrence order.
pub fn box_stats_by_category(
    df: &DataFrame,
    numeric_column: &str,
    category_column: &str,
) -> EdaResult<BoxPlotSummary> {
    let numbers = optional_numeric_values(numeric_series(df, numeric_column)?)?;
    let categories = text_values(column_series(df, category_column)?)?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
    for (value, category) in numbers.into_iter().zip(categories) {
        let (Some(value), Some(category)) = (value, category) else {
            continue;
        };
        grouped
            .entry(category.clone())
            .or_insert_with(|| {
                order.push(category);
                Vec::new()
            })
            .push(value);
    }

    let groups = order
        .into_iter()
        .filter_map(|category| {
            let values = grouped.remove(&category)?;
            Some(box_stats(category, values))
        })
        .collect();

    Ok(BoxPlotSummary {
        numeric_column: numeric_column.to_string(),
        category_column: category_column.to_string(),
        groups,
    })
}

/// Square correlation matrix over the numeric columns, pairwise complete observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub method: String,
    pub columns: Vec<String>,
    pub correlations: Vec<Vec<f64>>,
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.correlations[i][j])
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new("column".into(), self.columns.clone()));
        for (j, name) in self.columns.iter().enumerate() {
            columns.push(Column::new(
                name.as_str().into(),
                self.correlations.iter().map(|row| row[j]).collect::<Vec<_>>(),
            ));
        }
        DataFrame::new(columns)
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let mx = mean(x);
    let my = mean(y);
    let numerator: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let var_x: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
    let var_y: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    numerator / (var_x.sqrt() * var_y.sqrt())
}

/// 1-based ranks, ties share their average rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < idx.len() {
        let mut end = start + 1;
        while end < idx.len() && values[idx[end]] == values[idx[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &idx[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Pairs of equal neighbours summed over every run in `sorted`.
fn tied_pairs<T: PartialEq>(sorted: &[T]) -> u64 {
    let mut total = 0;
    let mut run = 1u64;
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
        } else {
            total += run * (run - 1) / 2;
            run = 1;
        }
    }
    total + run * (run - 1) / 2
}

/// Stable merge sort of `values`, returning how many inversions it removed.
fn merge_sort_swaps(values: &mut [f64], buffer: &mut Vec<f64>) -> u64 {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let mid = n / 2;
    let mut swaps = merge_sort_swaps(&mut values[..mid], buffer);
    swaps += merge_sort_swaps(&mut values[mid..], buffer);

    buffer.clear();
    let (mut i, mut j) = (0, mid);
    while i < mid && j < n {
        if values[j] < values[i] {
            buffer.push(values[j]);
            swaps += (mid - i) as u64;
            j += 1;
        } else {
            buffer.push(values[i]);
            i += 1;
        }
    }
    buffer.extend_from_slice(&values[i..mid]);
    buffer.extend_from_slice(&values[j..n]);
    values.copy_from_slice(buffer);
    swaps
}

/// Kendall tau-b in O(n log n) (Knight's algorithm).
fn kendall(x: &[f64], y: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let n = pairs.len() as u64;
    let total = n * n.saturating_sub(1) / 2;
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let tied_x = tied_pairs(&xs);
    let tied_xy = tied_pairs(&pairs);

    // With x sorted and ties ordered by y, every remaining inversion in y is a discordant pair
    let mut ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let discordant = merge_sort_swaps(&mut ys, &mut Vec::with_capacity(pairs.len()));
    let tied_y = tied_pairs(&ys);

    let denom = ((total - tied_x) as f64 * (total - tied_y) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let numerator =
        total as i64 - tied_x as i64 - tied_y as i64 + tied_xy as i64 - 2 * discordant as i64;
    numerator as f64 / denom
}

/// Correlation of every numeric column pair; needs at least two numeric columns.
pub fn correlation_matrix(df: &DataFrame, method: CorrelationMethod) -> EdaResult<CorrelationMatrix> {
    let classes = classify(df);
    classes.require_numeric(2)?;

    let data: Vec<Vec<Option<f64>>> = classes
        .numeric
        .iter()
        .map(|name| optional_numeric_values(column_series(df, name)?))
        .collect::<EdaResult<_>>()?;

    let n = classes.numeric.len();
    let mut correlations = vec![vec![1.0; n]; n];
    let mut sample_sizes = vec![vec![0; n]; n];

    for i in 0..n {
        sample_sizes[i][i] = data[i].iter().flatten().count();
        for j in (i + 1)..n {
            // Remove nulls for this pair
            let (x, y): (Vec<f64>, Vec<f64>) = data[i]
                .iter()
                .zip(&data[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            sample_sizes[i][j] = x.len();
            sample_sizes[j][i] = x.len();

            let r = if x.len() < 2 {
                f64::NAN
            } else {
                match method {
                    CorrelationMethod::Pearson => pearson(&x, &y),
                    CorrelationMethod::Spearman => spearman(&x, &y),
                    CorrelationMethod::Kendall => kendall(&x, &y),
                }
            };
            correlations[i][j] = r;
            correlations[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        method: method.as_str().to_string(),
        columns: classes.numeric,
        correlations,
        sample_sizes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_eq!(quantile_sorted(&sorted, 1.0), 4.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_describe_excludes_missing() {
        let df = df!(
            "age" => [Some(1.0f64), Some(2.0), None, Some(3.0), Some(4.0)],
            "job" => ["a", "b", "c", "d", "e"]
        )
        .unwrap();
        let table = describe(&df).unwrap();
        assert_eq!(table.rows.len(), 1);
        let age = table.get("age").unwrap();
        assert_eq!(age.count, 4);
        assert_eq!(age.mean, 2.5);
        assert!((age.std - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(age.min, 1.0);
        assert_eq!(age.q25, 1.75);
        assert_eq!(age.q50, 2.5);
        assert_eq!(age.q75, 3.25);
        assert_eq!(age.max, 4.0);
    }

    #[test]
    fn test_describe_single_value_has_nan_std() {
        let df = df!("x" => [Some(7i64), None]).unwrap();
        let table = describe(&df).unwrap();
        let x = table.get("x").unwrap();
        assert_eq!(x.count, 1);
        assert!(x.std.is_nan());
        assert_eq!(x.q50, 7.0);
    }

    #[test]
    fn test_describe_without_numeric_columns_is_empty() {
        let df = df!("job" => ["a", "b"]).unwrap();
        let table = describe(&df).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.to_dataframe().unwrap().height(), 0);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let df = df!("v" => [Some(0.0f64), Some(1.0), Some(2.0), Some(10.0), None]).unwrap();
        let hist = histogram(&df, "v", 5).unwrap();
        assert_eq!(hist.edges.len(), 6);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts, vec![2, 1, 0, 0, 1]);
        assert!(matches!(
            histogram(&df, "v", 0),
            Err(EdaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_histogram_constant_column() {
        let df = df!("v" => [3i64, 3, 3]).unwrap();
        let hist = histogram(&df, "v", 4).unwrap();
        assert_eq!(hist.edges[0], 2.5);
        assert_eq!(hist.edges[4], 3.5);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_box_stats_by_category() {
        let df = df!(
            "duration" => [1.0f64, 2.0, 3.0, 4.0, 100.0, 5.0, 6.0],
            "y" => ["no", "no", "no", "no", "no", "yes", "yes"]
        )
        .unwrap();
        let summary = box_stats_by_category(&df, "duration", "y").unwrap();
        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.groups[0].category, "no");
        let no = summary.get("no").unwrap();
        assert_eq!(no.count, 5);
        assert_eq!(no.median, 3.0);
        assert!(no.q1 <= no.median && no.median <= no.q3);
        assert_eq!(no.outliers, 1);
        assert_eq!(no.upper_whisker, 4.0);
        assert_eq!(no.max, 100.0);
    }

    #[test]
    fn test_correlation_methods() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let z: Vec<f64> = x.iter().map(|v| -2.0 * v + 1.0).collect();
        let df = DataFrame::new(vec![
            Column::new("x".into(), x),
            Column::new("y".into(), y),
            Column::new("z".into(), z),
        ])
        .unwrap();

        let pearson = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
        assert_eq!(pearson.columns, vec!["x", "y", "z"]);
        assert!((pearson.get("x", "z").unwrap() + 1.0).abs() < 1e-9);
        assert!(pearson.get("x", "y").unwrap() < 1.0);
        assert_eq!(pearson.get("y", "y"), Some(1.0));
        assert_eq!(pearson.get("x", "y"), pearson.get("y", "x"));

        let spearman = correlation_matrix(&df, CorrelationMethod::Spearman).unwrap();
        assert!((spearman.get("x", "y").unwrap() - 1.0).abs() < 1e-9);

        let kendall = correlation_matrix(&df, CorrelationMethod::Kendall).unwrap();
        assert!((kendall.get("x", "y").unwrap() - 1.0).abs() < 1e-9);
        assert!((kendall.get("x", "z").unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let df = df!("x" => [1.0f64, 2.0], "job" => ["a", "b"]).unwrap();
        let err = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap_err();
        assert!(err.is_warning());
    }

    /// Tau-b straight from the pair definition.
    fn kendall_by_pairs(x: &[f64], y: &[f64]) -> f64 {
        let (mut concordant, mut discordant, mut only_x, mut only_y) = (0i64, 0i64, 0i64, 0i64);
        for i in 0..x.len() {
            for j in (i + 1)..x.len() {
                let (dx, dy) = (x[i] - x[j], y[i] - y[j]);
                if dx == 0.0 && dy == 0.0 {
                    continue;
                } else if dx == 0.0 {
                    only_x += 1;
                } else if dy == 0.0 {
                    only_y += 1;
                } else if (dx > 0.0) == (dy > 0.0) {
                    concordant += 1;
                } else {
                    discordant += 1;
                }
            }
        }
        let pairs = concordant + discordant;
        (concordant - discordant) as f64 / (((pairs + only_x) * (pairs + only_y)) as f64).sqrt()
    }

    #[test]
    fn test_kendall_with_ties() {
        let tau = kendall(&[12.0, 2.0, 1.0, 12.0, 2.0], &[1.0, 4.0, 7.0, 1.0, 0.0]);
        assert!((tau + 0.471_404_520_791_031_7).abs() < 1e-12);

        let x: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        let y: Vec<f64> = (0..40).map(|i| ((i * 3) % 5) as f64).collect();
        assert!((kendall(&x, &y) - kendall_by_pairs(&x, &y)).abs() < 1e-12);
        assert!((kendall(&x, &y) - 0.036_247_325_599_810_6).abs() < 1e-12);

        assert!(kendall(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_kendall_on_many_rows() {
        let x: Vec<f64> = (0..50_000).map(|i| ((i * 7919) % 1000) as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        assert!((kendall(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_cells_are_missing() {
        let df = df!(
            "v" => [Some(1.0f64), Some(f64::NAN), Some(3.0), None],
            "w" => [2.0f64, 4.0, 6.0, 8.0]
        )
        .unwrap();
        let v = describe(&df).unwrap().get("v").unwrap().clone();
        assert_eq!(v.count, 2);
        assert_eq!(v.mean, 2.0);
        assert!(!v.std.is_nan());

        let hist = histogram(&df, "v", 2).unwrap();
        assert_eq!(hist.counts, vec![1, 1]);

        let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
        assert_eq!(matrix.sample_sizes[0][1], 2);
        assert!((matrix.get("v", "w").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_ranks_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0]), vec![1.5, 3.0, 1.5]);
    }
}
