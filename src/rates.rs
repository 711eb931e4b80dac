//! Acceptance rate of the campaign target per segment.

use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::categorical::{round4, text_values, value_counts};
use crate::classify::column_series;
use crate::error::{EdaError, EdaResult};

/// Default name of the target column.
pub const TARGET_DEFAULT: &str = "y";

/// The only target value counted as an acceptance (compared case-insensitively).
pub const POSITIVE_LABEL: &str = "yes";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub group: String,
    pub acceptance_rate: f64,
    pub count: u32,
}

/// Per-group acceptance rates, highest rate first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub group_column: String,
    pub target_column: String,
    pub rows: Vec<GroupRate>,
}

impl RateTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, group: &str) -> Option<&GroupRate> {
        self.rows.iter().find(|r| r.group == group)
    }

    /// The `n` highest-rate groups.
    pub fn head(&self, n: usize) -> RateTable {
        RateTable {
            group_column: self.group_column.clone(),
            target_column: self.target_column.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                self.group_column.as_str().into(),
                self.rows.iter().map(|r| r.group.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "acceptance_rate".into(),
                self.rows.iter().map(|r| r.acceptance_rate).collect::<Vec<_>>(),
            ),
            Column::new(
                "count".into(),
                self.rows.iter().map(|r| r.count).collect::<Vec<_>>(),
            ),
        ])
    }
}

/// Target column to use for `df`: [`TARGET_DEFAULT`] when present, else the first column.
pub fn default_target(df: &DataFrame) -> Option<String> {
    let names = df.get_column_names();
    if names.iter().any(|n| n.as_str() == TARGET_DEFAULT) {
        Some(TARGET_DEFAULT.to_string())
    } else {
        names.first().map(|n| n.to_string())
    }
}

fn is_positive(value: &str) -> bool {
    value.to_lowercase() == POSITIVE_LABEL
}

/// Share of rows per `group_column` value whose `target_column` equals "yes".
///
/// Rows missing either value are dropped first; count and rate cover the same
/// population. Groups are visited in ascending key order and then stably sorted
/// by the rounded rate, descending.
pub fn acceptance_rate_by_group(
    df: &DataFrame,
    group_column: &str,
    target_column: &str,
) -> EdaResult<RateTable> {
    let groups = text_values(column_series(df, group_column)?)?;
    let targets = text_values(column_series(df, target_column)?)?;

    let mut kept: Vec<String> = Vec::new();
    let mut accepted: Vec<String> = Vec::new();
    for (group, target) in groups.into_iter().zip(targets) {
        let (Some(group), Some(target)) = (group, target) else {
            continue;
        };
        if is_positive(&target) {
            accepted.push(group.clone());
        }
        kept.push(group);
    }

    if kept.is_empty() {
        return Err(EdaError::EmptyPopulation {
            group: group_column.to_string(),
            target: target_column.to_string(),
        });
    }
    // ascending group order before the stable sort by rate
    let tally: BTreeMap<String, u32> = value_counts(&kept)?.into_iter().collect();
    let positives: HashMap<String, u32> = value_counts(&accepted)?.into_iter().collect();
    log::debug!(
        "acceptance_rate_by_group({}, {}): {} of {} rows kept, {} groups",
        group_column,
        target_column,
        kept.len(),
        df.height(),
        tally.len()
    );

    let mut rows: Vec<GroupRate> = tally
        .into_iter()
        .map(|(group, count)| {
            let positive = positives.get(&group).copied().unwrap_or(0);
            GroupRate {
                acceptance_rate: round4(positive as f64 / count as f64),
                group,
                count,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.acceptance_rate
            .partial_cmp(&a.acceptance_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(RateTable {
        group_column: group_column.to_string(),
        target_column: target_column.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_sorted_descending() {
        let df = df!("g" => ["A", "A", "B"], "y" => ["yes", "no", "yes"]).unwrap();
        let rates = acceptance_rate_by_group(&df, "g", TARGET_DEFAULT).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.rows[0].group, "B");
        assert_eq!(rates.rows[0].acceptance_rate, 1.0);
        assert_eq!(rates.rows[0].count, 1);
        assert_eq!(rates.rows[1].group, "A");
        assert_eq!(rates.rows[1].acceptance_rate, 0.5);
        assert_eq!(rates.rows[1].count, 2);
    }

    #[test]
    fn test_positive_label_is_case_insensitive() {
        let df = df!(
            "g" => ["x", "x", "x", "z"],
            "y" => ["YES", "Yes", "yes", "no"]
        )
        .unwrap();
        let rates = acceptance_rate_by_group(&df, "g", "y").unwrap();
        assert_eq!(rates.get("x").unwrap().acceptance_rate, 1.0);
        assert_eq!(rates.get("z").unwrap().acceptance_rate, 0.0);
    }

    #[test]
    fn test_missing_rows_are_dropped() {
        let df = df!(
            "g" => [Some("a"), None, Some("a"), Some("b")],
            "y" => [Some("yes"), Some("yes"), None, Some("no")]
        )
        .unwrap();
        let rates = acceptance_rate_by_group(&df, "g", "y").unwrap();
        assert!(rates.get("NA").is_none());
        assert_eq!(rates.get("a").unwrap().count, 1);
        assert_eq!(rates.get("b").unwrap().count, 1);
    }

    #[test]
    fn test_ties_follow_key_order() {
        let df = df!("g" => ["m", "c", "k"], "y" => ["no", "no", "no"]).unwrap();
        let rates = acceptance_rate_by_group(&df, "g", "y").unwrap();
        let order: Vec<&str> = rates.rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(order, vec!["c", "k", "m"]);
    }

    #[test]
    fn test_empty_population_and_missing_columns() {
        let df = df!(
            "g" => [Some("a"), None],
            "y" => [None::<&str>, Some("yes")]
        )
        .unwrap();
        assert!(matches!(
            acceptance_rate_by_group(&df, "g", "y"),
            Err(EdaError::EmptyPopulation { .. })
        ));
        assert!(matches!(
            acceptance_rate_by_group(&df, "g", "deposit"),
            Err(EdaError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_default_target() {
        let with_y = df!("age" => [1i64], "y" => ["no"]).unwrap();
        assert_eq!(default_target(&with_y).as_deref(), Some("y"));
        let without = df!("age" => [1i64], "deposit" => ["no"]).unwrap();
        assert_eq!(default_target(&without).as_deref(), Some("age"));
    }
}
