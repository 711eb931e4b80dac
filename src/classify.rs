use polars::prelude::*;
use serde::Serialize;

use crate::error::{EdaError, EdaResult};

/// Partition of a table's columns by declared dtype, each list in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnClasses {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClasses {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }

    /// `EmptyNumericSet` unless at least `required` numeric columns exist.
    pub fn require_numeric(&self, required: usize) -> EdaResult<()> {
        if self.numeric.len() < required {
            return Err(EdaError::EmptyNumericSet {
                required,
                found: self.numeric.len(),
            });
        }
        Ok(())
    }

    /// `EmptyCategoricalSet` unless at least `required` categorical columns exist.
    pub fn require_categorical(&self, required: usize) -> EdaResult<()> {
        if self.categorical.len() < required {
            return Err(EdaError::EmptyCategoricalSet {
                required,
                found: self.categorical.len(),
            });
        }
        Ok(())
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names = Vec::with_capacity(self.numeric.len() + self.categorical.len());
        let mut kinds = Vec::with_capacity(names.capacity());
        for name in &self.numeric {
            names.push(name.clone());
            kinds.push("numeric");
        }
        for name in &self.categorical {
            names.push(name.clone());
            kinds.push("categorical");
        }
        DataFrame::new(vec![
            Column::new("column".into(), names),
            Column::new("class".into(), kinds),
        ])
    }
}

pub(crate) fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Split columns into numeric (integer and float dtypes) and categorical (everything else).
pub fn classify(df: &DataFrame) -> ColumnClasses {
    let mut classes = ColumnClasses::default();
    for column in df.get_columns() {
        let name = column.name().to_string();
        if is_numeric_type(column.dtype()) {
            classes.numeric.push(name);
        } else {
            classes.categorical.push(name);
        }
    }
    classes
}

/// Look up a column by name, mapping absence to `InvalidColumn`.
pub(crate) fn column_series<'a>(df: &'a DataFrame, name: &str) -> EdaResult<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| EdaError::missing_column(name))
}

pub(crate) fn numeric_series<'a>(df: &'a DataFrame, name: &str) -> EdaResult<&'a Series> {
    let series = column_series(df, name)?;
    if !is_numeric_type(series.dtype()) {
        return Err(EdaError::wrong_kind(name, "numeric"));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_order() {
        let df = df!(
            "age" => [30i64, 41, 52],
            "job" => ["admin.", "services", "admin."],
            "balance" => [1.5f64, 2.0, -3.25],
            "default" => [true, false, false]
        )
        .unwrap();
        let classes = classify(&df);
        assert_eq!(classes.numeric, vec!["age", "balance"]);
        assert_eq!(classes.categorical, vec!["job", "default"]);
    }

    #[test]
    fn test_empty_table() {
        let classes = classify(&DataFrame::empty());
        assert!(classes.numeric.is_empty());
        assert!(classes.categorical.is_empty());
    }

    #[test]
    fn test_requirements() {
        let df = df!("job" => ["a", "b"]).unwrap();
        let classes = classify(&df);
        assert!(matches!(
            classes.require_numeric(1),
            Err(EdaError::EmptyNumericSet {
                required: 1,
                found: 0
            })
        ));
        assert!(classes.require_categorical(1).is_ok());
        let err = classes.require_categorical(2).unwrap_err();
        assert!(err.is_warning());
    }

    #[test]
    fn test_numeric_series_rejects_text() {
        let df = df!("job" => ["a", "b"]).unwrap();
        assert!(matches!(
            numeric_series(&df, "job"),
            Err(EdaError::InvalidColumn { .. })
        ));
        assert!(matches!(
            numeric_series(&df, "nope"),
            Err(EdaError::InvalidColumn { .. })
        ));
    }
}
