use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{EdaError, EdaResult};
use crate::loader::{load_delimited, LoadOptions};

/// Holds at most one loaded table.
///
/// A successful load swaps the table in one step; a failed load clears the
/// session, so later requests get [`EdaError::MissingDataset`]. Callers
/// holding an `Arc` from [`Session::table`] keep working on it either way.
#[derive(Debug, Default, Clone)]
pub struct Session {
    table: Option<Arc<DataFrame>>,
    source: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path, options: &LoadOptions) -> EdaResult<Arc<DataFrame>> {
        let df = match load_delimited(path, options) {
            Ok(df) => df,
            Err(e) => {
                if self.is_loaded() {
                    log::warn!("load of {} failed, dropping the previous table", path.display());
                }
                self.clear();
                return Err(e);
            }
        };
        let table = Arc::new(df);
        self.table = Some(Arc::clone(&table));
        self.source = Some(path.to_path_buf());
        log::info!(
            "session table replaced from {} ({} rows)",
            path.display(),
            table.height()
        );
        Ok(table)
    }

    /// Install an already built table with no source path.
    pub fn replace(&mut self, df: DataFrame) -> Arc<DataFrame> {
        let table = Arc::new(df);
        self.table = Some(Arc::clone(&table));
        self.source = None;
        table
    }

    pub fn clear(&mut self) {
        self.table = None;
        self.source = None;
    }

    pub fn table(&self) -> EdaResult<Arc<DataFrame>> {
        self.table.clone().ok_or(EdaError::MissingDataset)
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_empty_session() {
        let session = Session::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.table(), Err(EdaError::MissingDataset)));
    }

    #[test]
    fn test_failed_load_drops_previous_table() {
        let mut session = Session::new();
        let held = session.replace(df!("a" => [1i64, 2]).unwrap());
        let err = session
            .load(Path::new("/definitely/not/here.csv"), &LoadOptions::new())
            .unwrap_err();
        assert!(matches!(err, EdaError::Load { .. }));
        assert!(!session.is_loaded());
        assert!(session.source().is_none());
        assert!(matches!(session.table(), Err(EdaError::MissingDataset)));
        assert_eq!(held.height(), 2);
    }

    #[test]
    fn test_retired_table_stays_usable() {
        let mut session = Session::new();
        let old = session.replace(df!("a" => [1i64, 2, 3]).unwrap());
        session.replace(df!("a" => [9i64]).unwrap());
        assert_eq!(old.height(), 3);
        assert_eq!(session.table().unwrap().height(), 1);
        session.clear();
        assert!(session.table().is_err());
    }
}
