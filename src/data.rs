//! Input loading
//!
//! Reads a survey CSV with Polars into a `RawTable`: the header plus every
//! cell as an optional string. No typing happens here; conversion and
//! validation belong to `model::ingest`.

use crate::error::SurveyError;
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Untyped rows from a tabular source
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<String>,
    index: FxHashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from a header and row-major cells
    ///
    /// Short rows are padded with missing cells; extra cells are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        Self { columns, index, rows }
    }

    /// Load a CSV file, keeping every column as text
    pub fn load_csv(path: &Path) -> Result<Self, SurveyError> {
        let input_error = |e: PolarsError| SurveyError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let metadata = std::fs::metadata(path).map_err(|e| SurveyError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(SurveyError::Input {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        // A zero-byte file has no header; ingest reports every column missing
        if metadata.len() == 0 {
            return Ok(Self::default());
        }

        // Schema inference over zero rows reads every column as String
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.into()))
            .map_err(input_error)?
            .finish()
            .map_err(input_error)?;

        Self::from_dataframe(&df).map_err(input_error)
    }

    fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
        for name in &columns {
            let values = df.column(name)?.str()?;
            for (row, value) in rows.iter_mut().zip(values.into_iter()) {
                row.push(value.map(|s| s.to_string()));
            }
        }

        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row index and column name; `None` for missing cells
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = *self.index.get(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }
}
