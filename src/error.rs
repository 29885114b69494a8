//! Error taxonomy for survey report runs
//!
//! Every fatal condition of a run maps to one `SurveyError` variant. The only
//! recoverable condition, an empty management group, is a plain value
//! (`EmptyGroupWarning`) collected alongside the results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal error for a single report run
#[derive(Debug, Error)]
pub enum SurveyError {
    /// Required columns are absent from the input header.
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A value could not be converted to its required type.
    #[error(
        "row {} (line {}): column {} has invalid value {:?}: {}",
        .row, .row + 2, .column, .value, .reason
    )]
    Parse {
        /// Zero-based data row index (header excluded)
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// No valid records survived ingestion.
    #[error("no valid survey records found in input")]
    EmptyData,

    /// The external ordination process failed or broke its output contract.
    #[error("ordination failed: {message}")]
    Ordination {
        message: String,
        /// Captured stdout/stderr of the external process (may be empty)
        diagnostics: String,
    },

    /// The rendered report could not be written.
    #[error("failed to write report to {}: {}", .path.display(), .source)]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input source could not be read.
    #[error("failed to read input {}: {}", .path.display(), .message)]
    Input { path: PathBuf, message: String },

    /// The run configuration is invalid.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl SurveyError {
    /// Pipeline stage that produced this error
    pub fn stage(&self) -> &'static str {
        match self {
            SurveyError::Input { .. } => "load",
            SurveyError::Schema { .. } | SurveyError::Parse { .. } => "ingest",
            SurveyError::EmptyData => "aggregate",
            SurveyError::Ordination { .. } => "ordination",
            SurveyError::OutputWrite { .. } => "write",
            SurveyError::Config { .. } => "config",
        }
    }

    pub(crate) fn ordination(message: impl Into<String>) -> Self {
        SurveyError::Ordination {
            message: message.into(),
            diagnostics: String::new(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        SurveyError::Config {
            message: message.into(),
        }
    }
}

/// A management group with no member surveys
///
/// Recorded, never raised: the group is simply left out of the classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyGroupWarning {
    pub group: String,
}

impl fmt::Display for EmptyGroupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "management group '{}' has no member surveys", self.group)
    }
}
