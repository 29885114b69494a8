//! Relevé Report
//!
//! Turns vegetation-survey CSVs (one row per species observation within a
//! relevé) into aggregate statistics and a rendered report, optionally
//! enriched with an externally computed NMDS ordination.
//!
//! Pipeline, leaves first:
//! - `model`: validated records and `ingest`
//! - `aggregate`: species and per-relevé totals
//! - `classify`: management-group partition and per-group totals
//! - `ordination`: external NMDS process contract
//! - `report`: render-ready context and formatters
//! - `pipeline`: one-run coordinator (`SurveyReporter`)

pub mod error;
pub mod config;
pub mod utils;
pub mod data;
pub mod model;
pub mod aggregate;
pub mod classify;
pub mod ordination;
pub mod report;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use error::{EmptyGroupWarning, SurveyError};
pub use config::{OrdinationConfig, ReportConfig, ReportFormat};
pub use data::RawTable;
pub use model::{ingest, IngestOptions, SurveyBatch, SurveyRecord};
pub use aggregate::{aggregate, BatchAggregate, SurveyAggregate};
pub use classify::{classify, Classification, ClassificationScheme, GroupAggregate, ManagementBand};
pub use ordination::{run_ordination, OrdinationResult, OrdinationRunner, SubprocessOrdination};
pub use report::{render, RenderInput, RenderOptions, ReportContext};
pub use output::ReportWriter;
pub use pipeline::{RunSummary, SurveyReporter};
