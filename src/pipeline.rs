//! Survey Reporter - run coordinator
//!
//! Wires the stages together for one input file:
//! load → ingest → aggregate → classify → (ordination) → render → write.
//!
//! A run is all-or-nothing: every fatal error surfaces before the writer is
//! called, so either a complete report is written or nothing is. Runs share
//! no mutable state, which is what lets `run_many` fan them out with Rayon.

use crate::aggregate::{aggregate, BatchAggregate};
use crate::classify::{classify, Classification};
use crate::config::ReportConfig;
use crate::data::RawTable;
use crate::error::{EmptyGroupWarning, SurveyError};
use crate::model::{ingest, IngestOptions};
use crate::ordination::{run_ordination, OrdinationRunner, SubprocessOrdination};
use crate::output::ReportWriter;
use crate::report::{render, RenderInput, RenderOptions, ReportContext};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input: PathBuf,
    pub report_path: PathBuf,
    pub report: ReportContext,
    pub warnings: Vec<EmptyGroupWarning>,
}

/// Analysis without the final write
#[derive(Debug, Clone)]
pub struct Analysis {
    pub aggregate: BatchAggregate,
    pub classification: Classification,
    pub report: ReportContext,
}

/// Main report coordinator
pub struct SurveyReporter {
    config: ReportConfig,
    runner: Option<Box<dyn OrdinationRunner>>,
}

impl SurveyReporter {
    /// Reporter using the configured subprocess for ordination
    pub fn new(config: ReportConfig) -> Result<Self, SurveyError> {
        config.validate()?;
        let runner: Option<Box<dyn OrdinationRunner>> = if config.ordination.enabled {
            Some(Box::new(SubprocessOrdination::from_config(&config.ordination)))
        } else {
            None
        };
        Ok(Self { config, runner })
    }

    /// Replace the ordination runner (e.g. with an in-process stub)
    pub fn with_runner(mut self, runner: Box<dyn OrdinationRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn writer_for(&self, input: &Path) -> ReportWriter {
        ReportWriter::new(self.config.output_dir_for(input), self.config.format)
    }

    /// Analyze one input file and build its report without writing it
    pub fn analyze(&self, input: &Path) -> Result<Analysis, SurveyError> {
        let table = RawTable::load_csv(input)?;
        info!("Loaded {} rows from {}", table.len(), input.display());

        let batch = ingest(
            &table,
            &IngestOptions {
                strict: self.config.strict,
            },
        )?;
        if !batch.rejected().is_empty() {
            warn!("{} malformed rows skipped", batch.rejected().len());
        }

        let aggregate = aggregate(&batch)?;
        info!(
            "Aggregated {} records: {} surveys, {} species",
            aggregate.record_count,
            aggregate.unique_survey_count(),
            aggregate.unique_species_count()
        );

        let classification = classify(&batch, &self.config.classification);
        for warning in &classification.warnings {
            warn!("{}", warning);
        }

        let writer = self.writer_for(input);
        let ordination = if self.config.ordination.enabled {
            let runner = self.runner.as_deref().ok_or_else(|| {
                SurveyError::ordination("ordination is enabled but no runner is configured")
            })?;
            let ordination_dir = writer.ensure_ordination_dir(input)?;
            Some(run_ordination(runner, input, &ordination_dir)?)
        } else {
            None
        };

        let title = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let report = render(
            &RenderInput {
                title: &title,
                aggregate: &aggregate,
                classification: &classification,
                rejected: batch.rejected(),
                ordination: ordination.as_ref(),
                report_dir: writer.output_dir(),
            },
            &RenderOptions {
                top_species_limit: self.config.top_species_limit,
                chart_slices: self.config.chart_slices,
            },
        );

        Ok(Analysis {
            aggregate,
            classification,
            report,
        })
    }

    /// Analyze one input file and write its report
    pub fn run(&self, input: &Path) -> Result<RunSummary, SurveyError> {
        let analysis = self.analyze(input)?;
        let report_path = self.writer_for(input).write(input, &analysis.report)?;

        Ok(RunSummary {
            input: input.to_path_buf(),
            report_path,
            report: analysis.report,
            warnings: analysis.classification.warnings,
        })
    }

    /// Run several independent inputs in parallel; results keep input order
    pub fn run_many(&self, inputs: &[PathBuf]) -> Vec<Result<RunSummary, SurveyError>> {
        inputs.par_iter().map(|input| self.run(input)).collect()
    }
}
