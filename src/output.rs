//! Report writing
//!
//! The report is formatted in memory, written to a temporary file in the
//! output directory and renamed into place. A failed run therefore never
//! leaves a partial `*_report.*` file behind.

use crate::config::ReportFormat;
use crate::error::SurveyError;
use crate::report::{format_report, ReportContext};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes rendered reports into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/<input stem>_report.<ext>`
    pub fn report_path(&self, input: &Path) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.{}", input_stem(input), self.format.extension()))
    }

    /// `<output_dir>/<input stem>_nmds`, the ordination directory of one input
    ///
    /// Inputs sharing an output directory never share ordination artifacts.
    pub fn ordination_dir(&self, input: &Path) -> PathBuf {
        self.output_dir.join(format!("{}_nmds", input_stem(input)))
    }

    /// Create the ordination directory for `input`; succeeds if it exists
    pub fn ensure_ordination_dir(&self, input: &Path) -> Result<PathBuf, SurveyError> {
        let dir = self.ordination_dir(input);
        fs::create_dir_all(&dir).map_err(|source| SurveyError::OutputWrite {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Create the output directory; succeeds if it already exists
    pub fn ensure_dir(&self) -> Result<(), SurveyError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SurveyError::OutputWrite {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Format and write the report for `input`, returning its path
    pub fn write(&self, input: &Path, report: &ReportContext) -> Result<PathBuf, SurveyError> {
        let path = self.report_path(input);
        let body = format_report(report, self.format).map_err(|e| SurveyError::OutputWrite {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        self.ensure_dir()?;

        let tmp = path.with_extension(format!("{}.tmp", self.format.extension()));
        let result = fs::write(&tmp, body.as_bytes()).and_then(|_| fs::rename(&tmp, &path));
        if let Err(source) = result {
            let _ = fs::remove_file(&tmp);
            return Err(SurveyError::OutputWrite { path, source });
        }

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "survey".to_string())
}
