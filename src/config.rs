//! Run configuration
//!
//! Defaults reproduce the standard report. A JSON file can override any
//! field, then environment variables override the file:
//!
//! - `RELEVE_REPORT_OUTPUT_DIR`: output directory
//! - `RELEVE_REPORT_ORDINATION`: `0`, `false`, `off` or `no` disables ordination

use crate::classify::ClassificationScheme;
use crate::error::SurveyError;
use crate::ordination::ArtifactLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_OUTPUT_DIR: &str = "RELEVE_REPORT_OUTPUT_DIR";
pub const ENV_ORDINATION: &str = "RELEVE_REPORT_ORDINATION";

/// Output format of the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

/// External NMDS process settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdinationConfig {
    pub enabled: bool,
    pub program: String,
    /// Arguments placed before the csv path and output directory
    pub args: Vec<String>,
    pub artifact_subdir: Option<PathBuf>,
    pub metrics_file: String,
    pub plot_file: String,
}

impl Default for OrdinationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "Rscript".to_string(),
            args: vec!["nmds_analysis.R".to_string()],
            artifact_subdir: None,
            metrics_file: "nmds_metrics.json".to_string(),
            plot_file: "nmds_plot.svg".to_string(),
        }
    }
}

impl OrdinationConfig {
    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout {
            subdir: self.artifact_subdir.clone(),
            metrics_file: self.metrics_file.clone(),
            plot_file: self.plot_file.clone(),
        }
    }
}

/// Settings for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report directory; `None` means `reports/` beside the input file
    pub output_dir: Option<PathBuf>,
    pub format: ReportFormat,
    /// Abort on the first malformed row instead of skipping it
    pub strict: bool,
    /// Rows in the ranked species table
    pub top_species_limit: usize,
    /// Slices in the dominance chart and per-group rankings
    pub chart_slices: usize,
    pub classification: ClassificationScheme,
    pub ordination: OrdinationConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: ReportFormat::default(),
            strict: true,
            top_species_limit: 50,
            chart_slices: 5,
            classification: ClassificationScheme::default(),
            ordination: OrdinationConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, SurveyError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SurveyError::config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config: ReportConfig = serde_json::from_str(&contents).map_err(|e| {
            SurveyError::config(format!("cannot parse config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_OUTPUT_DIR).ok(),
            std::env::var(ENV_ORDINATION).ok(),
        )
    }

    fn with_overrides(mut self, output_dir: Option<String>, ordination: Option<String>) -> Self {
        if let Some(dir) = output_dir.filter(|d| !d.trim().is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = ordination {
            self.ordination.enabled = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }
        self
    }

    pub fn validate(&self) -> Result<(), SurveyError> {
        self.classification.validate()?;
        if self.ordination.enabled && self.ordination.program.trim().is_empty() {
            return Err(SurveyError::config("ordination is enabled but no program is set"));
        }
        Ok(())
    }

    /// Directory the report for `input` goes to
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("reports"),
        }
    }
}
