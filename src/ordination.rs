//! Ordination Adapter
//!
//! NMDS runs in an external process (an R script by default). The adapter
//! knows nothing about the algorithm; it only enforces the file contract:
//!
//! - invocation: `<program> [args...] <csv_path> <output_dir>`
//! - success: exit status 0, a JSON metrics object with a numeric
//!   `stress_value`, and an SVG plot, both in the artifact directory
//! - anything else is an `Ordination` error carrying the process output

use crate::config::OrdinationConfig;
use crate::error::SurveyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Metrics key every ordination run must report
pub const STRESS_KEY: &str = "stress_value";

/// Validated output of an ordination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinationResult {
    pub stress_value: f64,
    /// Full metrics mapping as written by the process
    pub metrics: BTreeMap<String, Value>,
    pub metrics_path: PathBuf,
    pub plot_path: PathBuf,
}

/// Capability: turn a survey CSV into ordination artifacts
pub trait OrdinationRunner: Send + Sync {
    fn run(&self, csv_path: &Path, output_dir: &Path) -> Result<OrdinationResult, SurveyError>;
}

/// Run an ordination through any runner
pub fn run_ordination(
    runner: &dyn OrdinationRunner,
    csv_path: &Path,
    output_dir: &Path,
) -> Result<OrdinationResult, SurveyError> {
    info!("Running ordination for {}", csv_path.display());
    let result = runner.run(csv_path, output_dir)?;
    info!("Ordination stress: {:.4}", result.stress_value);
    Ok(result)
}

/// Where the external process leaves its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Subdirectory of the output directory, if the process uses one
    pub subdir: Option<PathBuf>,
    pub metrics_file: String,
    pub plot_file: String,
}

impl ArtifactLayout {
    pub fn dir(&self, output_dir: &Path) -> PathBuf {
        match &self.subdir {
            Some(sub) => output_dir.join(sub),
            None => output_dir.to_path_buf(),
        }
    }

    pub fn metrics_path(&self, output_dir: &Path) -> PathBuf {
        self.dir(output_dir).join(&self.metrics_file)
    }

    pub fn plot_path(&self, output_dir: &Path) -> PathBuf {
        self.dir(output_dir).join(&self.plot_file)
    }

    /// Check both artifacts and parse the metrics
    pub fn read(&self, output_dir: &Path) -> Result<OrdinationResult, SurveyError> {
        let metrics_path = self.metrics_path(output_dir);
        let plot_path = self.plot_path(output_dir);

        if !metrics_path.is_file() {
            return Err(SurveyError::ordination(format!(
                "metrics artifact missing: {}",
                metrics_path.display()
            )));
        }
        if !plot_path.is_file() {
            return Err(SurveyError::ordination(format!(
                "plot artifact missing: {}",
                plot_path.display()
            )));
        }

        let contents = fs::read_to_string(&metrics_path).map_err(|e| {
            SurveyError::ordination(format!("cannot read {}: {}", metrics_path.display(), e))
        })?;
        let metrics = parse_metrics(&contents)?;
        let stress_value = metrics
            .get(STRESS_KEY)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                SurveyError::ordination(format!(
                    "metrics artifact has no numeric '{}' field",
                    STRESS_KEY
                ))
            })?;

        Ok(OrdinationResult {
            stress_value,
            metrics,
            metrics_path,
            plot_path,
        })
    }

    /// Delete artifacts left by an earlier run
    ///
    /// An artifact that exists but cannot be removed is an error: it would
    /// otherwise satisfy the contract for a run that wrote nothing.
    fn remove_stale(&self, output_dir: &Path) -> Result<(), SurveyError> {
        for path in [self.metrics_path(output_dir), self.plot_path(output_dir)] {
            if !path.exists() {
                continue;
            }
            fs::remove_file(&path).map_err(|e| {
                SurveyError::ordination(format!(
                    "cannot remove stale artifact {}: {}",
                    path.display(),
                    e
                ))
            })?;
            debug!("Removed stale ordination artifact {}", path.display());
        }
        Ok(())
    }
}

/// Parse the metrics artifact; must be a JSON object
pub fn parse_metrics(contents: &str) -> Result<BTreeMap<String, Value>, SurveyError> {
    serde_json::from_str(contents)
        .map_err(|e| SurveyError::ordination(format!("malformed metrics artifact: {}", e)))
}

/// Ordination delegated to an external command
#[derive(Debug, Clone)]
pub struct SubprocessOrdination {
    program: String,
    args: Vec<String>,
    layout: ArtifactLayout,
}

impl SubprocessOrdination {
    pub fn new(program: impl Into<String>, args: Vec<String>, layout: ArtifactLayout) -> Self {
        Self {
            program: program.into(),
            args,
            layout,
        }
    }

    pub fn from_config(config: &OrdinationConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.layout())
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }
}

impl OrdinationRunner for SubprocessOrdination {
    fn run(&self, csv_path: &Path, output_dir: &Path) -> Result<OrdinationResult, SurveyError> {
        self.layout.remove_stale(output_dir)?;

        debug!(
            "Invoking {} {:?} {} {}",
            self.program,
            self.args,
            csv_path.display(),
            output_dir.display()
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(csv_path)
            .arg(output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| SurveyError::ordination(format!("cannot start '{}': {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = format!("{}{}", stdout, stderr).trim().to_string();

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {}", c));
            return Err(SurveyError::Ordination {
                message: format!("'{}' failed with {}", self.program, status),
                diagnostics,
            });
        }

        self.layout.read(output_dir).map_err(|err| match err {
            SurveyError::Ordination { message, .. } => SurveyError::Ordination {
                message,
                diagnostics,
            },
            other => other,
        })
    }
}
