//! Record Model
//!
//! Canonical survey observations and the validated batch they form.
//!
//! `ingest` is the only way raw rows become records: it checks the header
//! before touching any row, then converts each row in order. In strict mode
//! the first bad row aborts the run; in lenient mode bad rows are recorded
//! and skipped.

use crate::data::RawTable;
use crate::error::SurveyError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const COL_RELEVE_ID: &str = "RELEVE_ID";
pub const COL_SPECIES_NAME: &str = "SPECIES_NAME";
pub const COL_DOMIN: &str = "DOMIN";

/// Columns every input must carry
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_RELEVE_ID, COL_SPECIES_NAME, COL_DOMIN];

/// One species observation within a relevé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    releve_id: i64,
    species_name: String,
    domin_score: f64,
}

/// Why a candidate record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRejection {
    EmptySpeciesName,
    NegativeScore,
    NonFiniteScore,
}

impl RecordRejection {
    pub fn column(&self) -> &'static str {
        match self {
            RecordRejection::EmptySpeciesName => COL_SPECIES_NAME,
            RecordRejection::NegativeScore | RecordRejection::NonFiniteScore => COL_DOMIN,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RecordRejection::EmptySpeciesName => "species name is empty",
            RecordRejection::NegativeScore => "score is negative",
            RecordRejection::NonFiniteScore => "score is not a finite number",
        }
    }
}

impl SurveyRecord {
    /// Build a record, enforcing the record invariants
    pub fn try_new(
        releve_id: i64,
        species_name: impl Into<String>,
        domin_score: f64,
    ) -> Result<Self, RecordRejection> {
        let species_name = species_name.into().trim().to_string();
        if species_name.is_empty() {
            return Err(RecordRejection::EmptySpeciesName);
        }
        if !domin_score.is_finite() {
            return Err(RecordRejection::NonFiniteScore);
        }
        if domin_score < 0.0 {
            return Err(RecordRejection::NegativeScore);
        }

        Ok(Self {
            releve_id,
            species_name,
            domin_score,
        })
    }

    pub fn releve_id(&self) -> i64 {
        self.releve_id
    }

    pub fn species_name(&self) -> &str {
        &self.species_name
    }

    pub fn domin_score(&self) -> f64 {
        self.domin_score
    }
}

/// A row that lenient ingestion skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

impl RejectedRow {
    fn into_error(self) -> SurveyError {
        SurveyError::Parse {
            row: self.row,
            column: self.column,
            value: self.value,
            reason: self.reason,
        }
    }
}

/// Ordered, validated observations for one analysis run
#[derive(Debug, Clone, Default)]
pub struct SurveyBatch {
    records: Vec<SurveyRecord>,
    rejected: Vec<RejectedRow>,
}

impl SurveyBatch {
    pub fn from_records(records: Vec<SurveyRecord>) -> Self {
        Self {
            records,
            rejected: Vec::new(),
        }
    }

    /// Records in input order
    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    /// Rows skipped by lenient ingestion, in input order
    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ingestion behaviour for malformed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Abort on the first malformed row (otherwise skip and record it)
    pub strict: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Convert raw rows into a `SurveyBatch`
///
/// Fails with `Schema` before reading any row if a required column is
/// missing. Input order is preserved.
pub fn ingest(table: &RawTable, options: &IngestOptions) -> Result<SurveyBatch, SurveyError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SurveyError::Schema { missing });
    }

    let mut batch = SurveyBatch {
        records: Vec::with_capacity(table.len()),
        rejected: Vec::new(),
    };

    for row in 0..table.len() {
        match parse_row(table, row) {
            Ok(record) => batch.records.push(record),
            Err(rejected) if options.strict => return Err(rejected.into_error()),
            Err(rejected) => {
                warn!(
                    "Skipping row {}: {} = {:?} ({})",
                    rejected.row, rejected.column, rejected.value, rejected.reason
                );
                batch.rejected.push(rejected);
            }
        }
    }

    debug!(
        "Ingested {} records ({} rows skipped)",
        batch.records.len(),
        batch.rejected.len()
    );

    Ok(batch)
}

fn parse_row(table: &RawTable, row: usize) -> Result<SurveyRecord, RejectedRow> {
    let reject = |column: &str, value: &str, reason: &str| RejectedRow {
        row,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let raw_id = table.get(row, COL_RELEVE_ID).unwrap_or("").trim();
    if raw_id.is_empty() {
        return Err(reject(COL_RELEVE_ID, raw_id, "relevé id is empty"));
    }
    let releve_id: i64 = raw_id
        .parse()
        .map_err(|_| reject(COL_RELEVE_ID, raw_id, "not an integer"))?;

    let species = table.get(row, COL_SPECIES_NAME).unwrap_or("");

    let raw_domin = table.get(row, COL_DOMIN).unwrap_or("").trim();
    let domin: f64 = raw_domin
        .parse()
        .map_err(|_| reject(COL_DOMIN, raw_domin, "not a number"))?;

    SurveyRecord::try_new(releve_id, species, domin).map_err(|rejection| {
        let value = match rejection.column() {
            COL_SPECIES_NAME => species,
            _ => raw_domin,
        };
        reject(rejection.column(), value, rejection.reason())
    })
}
