//! Aggregator
//!
//! Single pass over a `SurveyBatch` producing species totals, per-relevé
//! composition and the global counters the report needs.
//!
//! Tie-break rule used throughout: the first record (or species) encountered
//! in input order wins. Everything else is independent of row order.

use crate::error::SurveyError;
use crate::model::{SurveyBatch, SurveyRecord};
use crate::utils::{RankedSpecies, SpeciesTotals};
use rustc_hash::FxHashMap;

/// Aggregates for a single relevé
#[derive(Debug, Clone)]
pub struct SurveyAggregate {
    pub releve_id: i64,
    /// Species → summed score within this relevé, first-seen order
    pub composition: SpeciesTotals,
    /// Highest-scoring record; earliest record wins a tie
    pub max_record: SurveyRecord,
    pub total: f64,
    pub record_count: usize,
}

impl SurveyAggregate {
    fn new(record: &SurveyRecord) -> Self {
        Self {
            releve_id: record.releve_id(),
            composition: SpeciesTotals::new(),
            max_record: record.clone(),
            total: 0.0,
            record_count: 0,
        }
    }

    fn add(&mut self, record: &SurveyRecord) {
        self.composition.add(record.species_name(), record.domin_score());
        if record.domin_score() > self.max_record.domin_score() {
            self.max_record = record.clone();
        }
        self.total += record.domin_score();
        self.record_count += 1;
    }

    pub fn species_count(&self) -> usize {
        self.composition.len()
    }
}

/// Batch-wide aggregates
#[derive(Debug, Clone)]
pub struct BatchAggregate {
    /// Species → summed score over the whole batch, first-seen order
    pub species: SpeciesTotals,
    surveys: Vec<SurveyAggregate>,
    survey_index: FxHashMap<i64, usize>,
    /// Species with the highest combined score
    pub top_species: RankedSpecies,
    pub total_domin_score: f64,
    pub record_count: usize,
}

impl BatchAggregate {
    pub fn unique_species_count(&self) -> usize {
        self.species.len()
    }

    pub fn unique_survey_count(&self) -> usize {
        self.surveys.len()
    }

    pub fn avg_domin_per_species(&self) -> f64 {
        self.total_domin_score / self.unique_species_count() as f64
    }

    /// Relevé aggregates in first-seen order
    pub fn surveys(&self) -> &[SurveyAggregate] {
        &self.surveys
    }

    /// Relevé aggregates by ascending numeric id
    pub fn surveys_by_id(&self) -> Vec<&SurveyAggregate> {
        let mut sorted: Vec<&SurveyAggregate> = self.surveys.iter().collect();
        sorted.sort_by_key(|s| s.releve_id);
        sorted
    }

    pub fn survey(&self, releve_id: i64) -> Option<&SurveyAggregate> {
        self.survey_index.get(&releve_id).map(|&i| &self.surveys[i])
    }

    /// Distinct relevé ids in first-seen order
    pub fn survey_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.surveys.iter().map(|s| s.releve_id)
    }
}

/// Aggregate a batch in one pass
///
/// Fails with `EmptyData` for a batch without records.
pub fn aggregate(batch: &SurveyBatch) -> Result<BatchAggregate, SurveyError> {
    if batch.is_empty() {
        return Err(SurveyError::EmptyData);
    }

    let mut species = SpeciesTotals::new();
    let mut surveys: Vec<SurveyAggregate> = Vec::new();
    let mut survey_index: FxHashMap<i64, usize> = FxHashMap::default();
    let mut total_domin_score = 0.0;

    for record in batch.records() {
        species.add(record.species_name(), record.domin_score());
        total_domin_score += record.domin_score();

        let idx = *survey_index.entry(record.releve_id()).or_insert_with(|| {
            surveys.push(SurveyAggregate::new(record));
            surveys.len() - 1
        });
        surveys[idx].add(record);
    }

    let top_species = species.top().ok_or(SurveyError::EmptyData)?;

    Ok(BatchAggregate {
        species,
        surveys,
        survey_index,
        top_species,
        total_domin_score,
        record_count: batch.len(),
    })
}
