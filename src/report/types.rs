use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::utils::RankedSpecies;

/// Complete, render-ready report for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    pub title: String,
    pub overall: OverallSummary,
    /// Species by combined score, truncated to the configured limit
    pub ranked_species: Vec<RankedSpecies>,
    pub dominance_chart: Vec<ChartSlice>,
    /// Relevés by distinct-species count, richest first
    pub richness: Vec<RichnessRow>,
    /// Relevés by ascending numeric id
    pub surveys: Vec<SurveySummary>,
    /// Non-empty management groups in scheme order
    pub groups: Vec<GroupSummary>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordination: Option<OrdinationSummary>,
}

/// Batch-wide totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub record_count: usize,
    pub unique_survey_count: usize,
    pub unique_species_count: usize,
    pub total_domin_score: f64,
    pub avg_domin_per_species: f64,
    pub top_species: RankedSpecies,
}

/// One slice of the dominance pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub species: String,
    pub score: f64,
    /// Share of the whole batch's score (0-100)
    pub share_pct: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichnessRow {
    pub releve_id: i64,
    pub species_count: usize,
}

/// Per-relevé breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub releve_id: i64,
    pub group: String,
    pub species_count: usize,
    pub total_domin: f64,
    pub max_species: String,
    pub max_score: f64,
    /// Species by descending score; ties keep first-seen order
    pub composition: Vec<CompositionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub species: String,
    pub score: f64,
    /// Share of the relevé's score (0-100)
    pub share_pct: f64,
}

/// Per-management-group breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub survey_ids: Vec<i64>,
    pub total_domin: f64,
    pub unique_species_count: usize,
    pub top_species: RankedSpecies,
    pub leading_species: Vec<RankedSpecies>,
}

/// NMDS results merged into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinationSummary {
    pub stress_value: f64,
    pub stress_label: String,
    /// Plot location relative to the report's directory
    pub plot_path: String,
    pub metrics: BTreeMap<String, Value>,
}

impl OrdinationSummary {
    /// Metrics other than the stress value, in key order
    pub fn extra_metrics(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.metrics
            .iter()
            .filter(|(key, _)| key.as_str() != crate::ordination::STRESS_KEY)
    }
}
