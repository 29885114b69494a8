//! Report Renderer
//!
//! Turns aggregates into a `ReportContext`. Pure: no I/O, no clock, no hash
//! iteration, so the same inputs always give the same context.

use crate::aggregate::{BatchAggregate, SurveyAggregate};
use crate::classify::Classification;
use crate::model::RejectedRow;
use crate::ordination::OrdinationResult;
use crate::report::types::*;
use std::path::{Component, Path};

/// Pie chart palette, one color per slice (cycled)
const CHART_COLORS: [&str; 5] = ["#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f"];

/// Presentation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub top_species_limit: usize,
    pub chart_slices: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_species_limit: 50,
            chart_slices: 5,
        }
    }
}

/// Everything `render` reads
pub struct RenderInput<'a> {
    pub title: &'a str,
    pub aggregate: &'a BatchAggregate,
    pub classification: &'a Classification,
    pub rejected: &'a [RejectedRow],
    pub ordination: Option<&'a OrdinationResult>,
    /// Directory the report is written to; artifact links are relative to it
    pub report_dir: &'a Path,
}

/// Build the render-ready report
pub fn render(input: &RenderInput<'_>, options: &RenderOptions) -> ReportContext {
    let agg = input.aggregate;
    let ranked = agg.species.ranked();

    let overall = OverallSummary {
        record_count: agg.record_count,
        unique_survey_count: agg.unique_survey_count(),
        unique_species_count: agg.unique_species_count(),
        total_domin_score: agg.total_domin_score,
        avg_domin_per_species: agg.avg_domin_per_species(),
        top_species: agg.top_species.clone(),
    };

    let dominance_chart = ranked
        .iter()
        .take(options.chart_slices)
        .enumerate()
        .map(|(i, r)| ChartSlice {
            species: r.species.clone(),
            score: r.score,
            share_pct: share(r.score, agg.total_domin_score),
            color: CHART_COLORS[i % CHART_COLORS.len()].to_string(),
        })
        .collect();

    let surveys: Vec<SurveySummary> = agg
        .surveys_by_id()
        .into_iter()
        .map(|survey| summarize_survey(survey, input.classification))
        .collect();

    let mut richness: Vec<RichnessRow> = surveys
        .iter()
        .map(|s| RichnessRow {
            releve_id: s.releve_id,
            species_count: s.species_count,
        })
        .collect();
    // surveys are already id-ascending; stable sort keeps that for ties
    richness.sort_by(|a, b| b.species_count.cmp(&a.species_count));

    let groups = input
        .classification
        .groups
        .iter()
        .map(|group| GroupSummary {
            name: group.name.clone(),
            survey_ids: group.survey_ids.clone(),
            total_domin: group.total,
            unique_species_count: group.unique_species_count(),
            top_species: group.top_species.clone(),
            leading_species: group
                .species
                .ranked()
                .into_iter()
                .take(options.chart_slices)
                .collect(),
        })
        .collect();

    let warnings = input
        .classification
        .warnings
        .iter()
        .map(|w| w.to_string())
        .chain(input.rejected.iter().map(|r| {
            format!(
                "skipped row {} ({} = {:?}: {})",
                r.row, r.column, r.value, r.reason
            )
        }))
        .collect();

    ReportContext {
        title: input.title.to_string(),
        overall,
        ranked_species: ranked.into_iter().take(options.top_species_limit).collect(),
        dominance_chart,
        richness,
        surveys,
        groups,
        warnings,
        ordination: input
            .ordination
            .map(|result| summarize_ordination(result, input.report_dir)),
    }
}

fn summarize_survey(survey: &SurveyAggregate, classification: &Classification) -> SurveySummary {
    let composition = survey
        .composition
        .ranked()
        .into_iter()
        .map(|r| CompositionEntry {
            share_pct: share(r.score, survey.total),
            species: r.species,
            score: r.score,
        })
        .collect();

    SurveySummary {
        releve_id: survey.releve_id,
        group: classification
            .group_of(survey.releve_id)
            .unwrap_or_default()
            .to_string(),
        species_count: survey.species_count(),
        total_domin: survey.total,
        max_species: survey.max_record.species_name().to_string(),
        max_score: survey.max_record.domin_score(),
        composition,
    }
}

fn summarize_ordination(result: &OrdinationResult, report_dir: &Path) -> OrdinationSummary {
    OrdinationSummary {
        stress_value: result.stress_value,
        stress_label: stress_label(result.stress_value).to_string(),
        plot_path: relative_link(&result.plot_path, report_dir),
        metrics: result.metrics.clone(),
    }
}

/// Link to `path` from a document in `base`, with `/` separators
///
/// Paths outside `base` are kept as they are.
fn relative_link(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

/// Kruskal's rule-of-thumb reading of NMDS stress
pub fn stress_label(stress: f64) -> &'static str {
    match stress {
        s if s < 0.05 => "Excellent",
        s if s < 0.10 => "Good",
        s if s < 0.20 => "Fair",
        _ => "Poor",
    }
}

fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
