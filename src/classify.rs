//! Management Classifier
//!
//! Partitions relevés into management groups by id band and aggregates each
//! group separately. The bands are configuration: a list of inclusive
//! `(name, lower, upper)` ranges plus a default group that catches every id
//! outside them, so every relevé lands in exactly one group.

use crate::error::{EmptyGroupWarning, SurveyError};
use crate::model::SurveyBatch;
use crate::utils::{RankedSpecies, SpeciesTotals};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GRAZING_FERTILISER: &str = "Grazing+Fertiliser";
pub const MOWING_FERTILISER: &str = "Mowing+Fertiliser";
pub const ORGANIC: &str = "Organic";

/// Inclusive relevé id range mapped to a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementBand {
    pub name: String,
    pub lower: i64,
    pub upper: i64,
}

impl ManagementBand {
    pub fn new(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }

    pub fn contains(&self, releve_id: i64) -> bool {
        (self.lower..=self.upper).contains(&releve_id)
    }
}

/// Id bands plus the catch-all group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationScheme {
    pub bands: Vec<ManagementBand>,
    pub default_group: String,
}

impl Default for ClassificationScheme {
    fn default() -> Self {
        Self {
            bands: vec![
                ManagementBand::new(GRAZING_FERTILISER, 1, 10),
                ManagementBand::new(MOWING_FERTILISER, 28, 38),
            ],
            default_group: ORGANIC.to_string(),
        }
    }
}

impl ClassificationScheme {
    /// Reject schemes that would break the partition
    pub fn validate(&self) -> Result<(), SurveyError> {
        for band in &self.bands {
            if band.lower > band.upper {
                return Err(SurveyError::config(format!(
                    "band '{}' has lower bound {} above upper bound {}",
                    band.name, band.lower, band.upper
                )));
            }
            if band.name == self.default_group {
                return Err(SurveyError::config(format!(
                    "band '{}' reuses the default group name",
                    band.name
                )));
            }
        }

        for (i, a) in self.bands.iter().enumerate() {
            for b in &self.bands[i + 1..] {
                if a.name == b.name {
                    return Err(SurveyError::config(format!(
                        "band name '{}' is used twice",
                        a.name
                    )));
                }
                if a.lower <= b.upper && b.lower <= a.upper {
                    return Err(SurveyError::config(format!(
                        "bands '{}' and '{}' overlap",
                        a.name, b.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Group name for a relevé id
    pub fn group_for(&self, releve_id: i64) -> &str {
        match self.bands.get(self.slot_for(releve_id)) {
            Some(band) => &band.name,
            None => &self.default_group,
        }
    }

    /// Position of the group in `group_names()` order
    fn slot_for(&self, releve_id: i64) -> usize {
        self.bands
            .iter()
            .position(|band| band.contains(releve_id))
            .unwrap_or(self.bands.len())
    }

    /// Every group name: bands in declaration order, then the default
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.bands
            .iter()
            .map(|band| band.name.as_str())
            .chain(std::iter::once(self.default_group.as_str()))
    }
}

/// Aggregates scoped to one management group
#[derive(Debug, Clone)]
pub struct GroupAggregate {
    pub name: String,
    /// Member relevé ids, ascending
    pub survey_ids: Vec<i64>,
    pub species: SpeciesTotals,
    pub top_species: RankedSpecies,
    pub total: f64,
}

impl GroupAggregate {
    pub fn unique_species_count(&self) -> usize {
        self.species.len()
    }
}

/// Result of partitioning a batch
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Non-empty groups in scheme order
    pub groups: Vec<GroupAggregate>,
    pub warnings: Vec<EmptyGroupWarning>,
}

impl Classification {
    pub fn group(&self, name: &str) -> Option<&GroupAggregate> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group holding a relevé, if that relevé was classified
    pub fn group_of(&self, releve_id: i64) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.survey_ids.binary_search(&releve_id).is_ok())
            .map(|g| g.name.as_str())
    }
}

#[derive(Default)]
struct GroupAccumulator {
    survey_ids: FxHashSet<i64>,
    species: SpeciesTotals,
    total: f64,
}

/// Partition a batch into management groups and aggregate each one
///
/// Groups without members are left out and reported as warnings.
pub fn classify(batch: &SurveyBatch, scheme: &ClassificationScheme) -> Classification {
    let mut accumulators: Vec<GroupAccumulator> = scheme
        .group_names()
        .map(|_| GroupAccumulator::default())
        .collect();

    for record in batch.records() {
        let acc = &mut accumulators[scheme.slot_for(record.releve_id())];
        acc.species.add(record.species_name(), record.domin_score());
        acc.total += record.domin_score();
        acc.survey_ids.insert(record.releve_id());
    }

    let mut classification = Classification::default();
    for (name, acc) in scheme.group_names().zip(accumulators) {
        let Some(top_species) = acc.species.top() else {
            debug!("Management group '{}' has no member surveys", name);
            classification.warnings.push(EmptyGroupWarning {
                group: name.to_string(),
            });
            continue;
        };
        let mut survey_ids: Vec<i64> = acc.survey_ids.into_iter().collect();
        survey_ids.sort_unstable();
        classification.groups.push(GroupAggregate {
            name: name.to_string(),
            survey_ids,
            species: acc.species,
            top_species,
            total: acc.total,
        });
    }

    classification
}
