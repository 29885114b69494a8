//! Species Score Accumulator
//!
//! Sums DOMIN scores per species while remembering the order in which each
//! species was first seen. That order is the tie-break for every "top
//! species" and every ranking in the report, so iteration never depends on
//! hash order.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A species with its cumulative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSpecies {
    pub species: String,
    pub score: f64,
}

/// Species name → cumulative score, iterated in first-seen order
#[derive(Debug, Clone, Default)]
pub struct SpeciesTotals {
    entries: Vec<(String, f64)>,
    index: FxHashMap<String, usize>,
}

impl SpeciesTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a score to a species, registering it on first sight
    pub fn add(&mut self, species: &str, score: f64) {
        match self.index.get(species) {
            Some(&i) => self.entries[i].1 += score,
            None => {
                self.index.insert(species.to_string(), self.entries.len());
                self.entries.push((species.to_string(), score));
            }
        }
    }

    pub fn get(&self, species: &str) -> Option<f64> {
        self.index.get(species).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, species: &str) -> bool {
        self.index.contains_key(species)
    }

    /// Number of distinct species
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all species
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, score)| score).sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Highest-scoring species; the earliest-seen species wins a tie
    pub fn top(&self) -> Option<RankedSpecies> {
        let mut best: Option<&(String, f64)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(species, score)| RankedSpecies {
            species: species.clone(),
            score: *score,
        })
    }

    /// All species by descending score
    ///
    /// Stable: equal scores keep first-seen order.
    pub fn ranked(&self) -> Vec<RankedSpecies> {
        let mut ranked: Vec<RankedSpecies> = self
            .entries
            .iter()
            .map(|(species, score)| RankedSpecies {
                species: species.clone(),
                score: *score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}
