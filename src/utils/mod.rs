//! Utility modules shared by the aggregation stages
//!
//! - Species totals: insertion-ordered species → score accumulation

pub mod species_totals;

pub use species_totals::{RankedSpecies, SpeciesTotals};
