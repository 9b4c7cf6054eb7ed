//! Substring matching strategy
//!
//! Exact, case-insensitive containment over the display form of every
//! extracted field. A record matches when any of its fields contains the
//! query as a substring. Results preserve the input collection's order.

use crate::fields::FieldSet;
use rayon::prelude::*;

/// Lowercased searchable projection of one record
///
/// Built once when the engine is constructed, so keystrokes never pay for
/// re-extraction or case folding.
#[derive(Debug, Clone)]
pub struct Haystack {
    terms: Vec<String>,
}

impl Haystack {
    /// Lowercase the display form of every field in `fields`
    #[must_use]
    pub fn from_fields(fields: &FieldSet) -> Self {
        let terms = fields
            .fields()
            .iter()
            .map(|f| f.value.display_form().to_lowercase())
            .collect();
        Self { terms }
    }

    /// True when any term contains `needle_lower` as a substring
    ///
    /// The needle must already be lowercased.
    #[must_use]
    pub fn contains(&self, needle_lower: &str) -> bool {
        self.terms.iter().any(|t| t.contains(needle_lower))
    }
}

/// Indices of matching records, in input order
///
/// Collections at or above `parallel_min` records scan on the rayon pool;
/// smaller ones stay sequential to skip the fork overhead.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn filter_indices(haystacks: &[Haystack], needle_lower: &str, parallel_min: usize) -> Vec<u32> {
    if haystacks.len() >= parallel_min {
        haystacks
            .par_iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle_lower))
            .map(|(i, _)| i as u32)
            .collect()
    } else {
        haystacks
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle_lower))
            .map(|(i, _)| i as u32)
            .collect()
    }
}
