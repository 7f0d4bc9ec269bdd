//! Observation merge: fold per-page observations, then sort.
//!
//! Names are trimmed and compared case-insensitively, which is a wider key
//! than the exact name: "Python", " python" and "PYTHON" all land in one
//! entry. The first spelling seen is the one reported. Counts add up
//! (saturating). The output is ordered ascending by count, with ties kept
//! in first-seen order.

use indexmap::IndexMap;

use crate::types::observation::Observation;

/// Running name → count totals for one observation kind.
#[derive(Debug, Clone, Default)]
pub struct ObservationTally {
    entries: IndexMap<String, (String, u32)>,
}

impl ObservationTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn add(&mut self, name: &str, count: u32) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        self.entries
            .entry(name.to_lowercase())
            .and_modify(|(_, total)| *total = total.saturating_add(count))
            .or_insert_with(|| (name.to_string(), count));
    }

    /// Add every observation of a page.
    pub fn extend<'a, O, I>(&mut self, observations: I)
    where
        O: Observation + 'a,
        I: IntoIterator<Item = &'a O>,
    {
        for o in observations {
            self.add(o.name(), o.count());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total for a name, matched the same way as during the fold.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(&name.trim().to_lowercase()).map(|(_, c)| *c)
    }

    /// Emit the totals sorted ascending by count.
    pub fn into_sorted<O: Observation>(self) -> Vec<O> {
        let mut merged: Vec<O> = self
            .entries
            .into_values()
            .map(|(name, count)| O::from_parts(name, count))
            .collect();
        // sort_by_key is stable, so equal counts keep insertion order
        merged.sort_by_key(|o| o.count());
        merged
    }
}

/// Merge observation lists from several pages into one sorted list.
pub fn merge_observations<'a, O, I>(pages: I) -> Vec<O>
where
    O: Observation + 'a,
    I: IntoIterator<Item = &'a [O]>,
{
    let mut tally = ObservationTally::new();
    for page in pages {
        tally.extend(page);
    }
    tally.into_sorted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::{SkillObservation, ValueObservation};
    use proptest::prelude::*;

    fn skills(items: &[(&str, u32)]) -> Vec<SkillObservation> {
        items.iter().map(|(n, c)| SkillObservation::new(*n, *c)).collect()
    }

    #[test]
    fn test_counts_add_up() {
        let a = skills(&[("Python", 3)]);
        let b = skills(&[("Python", 5)]);

        let merged: Vec<SkillObservation> = merge_observations([a.as_slice(), b.as_slice()]);
        assert_eq!(merged, vec![SkillObservation::new("Python", 8)]);
    }

    #[test]
    fn test_sorted_ascending_with_stable_ties() {
        let a = skills(&[("Teamwork", 4), ("Communication", 1), ("Ownership", 2)]);
        let b = skills(&[("Curiosity", 2), ("Communication", 1)]);

        let merged: Vec<SkillObservation> = merge_observations([a.as_slice(), b.as_slice()]);
        let names: Vec<&str> = merged.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Communication", "Ownership", "Curiosity", "Teamwork"]);
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let a = vec![ValueObservation::new("Customer Obsession", 1)];
        let b = vec![ValueObservation::new("  customer obsession ", 2)];

        let merged: Vec<ValueObservation> = merge_observations([a.as_slice(), b.as_slice()]);
        assert_eq!(merged, vec![ValueObservation::new("Customer Obsession", 3)]);
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let mut tally = ObservationTally::new();
        tally.add("   ", 4);
        tally.add("Rust", 1);
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.get("rust"), Some(1));
    }

    #[test]
    fn test_counts_saturate() {
        let mut tally = ObservationTally::new();
        tally.add("Python", u32::MAX);
        tally.add("Python", 10);
        assert_eq!(tally.get("Python"), Some(u32::MAX));
    }

    #[test]
    fn test_no_pages_is_empty() {
        let merged: Vec<SkillObservation> = merge_observations(std::iter::empty());
        assert!(merged.is_empty());
    }

    fn page_strategy() -> impl Strategy<Value = Vec<SkillObservation>> {
        prop::collection::vec(
            (prop::sample::select(vec!["Python", "python", "Rust", "SQL", "Go"]), 1u32..50)
                .prop_map(|(n, c)| SkillObservation::new(n, c)),
            0..6,
        )
    }

    fn totals(merged: &[SkillObservation]) -> Vec<(String, u32)> {
        let mut totals: Vec<(String, u32)> = merged
            .iter()
            .map(|s| (s.name.to_lowercase(), s.count))
            .collect();
        totals.sort();
        totals
    }

    proptest! {
        #[test]
        fn merge_is_order_independent(
            (pages, shuffled) in prop::collection::vec(page_strategy(), 0..6)
                .prop_flat_map(|pages| (Just(pages.clone()), Just(pages).prop_shuffle()))
        ) {
            let a: Vec<SkillObservation> = merge_observations(pages.iter().map(Vec::as_slice));
            let b: Vec<SkillObservation> = merge_observations(shuffled.iter().map(Vec::as_slice));
            prop_assert_eq!(totals(&a), totals(&b));
        }

        #[test]
        fn merged_output_is_sorted_and_preserves_total(
            pages in prop::collection::vec(page_strategy(), 0..6)
        ) {
            let merged: Vec<SkillObservation> = merge_observations(pages.iter().map(Vec::as_slice));

            prop_assert!(merged.windows(2).all(|w| w[0].count <= w[1].count));

            let input_total: u64 = pages.iter().flatten().map(|s| u64::from(s.count)).sum();
            let output_total: u64 = merged.iter().map(|s| u64::from(s.count)).sum();
            prop_assert_eq!(input_total, output_total);
        }
    }
}
