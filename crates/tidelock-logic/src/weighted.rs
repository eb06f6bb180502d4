//! Generic weighted-choice table.
//!
//! A [`WeightedTable`] holds `(item, weight)` entries and selects items in
//! proportion to their weight via a cumulative-sum walk: accumulate the
//! weights in insertion order, draw `r = total_weight * random`, and return
//! the first entry whose cumulative weight reaches `r`. The last entry is
//! the fallback, tolerating floating-point edge cases at the boundary.
//!
//! Tables are built once per use-case and queried many times; entries can
//! be removed between draws (used when an ingredient exhausts its allowed
//! uses mid-run).

use crate::error::RandomizerError;
use crate::rng::SeededRng;

/// A set of weighted entries supporting proportional random selection.
///
/// Weights are non-negative and duplicate items are rejected (the first
/// insertion wins). Entry order is insertion order, which keeps draws
/// reproducible for a fixed seed.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f64)>,
}

impl<T: PartialEq> WeightedTable<T> {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry with the given weight.
    ///
    /// A no-op if the item is already present. Negative weights are
    /// clamped to zero.
    pub fn add(&mut self, item: T, weight: f64) {
        if self.entries.iter().any(|(existing, _)| *existing == item) {
            return;
        }
        self.entries.push((item, weight.max(0.0)));
    }

    /// Remove an entry, returning whether it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| existing != item);
        self.entries.len() != before
    }

    /// Sum of all entry weights.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|&(_, weight)| weight).sum()
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw an item in proportion to its weight.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::EmptyTable`] if the table has no entries.
    pub fn draw(&self, rng: &mut SeededRng) -> Result<&T, RandomizerError> {
        let Some((last, _)) = self.entries.last() else {
            return Err(RandomizerError::EmptyTable);
        };

        let roll = self.total_weight() * rng.next_double();
        let mut cumulative = 0.0;
        for (item, weight) in &self.entries {
            cumulative += weight;
            if cumulative >= roll {
                return Ok(item);
            }
        }
        // Floating-point accumulation can leave the roll fractionally above
        // the final cumulative sum; the last entry absorbs that edge.
        Ok(last)
    }
}

impl<T: PartialEq> Default for WeightedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_duplicates() {
        let mut table = WeightedTable::new();
        table.add("copper", 2.0);
        table.add("copper", 50.0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.total_weight(), 2.0);
    }

    #[test]
    fn add_clamps_negative_weights() {
        let mut table = WeightedTable::new();
        table.add("junk", -3.0);
        assert_eq!(table.total_weight(), 0.0);
    }

    #[test]
    fn remove_reports_presence() {
        let mut table = WeightedTable::new();
        table.add("quartz", 1.0);
        assert!(table.remove(&"quartz"));
        assert!(!table.remove(&"quartz"));
        assert!(table.is_empty());
    }

    #[test]
    fn draw_from_empty_table_fails() {
        let table: WeightedTable<u32> = WeightedTable::new();
        let mut rng = SeededRng::new(1);
        assert!(matches!(
            table.draw(&mut rng),
            Err(RandomizerError::EmptyTable)
        ));
    }

    #[test]
    fn draw_returns_sole_entry() {
        let mut table = WeightedTable::new();
        table.add("only", 5.0);
        let mut rng = SeededRng::new(3);
        for _ in 0..50 {
            assert_eq!(table.draw(&mut rng).unwrap(), &"only");
        }
    }

    #[test]
    fn draw_is_deterministic_for_a_seed() {
        let mut table = WeightedTable::new();
        table.add("a", 1.0);
        table.add("b", 2.0);
        table.add("c", 3.0);

        let picks = |seed: u64| -> Vec<&str> {
            let mut rng = SeededRng::new(seed);
            (0..20).map(|_| *table.draw(&mut rng).unwrap()).collect()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn heavier_entries_dominate() {
        let mut table = WeightedTable::new();
        table.add("rare", 1.0);
        table.add("common", 99.0);

        let mut rng = SeededRng::new(8);
        let mut common: u32 = 0;
        for _ in 0..1_000 {
            if table.draw(&mut rng).unwrap() == &"common" {
                common = common.saturating_add(1);
            }
        }
        assert!(common > 900, "weight 99/100 drew only {common}/1000");
    }

    #[test]
    fn zero_weight_entry_is_never_preferred_over_mass() {
        let mut table = WeightedTable::new();
        table.add("weightless", 0.0);
        table.add("weighty", 1.0);

        let mut rng = SeededRng::new(5);
        let mut weightless: u32 = 0;
        for _ in 0..1_000 {
            if table.draw(&mut rng).unwrap() == &"weightless" {
                weightless = weightless.saturating_add(1);
            }
        }
        // The zero-weight entry is only reachable on the exact 0.0 roll.
        assert!(weightless <= 1, "zero-weight entry drew {weightless} times");
    }
}
