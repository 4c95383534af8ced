//! Level-of-detail ladder for reduction cache keying
//!
//! Detail levels are discrete point-count buckets from a fixed ladder.
//! Queries resolve to the nearest level so that nearby target counts share
//! one cached reduction.

use crate::constants::lod::LADDER;

/// The fixed ladder of detail levels, smallest first
pub fn ladder() -> &'static [usize] {
    &LADDER
}

/// Resolve the ladder level nearest to a requested point count
///
/// Ties resolve toward the smaller level.
pub fn nearest_level(target: usize) -> usize {
    LADDER
        .iter()
        .copied()
        .min_by_key(|&level| level.abs_diff(target))
        .expect("ladder is non-empty")
}

/// Ladder levels worth precomputing for a series of `len` elements
///
/// Levels at or above the series length would be identity reductions and
/// are skipped.
pub fn levels_below(len: usize) -> impl Iterator<Item = usize> {
    LADDER.iter().copied().filter(move |&level| level < len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_level_resolution() {
        assert_eq!(nearest_level(2), 100);
        assert_eq!(nearest_level(100), 100);
        assert_eq!(nearest_level(120), 100);
        assert_eq!(nearest_level(400), 500);
        assert_eq!(nearest_level(800), 1_000);
        assert_eq!(nearest_level(6_000), 5_000);
        assert_eq!(nearest_level(1_000_000), 10_000);
    }

    #[test]
    fn test_ties_resolve_to_smaller_level() {
        // 300 is equidistant from 100 and 500
        assert_eq!(nearest_level(300), 100);
    }

    #[test]
    fn test_levels_below() {
        let levels: Vec<usize> = levels_below(2_000).collect();
        assert_eq!(levels, vec![100, 500, 1_000]);

        assert_eq!(levels_below(100).count(), 0);
        assert_eq!(levels_below(1_000_000).count(), LADDER.len());
    }
}
