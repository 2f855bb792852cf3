//! Scoring, combo and level rules

use crate::consts::{BLOCKS_PER_LEVEL, PERFECT_THRESHOLD};

/// Outcome of scoring one landed block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Points to add (base 1 plus any perfect bonus)
    pub points: u64,
    pub perfect: bool,
    /// Combo after this placement
    pub combo: u32,
    /// Center distance to the previous block, if there was one
    pub distance: Option<f32>,
}

/// Score a landed block against the block below it.
///
/// The first block of a stack has nothing to compare with: it earns the base
/// point and leaves the combo untouched. A perfect placement increments the
/// combo, then earns `floor(threshold - distance) * combo` on top.
pub fn score_placement(previous_x: Option<f32>, x: f32, combo: u32) -> Placement {
    let Some(prev) = previous_x else {
        return Placement {
            points: 1,
            perfect: false,
            combo,
            distance: None,
        };
    };

    let distance = (x - prev).abs();
    if distance <= PERFECT_THRESHOLD {
        let combo = combo + 1;
        let bonus = (PERFECT_THRESHOLD - distance).floor() as u64 * combo as u64;
        Placement {
            points: 1 + bonus,
            perfect: true,
            combo,
            distance: Some(distance),
        }
    } else {
        Placement {
            points: 1,
            perfect: false,
            combo: 0,
            distance: Some(distance),
        }
    }
}

/// Level for a number of placed blocks
pub fn level_for(blocks_placed: u32) -> u32 {
    blocks_placed / BLOCKS_PER_LEVEL + 1
}

/// Width range `(min, max)` for blocks spawned at `level`; narrows as levels rise
pub fn block_width_range(level: u32) -> (f32, f32) {
    let level = level as f32;
    let min = (80.0 - 2.0 * level).max(30.0);
    let max = (100.0 - level).max(min);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_block_scores_one_and_keeps_combo() {
        let p = score_placement(None, 200.0, 0);
        assert_eq!(p.points, 1);
        assert_eq!(p.combo, 0);
        assert!(!p.perfect);

        let p = score_placement(None, 200.0, 4);
        assert_eq!(p.combo, 4);
    }

    #[test]
    fn perfect_bonus_uses_post_increment_combo() {
        let p = score_placement(Some(200.0), 203.0, 0);
        assert!(p.perfect);
        assert_eq!(p.combo, 1);
        assert_eq!(p.points, 1 + 7);

        let p = score_placement(Some(200.0), 197.5, 2);
        assert_eq!(p.combo, 3);
        assert_eq!(p.points, 1 + 7 * 3);
    }

    #[test]
    fn threshold_distance_is_still_perfect() {
        let p = score_placement(Some(100.0), 110.0, 1);
        assert!(p.perfect);
        assert_eq!(p.combo, 2);
        assert_eq!(p.points, 1);
    }

    #[test]
    fn miss_resets_combo() {
        let p = score_placement(Some(100.0), 110.5, 5);
        assert!(!p.perfect);
        assert_eq!(p.combo, 0);
        assert_eq!(p.points, 1);
    }

    #[test]
    fn level_table() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(9), 1);
        assert_eq!(level_for(10), 2);
        assert_eq!(level_for(19), 2);
        assert_eq!(level_for(20), 3);
    }

    #[test]
    fn width_range_floors_at_thirty() {
        assert_eq!(block_width_range(1), (78.0, 99.0));
        assert_eq!(block_width_range(25), (30.0, 75.0));
        assert_eq!(block_width_range(90), (30.0, 30.0));
    }

    proptest! {
        #[test]
        fn width_range_narrows_with_level(level in 1u32..200) {
            let (min, max) = block_width_range(level);
            let (next_min, next_max) = block_width_range(level + 1);
            prop_assert!(min >= 30.0);
            prop_assert!(max >= min);
            prop_assert!(next_min <= min);
            prop_assert!(next_max <= max);
        }

        #[test]
        fn level_matches_formula(placed in 0u32..100_000) {
            prop_assert_eq!(level_for(placed), placed / 10 + 1);
            prop_assert!(level_for(placed + 1) >= level_for(placed));
        }

        #[test]
        fn combo_resets_beyond_threshold(
            prev in -500.0f32..500.0,
            gap in 10.01f32..300.0,
            combo in 0u32..50,
        ) {
            let p = score_placement(Some(prev), prev + gap, combo);
            prop_assert_eq!(p.combo, 0);
            prop_assert_eq!(p.points, 1);
        }
    }
}
