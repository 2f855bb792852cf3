//! Collision and stability geometry for axis-aligned blocks
//!
//! Blocks are rectangles spanning `x ± w/2` horizontally and `y..y+h`
//! vertically (screen coordinates, y grows downward). Nothing here owns
//! game state.

use glam::Vec2;

use super::state::Block;
use crate::consts::{MIN_LANDING_OVERLAP, STABILITY_PER_BLOCK, STABILITY_PER_LEVEL};

/// Length of the overlap between two closed intervals (0 if disjoint)
#[inline]
pub fn span_overlap(a_left: f32, a_right: f32, b_left: f32, b_right: f32) -> f32 {
    (a_right.min(b_right) - a_left.max(b_left)).max(0.0)
}

/// Horizontal overlap width, ignoring vertical position
pub fn horizontal_overlap(a: &Block, b: &Block) -> f32 {
    span_overlap(a.left(), a.right(), b.left(), b.right())
}

/// Overlap width of two rectangles; zero unless they also overlap vertically
pub fn overlap_width(a: &Block, b: &Block) -> f32 {
    let height = span_overlap(a.top(), a.bottom(), b.top(), b.bottom());
    if height > 0.0 {
        horizontal_overlap(a, b)
    } else {
        0.0
    }
}

/// AABB intersection test; touching edges do not collide
pub fn is_colliding(a: &Block, b: &Block) -> bool {
    !(a.left() >= b.right()
        || a.right() <= b.left()
        || a.top() >= b.bottom()
        || a.bottom() <= b.top())
}

/// Whether a falling block touching its landing surface lands, or misses.
///
/// On a block the overlap must exceed `MIN_LANDING_OVERLAP` of the falling
/// width; on the platform any positive overlap is enough.
pub fn landing_is_valid(
    falling: &Block,
    target: Option<&Block>,
    platform_left: f32,
    platform_right: f32,
) -> bool {
    match target {
        Some(top) => horizontal_overlap(falling, top) > falling.w * MIN_LANDING_OVERLAP,
        None => falling.right() > platform_left && falling.left() < platform_right,
    }
}

/// Sum of absolute center offsets between adjacent blocks, bottom to top
pub fn stack_offset(stack: &[Block]) -> f32 {
    stack.windows(2).map(|pair| (pair[1].x - pair[0].x).abs()).sum()
}

/// Offset allowance for a stack of `len` blocks at `level`
pub fn stability_limit(len: usize, level: u32) -> f32 {
    len as f32 * STABILITY_PER_BLOCK + level as f32 * STABILITY_PER_LEVEL
}

/// A stack is stable while its accumulated offset stays within the allowance
pub fn is_stable(stack: &[Block], level: u32) -> bool {
    if stack.len() < 2 {
        return true;
    }
    stack_offset(stack) <= stability_limit(stack.len(), level)
}

/// Placement quality in [0, 1]: center alignment averaged with overlap ratio.
/// Platform placements score 1.
pub fn placement_quality(block: &Block, target: Option<&Block>) -> f32 {
    let Some(target) = target else {
        return 1.0;
    };
    let max_distance = (block.w + target.w) / 2.0;
    let alignment = 1.0 - (block.x - target.x).abs() / max_distance;
    let overlap_ratio = horizontal_overlap(block, target) / block.w.min(target.w);
    ((alignment + overlap_ratio) / 2.0).max(0.0)
}

/// Area-weighted center of the blocks (origin for an empty slice)
pub fn center_of_mass(blocks: &[Block]) -> Vec2 {
    let total: f32 = blocks.iter().map(|b| b.w * b.h).sum();
    if total <= 0.0 {
        return Vec2::ZERO;
    }
    blocks
        .iter()
        .map(|b| Vec2::new(b.x, b.y) * (b.w * b.h))
        .sum::<Vec2>()
        / total
}

/// Looser check measuring every block against the base block:
/// total drift from the base must stay within `len * max_drift`
pub fn is_anchored_stable(stack: &[Block], max_drift: f32) -> bool {
    let Some(base) = stack.first() else {
        return true;
    };
    if stack.len() < 2 {
        return true;
    }
    let drift: f32 = stack[1..].iter().map(|b| (b.x - base.x).abs()).sum();
    drift <= stack.len() as f32 * max_drift
}
