//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (carried on the state)
//! - Elapsed time capped per tick
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod effects;
pub mod input;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{
    center_of_mass, horizontal_overlap, is_anchored_stable, is_colliding, is_stable,
    landing_is_valid, overlap_width, placement_quality,
};
pub use input::{InputState, KeyCommand, SwipeTracker, TouchAction};
pub use scoring::{Placement, block_width_range, level_for, score_placement};
pub use state::{
    Block, BlockColor, BlockState, Crane, GamePhase, GameState, Particle, Platform, ScreenShake,
    Wind, World,
};
pub use tick::{
    TickInput, drop_block, force_pause, force_resume, game_over, shift_crane, spawn_block,
    start_session, tick, toggle_pause,
};
