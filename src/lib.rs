//! Stack Crane - drop blocks from a moving crane and keep the tower standing
//!
//! Core modules:
//! - `sim`: Simulation (crane, falling block, landing, stability, scoring, effects)
//! - `game`: Session facade the presentation shell talks to
//! - `renderer`: Scene translation and WebGPU pipeline
//! - `persistence`: Best-effort key-value gateway (best score, settings, stats, daily seed)
//! - `random`: Seedable random source

pub mod audio;
pub mod events;
pub mod game;
pub mod persistence;
pub mod random;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod stats;

pub use events::{EventBus, GameEvent, SubscriptionId};
pub use game::Game;
pub use random::{GameRng, RandomError};
pub use scheduler::{CancelToken, FrameClock, FrameLoop, GameHandle};
pub use settings::{Settings, SettingsPatch};
pub use stats::{Stats, StatsPatch};

/// Game configuration constants
///
/// Velocities are in pixels per reference frame (60 Hz); timers are in milliseconds.
pub mod consts {
    /// Reference frame duration; also the cap on a single tick's delta
    pub const FRAME_MS: f32 = 16.67;

    /// Gravity added to a falling block's vertical velocity each tick
    pub const GRAVITY: f32 = 0.3;
    /// Maximum fall speed
    pub const TERMINAL_VELOCITY: f32 = 8.0;
    /// A falling block this far below the bottom edge is lost
    pub const OFFSCREEN_MARGIN: f32 = 100.0;

    /// Platform top sits this far above the bottom of the world
    pub const PLATFORM_OFFSET: f32 = 40.0;
    pub const PLATFORM_THICKNESS: f32 = 40.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 300.0;
    pub const PLATFORM_WIDTH_RATIO: f32 = 0.6;

    /// Crane rail height and hook length (hanging blocks sit under the hook)
    pub const CRANE_Y: f32 = 20.0;
    pub const CRANE_HOOK_LENGTH: f32 = 20.0;
    pub const CRANE_BASE_SPEED: f32 = 2.0;
    pub const CRANE_SPEED_PER_LEVEL: f32 = 0.5;
    /// Crane keeps this distance from both world edges
    pub const CRANE_MARGIN: f32 = 50.0;

    /// Touch gestures
    pub const SWIPE_THRESHOLD: f32 = 10.0;
    pub const SWIPE_SPEED: f32 = 3.0;
    pub const TAP_MAX_MS: f64 = 300.0;

    pub const BLOCK_HEIGHT: f32 = 20.0;
    /// Landing on a block needs strictly more overlap than this fraction of the falling width
    pub const MIN_LANDING_OVERLAP: f32 = 0.2;

    /// Center distance at or under which a placement is perfect
    pub const PERFECT_THRESHOLD: f32 = 10.0;
    pub const BLOCKS_PER_LEVEL: u32 = 10;

    /// Stability allowance: per stacked block and per level
    pub const STABILITY_PER_BLOCK: f32 = 15.0;
    pub const STABILITY_PER_LEVEL: f32 = 5.0;

    /// Tilt multiplier applied to the whole stack on a perfect placement
    pub const PERFECT_TILT_DAMPING: f32 = 0.8;
    pub const WOBBLE_DAMPING: f32 = 0.95;
    pub const WOBBLE_EPSILON: f32 = 0.001;

    /// Fraction of wind strength added to a falling block's vx each tick
    pub const WIND_PUSH: f32 = 0.1;
    pub const WIND_DECAY: f32 = 0.95;
    pub const WIND_EPSILON: f32 = 0.1;
    /// Per-tick gust probability per level
    pub const GUST_CHANCE_PER_LEVEL: f32 = 0.001;

    pub const SHAKE_ON_LAND: f32 = 5.0;
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_EPSILON: f32 = 0.1;
}

/// Ratio of an elapsed time to the 60 Hz reference frame
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / consts::FRAME_MS
}
