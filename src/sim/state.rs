//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::events::GameEvent;
use crate::random::GameRng;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended (missed landing, lost block, or collapse)
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameover",
        }
    }
}

/// Block lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// Carried under the crane hook, follows the crane
    Hanging,
    /// Released, under gravity and wind
    Falling,
    /// Part of the stack
    Landed,
}

/// Block palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockColor {
    Blue,
    Green,
    Amber,
    Red,
    Violet,
}

impl BlockColor {
    pub const ALL: [BlockColor; 5] = [
        BlockColor::Blue,
        BlockColor::Green,
        BlockColor::Amber,
        BlockColor::Red,
        BlockColor::Violet,
    ];

    pub fn rgba(&self) -> [f32; 4] {
        match self {
            BlockColor::Blue => [0.231, 0.510, 0.965, 1.0],
            BlockColor::Green => [0.063, 0.725, 0.506, 1.0],
            BlockColor::Amber => [0.961, 0.620, 0.043, 1.0],
            BlockColor::Red => [0.937, 0.267, 0.267, 1.0],
            BlockColor::Violet => [0.545, 0.361, 0.965, 1.0],
        }
    }
}

/// A block: `x` is the horizontal center, `y` the top edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vel: Vec2,
    pub state: BlockState,
    /// Tilt in radians (visual wobble only)
    pub tilt: f32,
    pub color: BlockColor,
}

impl Block {
    pub fn left(&self) -> f32 {
        self.x - self.w / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// The crane running along the top rail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crane {
    pub x: f32,
    pub speed: f32,
    /// -1 left, 0 idle, 1 right
    pub direction: i8,
}

impl Crane {
    pub fn new(x: f32) -> Self {
        Self {
            x,
            speed: CRANE_BASE_SPEED,
            direction: 0,
        }
    }

    /// Speed for the given level (per reference frame)
    pub fn speed_for_level(&self, level: u32) -> f32 {
        self.speed + level.saturating_sub(1) as f32 * CRANE_SPEED_PER_LEVEL
    }

    /// Clamp to the rail for a world of the given width
    pub fn clamp_to(&mut self, world_width: f32) {
        let max = (world_width - CRANE_MARGIN).max(CRANE_MARGIN);
        self.x = self.x.clamp(CRANE_MARGIN, max);
    }

    /// Hook bottom, where hanging blocks are attached
    pub fn hook_y(&self) -> f32 {
        CRANE_Y + CRANE_HOOK_LENGTH
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    /// Top edge
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Wind {
    /// Milliseconds until a gust may end (counts below zero while calm)
    pub timer: f32,
    /// Signed horizontal strength
    pub strength: f32,
}

/// World geometry and physical constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub platform: Platform,
    pub wind: Wind,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        let mut world = Self {
            width,
            height,
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            platform: Platform { y: 0.0, width: 0.0 },
            wind: Wind::default(),
        };
        world.resize(width, height);
        world
    }

    /// Recompute platform geometry for a new surface size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.platform.y = height - PLATFORM_OFFSET;
        self.platform.width = PLATFORM_MAX_WIDTH.min(width * PLATFORM_WIDTH_RATIO);
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn platform_left(&self) -> f32 {
        self.center_x() - self.platform.width / 2.0
    }

    pub fn platform_right(&self) -> f32 {
        self.center_x() + self.platform.width / 2.0
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    pub offset: Vec2,
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub world: World,
    pub crane: Crane,
    /// Block owned by the crane / falling simulation
    pub current: Option<Block>,
    /// Landed blocks, bottom to top
    pub stack: Vec<Block>,
    pub particles: Vec<Particle>,
    pub shake: ScreenShake,
    pub score: u64,
    pub best_score: u64,
    pub combo: u32,
    pub level: u32,
    pub blocks_placed: u32,
    /// Session tallies reported into stats when the run ends
    pub perfect_placements: u32,
    pub max_combo: u32,
    pub rng: GameRng,
    /// Notifications produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session in the menu phase for a surface of the given size
    pub fn new(width: f32, height: f32, rng: GameRng) -> Self {
        Self {
            phase: GamePhase::Menu,
            world: World::new(width, height),
            crane: Crane::new(width / 2.0),
            current: None,
            stack: Vec::new(),
            particles: Vec::new(),
            shake: ScreenShake::default(),
            score: 0,
            best_score: 0,
            combo: 0,
            level: 1,
            blocks_placed: 0,
            perfect_placements: 0,
            max_combo: 0,
            rng,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Surface the next block lands on (top of stack, or the platform)
    pub fn landing_surface_y(&self) -> f32 {
        self.stack
            .last()
            .map(|top| top.y)
            .unwrap_or(self.world.platform.y)
    }

    /// Resize the world; the crane is recentered as on a fresh surface
    pub fn resize(&mut self, width: f32, height: f32) {
        self.world.resize(width, height);
        self.crane.x = self.world.center_x();
    }

    /// Clear everything a restart resets
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.combo = 0;
        self.level = 1;
        self.blocks_placed = 0;
        self.perfect_placements = 0;
        self.max_combo = 0;
        self.crane.x = self.world.center_x();
        self.crane.direction = 0;
        self.current = None;
        self.stack.clear();
        self.particles.clear();
        self.shake = ScreenShake::default();
        self.world.wind = Wind::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_platform_follows_size() {
        let world = World::new(800.0, 600.0);
        assert_eq!(world.platform.y, 560.0);
        assert_eq!(world.platform.width, 300.0);
        assert_eq!(world.platform_left(), 250.0);
        assert_eq!(world.platform_right(), 550.0);

        let narrow = World::new(400.0, 700.0);
        assert_eq!(narrow.platform.width, 240.0);
    }

    #[test]
    fn crane_speed_scales_with_level() {
        let crane = Crane::new(100.0);
        assert_eq!(crane.speed_for_level(1), 2.0);
        assert_eq!(crane.speed_for_level(3), 3.0);
    }

    #[test]
    fn crane_clamps_to_rail() {
        let mut crane = Crane::new(-20.0);
        crane.clamp_to(400.0);
        assert_eq!(crane.x, 50.0);
        crane.x = 1000.0;
        crane.clamp_to(400.0);
        assert_eq!(crane.x, 350.0);
    }

    #[test]
    fn landing_surface_is_top_of_stack() {
        let mut state = GameState::new(400.0, 600.0, GameRng::new(1));
        assert_eq!(state.landing_surface_y(), 560.0);
        state.stack.push(Block {
            x: 200.0,
            y: 540.0,
            w: 80.0,
            h: 20.0,
            vel: Vec2::ZERO,
            state: BlockState::Landed,
            tilt: 0.0,
            color: BlockColor::Blue,
        });
        assert_eq!(state.landing_surface_y(), 540.0);
    }

    #[test]
    fn phase_names_match_shell_contract() {
        assert_eq!(GamePhase::Menu.as_str(), "menu");
        assert_eq!(GamePhase::GameOver.as_str(), "gameover");
    }
}
