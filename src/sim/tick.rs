//! Simulation tick and session transitions
//!
//! One `tick` per frame callback, driven with the elapsed milliseconds
//! (already capped by the frame clock). Velocities are per reference frame
//! and scaled by `dt / FRAME_MS` when integrated.

use glam::Vec2;

use super::collision::{is_stable, landing_is_valid, placement_quality};
use super::effects;
use super::scoring::{block_width_range, level_for, score_placement};
use super::state::{Block, BlockColor, BlockState, GamePhase, GameState};
use crate::audio::FeedbackKind;
use crate::consts::*;
use crate::events::GameEvent;
use crate::frame_scale;
use crate::settings::Settings;

/// Input sampled for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Net crane direction in {-1, 0, 1}
    pub direction: i8,
}

/// Advance the session by one frame
pub fn tick(state: &mut GameState, input: &TickInput, settings: &Settings, dt_ms: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let dt_ms = dt_ms.clamp(0.0, FRAME_MS);

    move_crane(state, input.direction, dt_ms);

    update_falling_block(state, settings, dt_ms);
    // A landing or a lost block may have ended the run
    if state.phase != GamePhase::Playing {
        return;
    }
    effects::update_wind(state, dt_ms);
    effects::update_wobble(&mut state.stack);

    if state.current.is_none() {
        spawn_block(state);
    }

    effects::update_shake(&mut state.shake, &mut state.rng);
    effects::update_particles(&mut state.particles, dt_ms);

    update_level(state);
}

/// Steer the crane; a hanging block rides along
fn move_crane(state: &mut GameState, direction: i8, dt_ms: f32) {
    let speed = state.crane.speed_for_level(state.level);
    state.crane.direction = direction;
    state.crane.x += direction as f32 * speed * frame_scale(dt_ms);
    state.crane.clamp_to(state.world.width);
    carry_hanging_block(state);
}

/// Shift the crane directly (touch swipe). Ignored outside play.
pub fn shift_crane(state: &mut GameState, dx: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.crane.x += dx;
    state.crane.clamp_to(state.world.width);
    carry_hanging_block(state);
}

fn carry_hanging_block(state: &mut GameState) {
    let crane_x = state.crane.x;
    if let Some(block) = state.current.as_mut()
        && block.state == BlockState::Hanging
    {
        block.x = crane_x;
    }
}

/// Hang a fresh block under the crane hook
pub fn spawn_block(state: &mut GameState) {
    let (min_w, max_w) = block_width_range(state.level);
    let rng = &mut state.rng;
    let w = rng.float(min_w, max_w);
    let vx = rng.float(-0.5, 0.5);
    let color = rng.choice(&BlockColor::ALL).copied().unwrap_or(BlockColor::Blue);

    state.current = Some(Block {
        x: state.crane.x,
        y: state.crane.hook_y(),
        w,
        h: BLOCK_HEIGHT,
        vel: Vec2::new(vx, 0.0),
        state: BlockState::Hanging,
        tilt: 0.0,
        color,
    });
}

/// Release the hanging block. Ignored unless playing with a block on the hook.
pub fn drop_block(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    // Ignored drops must not advance the seeded stream
    if let Some(block) = state.current.as_mut()
        && block.state == BlockState::Hanging
    {
        block.state = BlockState::Falling;
        block.vel.x += state.rng.float(-1.0, 1.0) * 0.5;
    }
}

fn update_falling_block(state: &mut GameState, settings: &Settings, dt_ms: f32) {
    let scale = frame_scale(dt_ms);
    let gravity = state.world.gravity;
    let terminal = state.world.terminal_velocity;
    let wind = state.world.wind.strength;

    let Some(block) = state.current.as_mut() else {
        return;
    };
    if block.state != BlockState::Falling {
        return;
    }

    block.vel.y = (block.vel.y + gravity).min(terminal);
    block.vel.x += wind * WIND_PUSH;
    block.x += block.vel.x * scale;
    block.y += block.vel.y * scale;

    // Past the bottom margin there is no surface left to land on; only a
    // world that shrank mid-drop gets a block this far down
    if block.bottom() > state.world.height + OFFSCREEN_MARGIN {
        log::debug!("Block fell off screen at y={:.1}", block.y);
        game_over(state);
        return;
    }

    check_landing(state, settings);
}

/// Resolve contact with the landing surface, if reached
fn check_landing(state: &mut GameState, settings: &Settings) {
    let surface_y = state.landing_surface_y();
    let Some(block) = state.current.as_ref() else {
        return;
    };
    if block.bottom() < surface_y {
        return;
    }

    let valid = landing_is_valid(
        block,
        state.stack.last(),
        state.world.platform_left(),
        state.world.platform_right(),
    );
    if valid {
        land_block(state, settings, surface_y);
    } else {
        log::debug!("Missed landing at x={:.1}", block.x);
        game_over(state);
    }
}

/// Snap, stack, score, give feedback, then check the tower still stands
fn land_block(state: &mut GameState, settings: &Settings, surface_y: f32) {
    let Some(mut block) = state.current.take() else {
        return;
    };
    block.y = surface_y - block.h;
    block.vel = Vec2::ZERO;
    block.tilt = 0.0;
    block.state = BlockState::Landed;

    log::debug!(
        "Landed block #{} at x={:.1} (quality {:.2})",
        state.blocks_placed + 1,
        block.x,
        placement_quality(&block, state.stack.last())
    );

    state.stack.push(block.clone());
    state.blocks_placed += 1;

    score_landing(state);

    if settings.motion_effects() {
        effects::trigger_shake(&mut state.shake);
        effects::spawn_landing_particles(&mut state.particles, &mut state.rng, &block);
    }
    state.emit(GameEvent::Feedback(FeedbackKind::Land));

    if !is_stable(&state.stack, state.level) {
        log::debug!("Tower collapsed with {} blocks", state.stack.len());
        game_over(state);
    }
}

/// Score the block just pushed on top of the stack
fn score_landing(state: &mut GameState) {
    let n = state.stack.len();
    let Some(top) = state.stack.last() else {
        return;
    };
    let previous_x = n.checked_sub(2).map(|i| state.stack[i].x);
    let placement = score_placement(previous_x, top.x, state.combo);

    state.combo = placement.combo;
    if placement.perfect {
        state.perfect_placements += 1;
        state.max_combo = state.max_combo.max(state.combo);
        effects::stabilize(&mut state.stack);
        state.emit(GameEvent::Feedback(FeedbackKind::Perfect));
    }

    state.score += placement.points;
    state.emit(GameEvent::ScoreUpdated(state.score));
    state.emit(GameEvent::ComboUpdated(state.combo));
    record_best(state);
}

fn record_best(state: &mut GameState) {
    if state.score > state.best_score {
        state.best_score = state.score;
        state.emit(GameEvent::BestScoreUpdated(state.best_score));
    }
}

fn update_level(state: &mut GameState) {
    let level = level_for(state.blocks_placed);
    if level > state.level {
        state.level = level;
        log::debug!("Level up: {}", level);
        state.emit(GameEvent::LevelUpdated(level));
    }
}

fn set_phase(state: &mut GameState, phase: GamePhase) {
    state.phase = phase;
    state.emit(GameEvent::StateChanged(phase));
}

/// End the run
pub fn game_over(state: &mut GameState) {
    set_phase(state, GamePhase::GameOver);
    record_best(state);
    state.emit(GameEvent::Feedback(FeedbackKind::GameOver));
}

/// Reset everything and start playing (start, restart, and retry after game over)
pub fn start_session(state: &mut GameState) {
    state.reset_session();
    set_phase(state, GamePhase::Playing);
    state.emit(GameEvent::ScoreUpdated(0));
    state.emit(GameEvent::ComboUpdated(0));
    state.emit(GameEvent::LevelUpdated(1));
}

/// Playing <-> Paused; any other phase is left alone
pub fn toggle_pause(state: &mut GameState) {
    match state.phase {
        GamePhase::Playing => set_phase(state, GamePhase::Paused),
        GamePhase::Paused => set_phase(state, GamePhase::Playing),
        _ => {}
    }
}

/// Pause only if currently playing
pub fn force_pause(state: &mut GameState) {
    if state.phase == GamePhase::Playing {
        set_phase(state, GamePhase::Paused);
    }
}

/// Resume only if currently paused
pub fn force_resume(state: &mut GameState) {
    if state.phase == GamePhase::Paused {
        set_phase(state, GamePhase::Playing);
    }
}
