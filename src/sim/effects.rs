//! Passive effects: wind gusts, stack wobble, particles, screen shake

use glam::Vec2;

use super::state::{Block, GameState, Particle, ScreenShake};
use crate::consts::*;
use crate::frame_scale;
use crate::random::GameRng;

pub const WIND_PARTICLE_COLOR: [f32; 4] = [0.529, 0.808, 0.922, 1.0];
pub const LANDING_PARTICLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const WIND_PARTICLES: usize = 12;
const LANDING_PARTICLES: usize = 8;

/// Count the wind timer down; maybe start a gust, otherwise let the wind die off
pub fn update_wind(state: &mut GameState, dt_ms: f32) {
    let level = state.level as f32;
    state.world.wind.timer -= dt_ms;

    if state.world.wind.timer <= 0.0 && state.rng.boolean(GUST_CHANCE_PER_LEVEL * level) {
        state.world.wind.strength = state.rng.float(-2.0, 2.0) * level * 0.5;
        state.world.wind.timer = state.rng.float(2000.0, 4000.0);
        log::debug!(
            "Wind gust {:.2} for {:.0} ms",
            state.world.wind.strength,
            state.world.wind.timer
        );
        spawn_wind_particles(state);
    }

    if state.world.wind.timer <= 0.0 {
        let wind = &mut state.world.wind;
        wind.strength *= WIND_DECAY;
        if wind.strength.abs() < WIND_EPSILON {
            wind.strength = 0.0;
        }
    }
}

/// Streaks drifting with the gust across the upper part of the screen
fn spawn_wind_particles(state: &mut GameState) {
    let direction = if state.world.wind.strength > 0.0 { 1.0 } else { -1.0 };
    let (width, height) = (state.world.width, state.world.height);
    let rng = &mut state.rng;

    for _ in 0..WIND_PARTICLES {
        state.particles.push(Particle {
            pos: Vec2::new(rng.float(0.0, width), rng.float(0.0, height * 0.7)),
            vel: Vec2::new(direction * rng.float(2.0, 4.0), rng.float(-0.5, 0.5)),
            life: rng.float(1.0, 2.0),
            max_life: 2.0,
            alpha: 1.0,
            size: 2.0,
            color: WIND_PARTICLE_COLOR,
        });
    }
}

/// Geometric tilt decay toward rest
pub fn update_wobble(stack: &mut [Block]) {
    for block in stack.iter_mut().filter(|b| b.tilt != 0.0) {
        block.tilt *= WOBBLE_DAMPING;
        if block.tilt.abs() < WOBBLE_EPSILON {
            block.tilt = 0.0;
        }
    }
}

/// Perfect placements settle the whole tower a little
pub fn stabilize(stack: &mut [Block]) {
    for block in stack.iter_mut() {
        block.tilt *= PERFECT_TILT_DAMPING;
    }
}

/// Dust kicked up along the top of a freshly landed block
pub fn spawn_landing_particles(particles: &mut Vec<Particle>, rng: &mut GameRng, block: &Block) {
    for _ in 0..LANDING_PARTICLES {
        particles.push(Particle {
            pos: Vec2::new(block.x + rng.float(-block.w / 2.0, block.w / 2.0), block.y),
            vel: Vec2::new(rng.float(-2.0, 2.0), rng.float(-3.0, -1.0)),
            life: rng.float(0.3, 0.8),
            max_life: 0.8,
            alpha: 1.0,
            size: rng.float(2.0, 4.0),
            color: LANDING_PARTICLE_COLOR,
        });
    }
}

/// Integrate, age and cull particles
pub fn update_particles(particles: &mut Vec<Particle>, dt_ms: f32) {
    let scale = frame_scale(dt_ms);
    for p in particles.iter_mut() {
        p.pos += p.vel * scale;
        p.life -= dt_ms / 1000.0;
        p.alpha = (p.life / p.max_life).max(0.0);
    }
    particles.retain(|p| p.life > 0.0);
}

pub fn trigger_shake(shake: &mut ScreenShake) {
    shake.intensity = SHAKE_ON_LAND;
}

/// Decay shake and pick this frame's jitter
pub fn update_shake(shake: &mut ScreenShake, rng: &mut GameRng) {
    if shake.intensity <= 0.0 {
        return;
    }
    shake.intensity *= SHAKE_DECAY;
    if shake.intensity < SHAKE_EPSILON {
        shake.intensity = 0.0;
        shake.offset = Vec2::ZERO;
    } else {
        shake.offset = Vec2::new(
            (rng.next_f32() - 0.5) * shake.intensity,
            (rng.next_f32() - 0.5) * shake.intensity,
        );
    }
}
