//! Game state to triangle list
//!
//! Pure translation: same state and settings, same vertices. Draw order is
//! back to front (sky, platform, stack, current block, crane, particles,
//! wind indicator).

use glam::Vec2;

use super::shapes::{arrow, rect, rotated_outline, rotated_rect, translate, vertical_gradient};
use super::vertex::{Vertex, colors, with_alpha};
use crate::consts::{CRANE_HOOK_LENGTH, CRANE_Y, PLATFORM_THICKNESS, WIND_EPSILON};
use crate::settings::Settings;
use crate::sim::{Block, GameState, Particle};

const WIND_ARROW_INSET: f32 = 60.0;
const WIND_ARROW_LENGTH: f32 = 30.0;

pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(64 + state.stack.len() * 48 + state.particles.len() * 6);

    sky(&mut out, state, settings);
    platform(&mut out, state, settings);
    for block in &state.stack {
        block_shape(&mut out, block, settings);
    }
    if let Some(block) = &state.current {
        block_shape(&mut out, block, settings);
    }
    crane(&mut out, state, settings);
    for p in &state.particles {
        particle(&mut out, p);
    }
    wind_indicator(&mut out, state, settings);

    if settings.motion_effects() && state.shake.intensity > 0.0 {
        translate(&mut out, state.shake.offset);
    }
    out
}

fn sky(out: &mut Vec<Vertex>, state: &GameState, settings: &Settings) {
    let (top, bottom) = if settings.high_contrast {
        (colors::HC_SKY_TOP, colors::HC_SKY_BOTTOM)
    } else {
        (colors::SKY_TOP, colors::SKY_BOTTOM)
    };
    let size = Vec2::new(state.world.width, state.world.height);
    out.extend(vertical_gradient(Vec2::ZERO, size, top, bottom));
}

fn platform(out: &mut Vec<Vertex>, state: &GameState, settings: &Settings) {
    let origin = Vec2::new(state.world.platform_left(), state.world.platform.y);
    let size = Vec2::new(state.world.platform.width, PLATFORM_THICKNESS);
    let body = if settings.high_contrast {
        colors::HC_STRUCTURE
    } else {
        colors::PLATFORM
    };
    out.extend(rect(origin + Vec2::splat(2.0), size, colors::SHADOW));
    out.extend(rect(origin, size, body));
    out.extend(rect(origin, Vec2::new(size.x, 4.0), colors::HIGHLIGHT));
}

fn block_shape(out: &mut Vec<Vertex>, block: &Block, settings: &Settings) {
    // Rotates around the block's center
    let pivot = Vec2::new(block.x, block.y + block.h / 2.0);
    let offset = Vec2::new(-block.w / 2.0, -block.h / 2.0);
    let size = Vec2::new(block.w, block.h);
    let border = if settings.high_contrast {
        colors::HC_BORDER
    } else {
        colors::BORDER
    };

    out.extend(rotated_rect(pivot, block.tilt, offset + Vec2::ONE, size, colors::SHADOW));
    out.extend(rotated_rect(pivot, block.tilt, offset, size, block.color.rgba()));
    out.extend(rotated_rect(
        pivot,
        block.tilt,
        offset,
        Vec2::new(block.w, 3.0),
        colors::HIGHLIGHT,
    ));
    out.extend(rotated_outline(pivot, block.tilt, offset, size, 1.0, border));
}

fn crane(out: &mut Vec<Vertex>, state: &GameState, settings: &Settings) {
    let (arm, hook) = if settings.high_contrast {
        (colors::HC_STRUCTURE, colors::HC_STRUCTURE)
    } else {
        (colors::CRANE, colors::HOOK)
    };
    let x = state.crane.x;
    out.extend(rect(
        Vec2::new(0.0, CRANE_Y - 1.5),
        Vec2::new(state.world.width, 3.0),
        arm,
    ));
    out.extend(rect(
        Vec2::new(x - 3.0, CRANE_Y),
        Vec2::new(6.0, CRANE_HOOK_LENGTH),
        hook,
    ));
    out.extend(rect(Vec2::new(x - 8.0, CRANE_Y - 5.0), Vec2::new(16.0, 8.0), arm));
}

fn particle(out: &mut Vec<Vertex>, p: &Particle) {
    let half = Vec2::splat(p.size / 2.0);
    out.extend(rect(
        p.pos - half,
        Vec2::splat(p.size),
        with_alpha(p.color, p.alpha),
    ));
}

fn wind_indicator(out: &mut Vec<Vertex>, state: &GameState, settings: &Settings) {
    let strength = state.world.wind.strength;
    if !settings.motion_effects() || strength.abs() <= WIND_EPSILON {
        return;
    }
    let x = if strength > 0.0 {
        state.world.width - WIND_ARROW_INSET
    } else {
        WIND_ARROW_INSET
    };
    let alpha = (strength.abs() * 0.5).min(1.0);
    out.extend(arrow(
        Vec2::new(x, WIND_ARROW_INSET),
        WIND_ARROW_LENGTH,
        strength,
        with_alpha(colors::WIND, alpha),
    ));
}
