//! Input buffers sampled once per tick
//!
//! Key and touch-button state is recorded as events arrive (last state
//! wins) and folded into a single crane direction when the tick runs.

use std::collections::HashSet;

use crate::consts::{SWIPE_SPEED, SWIPE_THRESHOLD, TAP_MAX_MS};

/// Keyboard codes (DOM `KeyboardEvent.code`) that steer the crane
const LEFT_CODES: [&str; 2] = ["ArrowLeft", "KeyA"];
const RIGHT_CODES: [&str; 2] = ["ArrowRight", "KeyD"];

/// Discrete keyboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Drop,
    TogglePause,
    Restart,
}

impl KeyCommand {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(KeyCommand::Drop),
            "KeyP" => Some(KeyCommand::TogglePause),
            "KeyR" => Some(KeyCommand::Restart),
            _ => None,
        }
    }
}

/// On-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Left,
    Right,
    Drop,
}

impl TouchAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(TouchAction::Left),
            "right" => Some(TouchAction::Right),
            "drop" => Some(TouchAction::Drop),
            _ => None,
        }
    }
}

/// Held keys and touch buttons
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<String>,
    touch_left: bool,
    touch_right: bool,
}

impl InputState {
    pub fn key_down(&mut self, code: &str) {
        self.held_keys.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.held_keys.remove(code);
    }

    pub fn set_touch(&mut self, action: TouchAction, pressed: bool) {
        match action {
            TouchAction::Left => self.touch_left = pressed,
            TouchAction::Right => self.touch_right = pressed,
            TouchAction::Drop => {}
        }
    }

    /// Forget everything held (focus loss)
    pub fn clear(&mut self) {
        self.held_keys.clear();
        self.touch_left = false;
        self.touch_right = false;
    }

    /// Net crane direction in {-1, 0, 1}.
    ///
    /// Every active left source counts -1 and every right source +1; the sum
    /// is clamped, so holding left and right together cancels out.
    pub fn direction(&self) -> i8 {
        let left_key = LEFT_CODES.iter().any(|c| self.held_keys.contains(*c));
        let right_key = RIGHT_CODES.iter().any(|c| self.held_keys.contains(*c));

        let mut dir = 0i8;
        if left_key {
            dir -= 1;
        }
        if right_key {
            dir += 1;
        }
        if self.touch_left {
            dir -= 1;
        }
        if self.touch_right {
            dir += 1;
        }
        dir.clamp(-1, 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct SwipeStart {
    x: f32,
    y: f32,
    time_ms: f64,
}

/// Distinguishes horizontal swipes (move the crane) from quick taps (drop)
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<SwipeStart>,
    moving: bool,
}

impl SwipeTracker {
    pub fn start(&mut self, x: f32, y: f32, time_ms: f64) {
        self.start = Some(SwipeStart { x, y, time_ms });
        self.moving = false;
    }

    /// Returns the crane displacement for this move, if it counts as a swipe.
    ///
    /// The horizontal anchor follows the finger so movement is continuous.
    pub fn move_to(&mut self, x: f32, y: f32) -> Option<f32> {
        let start = self.start.as_mut()?;
        let dx = x - start.x;
        let dy = (y - start.y).abs();
        if dx.abs() > SWIPE_THRESHOLD && dx.abs() > dy {
            self.moving = true;
            start.x = x;
            Some(dx * SWIPE_SPEED)
        } else {
            None
        }
    }

    /// Ends the gesture; true when it was a quick tap that should drop
    pub fn end(&mut self, time_ms: f64) -> bool {
        let tap = match self.start {
            Some(start) if !self.moving => time_ms - start.time_ms < TAP_MAX_MS,
            _ => false,
        };
        self.cancel();
        tap
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.moving = false;
    }

    pub fn is_swiping(&self) -> bool {
        self.moving
    }
}
