//! Frame scheduling
//!
//! The shell owns a [`GameHandle`] and a [`FrameLoop`]; each animation
//! frame calls [`FrameLoop::step`]. Destroying the handle or cancelling the
//! token stops the loop, and later calls through the handle do nothing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::consts::FRAME_MS;
use crate::game::Game;

/// Turns frame timestamps into capped deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous frame, in `[0, FRAME_MS]`.
    /// The first frame only starts the clock.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, FRAME_MS as f64) as f32,
            None => 0.0,
        };
        // A timestamp from the past does not rewind the clock
        self.last_ms = Some(self.last_ms.map_or(now_ms, |last| last.max(now_ms)));
        dt
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Shared, clearable owner of the running game
#[derive(Debug, Clone, Default)]
pub struct GameHandle(Rc<RefCell<Option<Game>>>);

impl GameHandle {
    pub fn new(game: Game) -> Self {
        Self(Rc::new(RefCell::new(Some(game))))
    }

    /// Run `f` against the game; `None` once destroyed.
    /// Re-entrant calls from inside `f` also get `None`.
    pub fn with<R>(&self, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let mut slot = self.0.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    }

    pub fn is_alive(&self) -> bool {
        self.0.try_borrow().map(|g| g.is_some()).unwrap_or(true)
    }

    /// Drop the game; every later call is a no-op
    pub fn destroy(&self) {
        if let Ok(mut slot) = self.0.try_borrow_mut()
            && slot.take().is_some()
        {
            log::info!("Game destroyed");
        }
    }
}

type Presenter = Box<dyn FnMut(&mut Game)>;

/// One update + present pass per animation frame
pub struct FrameLoop {
    handle: GameHandle,
    cancel: CancelToken,
    present: Option<Presenter>,
}

impl FrameLoop {
    pub fn new(handle: GameHandle, cancel: CancelToken) -> Self {
        Self {
            handle,
            cancel,
            present: None,
        }
    }

    /// Called after every update with the game (the shell draws here)
    pub fn with_presenter(mut self, present: impl FnMut(&mut Game) + 'static) -> Self {
        self.present = Some(Box::new(present));
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one frame. Returns false once the loop should stop.
    pub fn step(&mut self, now_ms: f64) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let present = &mut self.present;
        self.handle
            .with(|game| {
                game.frame(now_ms);
                if let Some(present) = present.as_mut() {
                    present(game);
                }
            })
            .is_some()
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("alive", &self.handle.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, Storage};
    use crate::sim::GamePhase;

    fn game() -> Game {
        Game::with_seed(400.0, 600.0, Storage::new(MemoryStore::new()), 7)
    }

    #[test]
    fn clock_caps_and_never_goes_negative() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1000.0), 0.0);
        assert!((clock.delta(1008.0) - 8.0).abs() < 1e-4);
        assert_eq!(clock.delta(2000.0), FRAME_MS);
        assert_eq!(clock.delta(1990.0), 0.0);
        assert!((clock.delta(2005.0) - 5.0).abs() < 1e-4);

        clock.reset();
        assert_eq!(clock.delta(9000.0), 0.0);
    }

    #[test]
    fn destroyed_handle_ignores_calls() {
        let handle = GameHandle::new(game());
        assert_eq!(handle.with(|g| g.phase()), Some(GamePhase::Menu));
        let other = handle.clone();
        handle.destroy();
        assert!(!other.is_alive());
        assert_eq!(other.with(|g| g.start_game()), None);
        // Destroying twice is harmless
        other.destroy();
    }

    #[test]
    fn loop_runs_until_cancelled() {
        let handle = GameHandle::new(game());
        handle.with(|g| g.start_game());

        let frames = Rc::new(Cell::new(0));
        let counter = frames.clone();
        let mut frame_loop = FrameLoop::new(handle.clone(), CancelToken::new())
            .with_presenter(move |_| counter.set(counter.get() + 1));

        for i in 0..5 {
            assert!(frame_loop.step(i as f64 * 16.0));
        }
        assert_eq!(frames.get(), 5);

        frame_loop.cancel_token().cancel();
        assert!(!frame_loop.step(100.0));
        assert_eq!(frames.get(), 5);
    }

    #[test]
    fn loop_stops_when_game_is_destroyed() {
        let handle = GameHandle::new(game());
        let mut frame_loop = FrameLoop::new(handle.clone(), CancelToken::new());
        assert!(frame_loop.step(0.0));
        handle.destroy();
        assert!(!frame_loop.step(16.0));
    }
}
