//! Game session facade
//!
//! `Game` is what the presentation shell talks to. It owns the simulation
//! state plus everything around it (settings, storage, input buffers,
//! subscribers, feedback device) and turns the events the simulation queues
//! into persistence writes, sounds and notifications.

use crate::audio::{FeedbackKind, FeedbackSink, SilentFeedback};
use crate::events::{EventBus, GameEvent, SubscriptionId};
use crate::persistence::Storage;
use crate::random::GameRng;
use crate::renderer::Vertex;
use crate::renderer::scene::build_scene;
use crate::scheduler::FrameClock;
use crate::settings::{Settings, SettingsPatch};
use crate::sim::{
    self, GamePhase, GameState, InputState, KeyCommand, SwipeTracker, TickInput, TouchAction,
};
use crate::stats::RunSummary;

pub struct Game {
    state: GameState,
    settings: Settings,
    storage: Storage,
    input: InputState,
    swipe: SwipeTracker,
    bus: EventBus,
    feedback: Box<dyn FeedbackSink>,
    clock: FrameClock,
}

impl Game {
    /// Unseeded session for a surface of `width` x `height` pixels
    pub fn new(width: f32, height: f32, storage: Storage) -> Self {
        Self::build(width, height, storage, GameRng::from_entropy())
    }

    /// Reproducible session: all gameplay randomness comes from `seed`
    pub fn with_seed(width: f32, height: f32, storage: Storage, seed: u64) -> Self {
        Self::build(width, height, storage, GameRng::new(seed))
    }

    fn build(width: f32, height: f32, storage: Storage, rng: GameRng) -> Self {
        let mut state = GameState::new(width, height, rng);
        state.best_score = storage.best_score();
        let settings = storage.settings().unwrap_or_default();
        log::info!(
            "Game created {}x{} (seed {}, best {})",
            width,
            height,
            state.rng.seed(),
            state.best_score
        );
        Self {
            state,
            settings,
            storage,
            input: InputState::default(),
            swipe: SwipeTracker::default(),
            bus: EventBus::new(),
            feedback: Box::new(SilentFeedback),
            clock: FrameClock::new(),
        }
    }

    pub fn set_feedback_sink(&mut self, sink: impl FeedbackSink + 'static) {
        self.feedback = Box::new(sink);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for tooling and scripted scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn best_score(&self) -> u64 {
        self.state.best_score
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn seed(&self) -> u64 {
        self.state.rng.seed()
    }

    // --- Session ---

    pub fn start_game(&mut self) {
        log::info!("Starting game (seed {})", self.state.rng.seed());
        self.input.clear();
        self.swipe.cancel();
        sim::start_session(&mut self.state);
        self.dispatch();
    }

    pub fn restart(&mut self) {
        self.start_game();
    }

    /// Restart on a fresh seeded stream
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.state.rng.set_seed(seed);
        self.start_game();
    }

    /// Restart on today's shared seed
    pub fn start_daily_challenge(&mut self) {
        let seed = self.storage.daily_seed();
        log::info!("Daily challenge seed {}", seed);
        self.restart_with_seed(seed as u64);
    }

    pub fn toggle_pause(&mut self) {
        sim::toggle_pause(&mut self.state);
        self.dispatch();
    }

    /// Pause if playing (focus loss); held input is forgotten
    pub fn force_pause(&mut self) {
        self.input.clear();
        self.swipe.cancel();
        sim::force_pause(&mut self.state);
        self.dispatch();
    }

    pub fn force_resume(&mut self) {
        sim::force_resume(&mut self.state);
        self.dispatch();
    }

    pub fn drop_block(&mut self) {
        sim::drop_block(&mut self.state);
        self.dispatch();
    }

    // --- Input ---

    /// `code` is a `KeyboardEvent.code` value
    pub fn key_down(&mut self, code: &str) {
        match KeyCommand::from_code(code) {
            Some(KeyCommand::Drop) => self.drop_block(),
            Some(KeyCommand::TogglePause) => self.toggle_pause(),
            Some(KeyCommand::Restart) => self.restart(),
            None => self.input.key_down(code),
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// On-screen touch buttons
    pub fn handle_touch(&mut self, action: TouchAction, pressed: bool) {
        match action {
            TouchAction::Drop if pressed => self.drop_block(),
            TouchAction::Drop => {}
            _ => self.input.set_touch(action, pressed),
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32, time_ms: f64) {
        self.swipe.start(x, y, time_ms);
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        if let Some(dx) = self.swipe.move_to(x, y) {
            sim::shift_crane(&mut self.state, dx);
        }
    }

    /// A quick tap without a swipe drops the block
    pub fn touch_end(&mut self, time_ms: f64) {
        if self.swipe.end(time_ms) && self.state.phase == GamePhase::Playing {
            self.drop_block();
        }
    }

    pub fn touch_cancel(&mut self) {
        self.swipe.cancel();
    }

    pub fn click(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.drop_block();
        }
    }

    // --- Settings & storage ---

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
        self.storage.set_settings(&self.settings);
    }

    /// Re-read settings and the best score from storage (after an import or a clear)
    pub fn load_settings(&mut self) -> Settings {
        self.settings = self.storage.settings().unwrap_or_default();
        let best = self.storage.best_score();
        if best != self.state.best_score {
            self.state.best_score = best;
            self.state.emit(GameEvent::BestScoreUpdated(best));
            self.dispatch();
        }
        self.settings
    }

    /// Import an exported blob and pick up its best score and settings
    pub fn import_data(&mut self, json: &str) -> bool {
        if !self.storage.import_json(json) {
            return false;
        }
        self.load_settings();
        true
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("Resize to {}x{}", width, height);
        self.state.resize(width, height);
    }

    // --- Frame ---

    /// One animation frame at timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.clock.delta(now_ms);
        self.update(dt);
    }

    /// Advance by `dt_ms`; only moves while playing
    pub fn update(&mut self, dt_ms: f32) {
        let input = TickInput {
            direction: self.input.direction(),
        };
        sim::tick(&mut self.state, &input, &self.settings, dt_ms);
        self.dispatch();
    }

    /// Triangle list for the current frame, in pixel coordinates
    pub fn render(&self) -> Vec<Vertex> {
        build_scene(&self.state, &self.settings)
    }

    // --- Notifications ---

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn on_state_change(&mut self, mut f: impl FnMut(GamePhase) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let GameEvent::StateChanged(phase) = event {
                f(*phase);
            }
        })
    }

    pub fn on_score_update(&mut self, mut f: impl FnMut(u64) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let GameEvent::ScoreUpdated(score) = event {
                f(*score);
            }
        })
    }

    pub fn on_best_score_update(&mut self, mut f: impl FnMut(u64) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let GameEvent::BestScoreUpdated(best) = event {
                f(*best);
            }
        })
    }

    pub fn on_combo_update(&mut self, mut f: impl FnMut(u32) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let GameEvent::ComboUpdated(combo) = event {
                f(*combo);
            }
        })
    }

    pub fn on_level_update(&mut self, mut f: impl FnMut(u32) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let GameEvent::LevelUpdated(level) = event {
                f(*level);
            }
        })
    }

    /// Handle queued simulation events, then fan them out to subscribers
    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::StateChanged(GamePhase::GameOver) => self.record_game_over(),
                GameEvent::StateChanged(phase) => log::info!("State: {}", phase.as_str()),
                GameEvent::BestScoreUpdated(best) => self.storage.set_best_score(best),
                GameEvent::Feedback(kind) => self.play_feedback(kind),
                _ => {}
            }
            self.bus.emit(&event);
        }
    }

    fn record_game_over(&mut self) {
        let run = RunSummary {
            score: self.state.score,
            blocks: self.state.blocks_placed,
            perfect_placements: self.state.perfect_placements,
            max_combo: self.state.max_combo,
        };
        log::info!(
            "Game over: score {} (best {}), {} blocks, level {}, max combo {}",
            run.score,
            self.state.best_score,
            run.blocks,
            self.state.level,
            run.max_combo
        );
        self.storage.record_run(run);
    }

    fn play_feedback(&mut self, kind: FeedbackKind) {
        if self.settings.sound_enabled {
            self.feedback.play(kind.tone());
        }
        if self.settings.haptics_enabled()
            && let Some(pattern) = kind.vibration()
        {
            self.feedback.vibrate(pattern);
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("settings", &self.settings)
            .field("subscribers", &self.bus.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::Tone;
    use crate::consts::FRAME_MS;
    use crate::persistence::{KeyValueStore, MemoryStore, keys};
    use crate::sim::BlockState;

    #[derive(Debug, Clone, PartialEq)]
    enum Cue {
        Tone(f32),
        Vibrate(Vec<u32>),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Cue>>>);

    impl FeedbackSink for Recorder {
        fn play(&mut self, tone: Tone) {
            self.0.borrow_mut().push(Cue::Tone(tone.frequency));
        }

        fn vibrate(&mut self, pattern: &[u32]) {
            self.0.borrow_mut().push(Cue::Vibrate(pattern.to_vec()));
        }
    }

    fn game_on(store: &MemoryStore, width: f32) -> Game {
        let mut game = Game::with_seed(width, 600.0, Storage::new(store.clone()), 99);
        game.start_game();
        game.state_mut().world.wind.timer = f32::MAX;
        game
    }

    /// Spawn, drop and fall until the block lands or the run ends
    fn drop_and_settle(game: &mut Game) {
        game.update(FRAME_MS);
        game.drop_block();
        let placed = game.state().blocks_placed;
        for _ in 0..500 {
            game.update(FRAME_MS);
            if game.phase() != GamePhase::Playing || game.state().blocks_placed > placed {
                return;
            }
        }
        panic!("block never settled");
    }

    #[test]
    fn starts_in_menu_with_stored_best_and_settings() {
        let store = MemoryStore::new();
        store.set(keys::BEST_SCORE, "31").ok();
        store.set(keys::SETTINGS, r#"{"high_contrast":true}"#).ok();
        let game = Game::with_seed(400.0, 600.0, Storage::new(store), 1);
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.best_score(), 31);
        assert!(game.settings().high_contrast);
    }

    #[test]
    fn start_notifies_in_order() {
        let store = MemoryStore::new();
        let mut game = Game::with_seed(400.0, 600.0, Storage::new(store), 1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        game.subscribe(move |e| sink.borrow_mut().push(*e));
        game.start_game();
        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::StateChanged(GamePhase::Playing),
                GameEvent::ScoreUpdated(0),
                GameEvent::ComboUpdated(0),
                GameEvent::LevelUpdated(1),
            ]
        );
    }

    #[test]
    fn centered_first_block_scores_one() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        drop_and_settle(&mut game);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score(), 1);
        assert_eq!(game.combo(), 0);
        assert_eq!(game.level(), 1);
        assert_eq!(game.best_score(), 1);
        assert_eq!(store.get(keys::BEST_SCORE).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn missing_the_platform_ends_the_run_and_records_stats() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 800.0);
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = states.clone();
        game.on_state_change(move |p| sink.borrow_mut().push(p));

        // Crane pinned to the left margin, far from the 250..550 platform
        game.key_down("ArrowLeft");
        for _ in 0..400 {
            game.update(FRAME_MS);
        }
        game.key_up("ArrowLeft");
        assert_eq!(game.state().crane.x, 50.0);
        drop_and_settle(&mut game);

        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(*states.borrow(), vec![GamePhase::GameOver]);
        let stats = game.storage().stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_blocks, 0);
        // No score, so no best score written
        assert_eq!(store.get(keys::BEST_SCORE).unwrap(), None);
    }

    #[test]
    fn feedback_follows_settings() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        let cues = Recorder::default();
        game.set_feedback_sink(cues.clone());

        drop_and_settle(&mut game);
        assert_eq!(
            *cues.0.borrow(),
            vec![Cue::Tone(220.0), Cue::Vibrate(vec![50])]
        );

        cues.0.borrow_mut().clear();
        game.update_settings(SettingsPatch {
            sound_enabled: Some(false),
            reduced_motion: Some(true),
            ..Default::default()
        });
        drop_and_settle(&mut game);
        assert!(cues.0.borrow().is_empty());
        assert!(game.storage().settings().unwrap().reduced_motion);
    }

    #[test]
    fn pause_freezes_the_hanging_block() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        game.update(FRAME_MS);
        game.key_down("KeyP");
        assert_eq!(game.phase(), GamePhase::Paused);

        game.drop_block();
        game.key_down("ArrowRight");
        let before = game.state().crane.x;
        game.update(FRAME_MS);
        assert_eq!(game.state().crane.x, before);
        let block = game.state().current.as_ref().map(|b| b.state);
        assert_eq!(block, Some(BlockState::Hanging));

        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn force_pause_only_from_playing() {
        let store = MemoryStore::new();
        let mut game = Game::with_seed(400.0, 600.0, Storage::new(store), 1);
        game.force_pause();
        assert_eq!(game.phase(), GamePhase::Menu);
        game.start_game();
        game.key_down("ArrowLeft");
        game.force_pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        game.force_pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        game.force_resume();
        assert_eq!(game.phase(), GamePhase::Playing);

        // Held keys were forgotten on focus loss
        let before = game.state().crane.x;
        game.update(FRAME_MS);
        assert_eq!(game.state().crane.x, before);
    }

    #[test]
    fn tap_drops_and_swipe_moves() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        game.update(FRAME_MS);

        game.touch_start(200.0, 300.0, 0.0);
        game.touch_move(220.0, 302.0);
        assert_eq!(game.state().crane.x, 260.0);
        game.touch_end(100.0);
        assert_eq!(
            game.state().current.as_ref().map(|b| b.state),
            Some(BlockState::Hanging)
        );

        game.touch_start(200.0, 300.0, 1000.0);
        game.touch_end(1100.0);
        assert_eq!(
            game.state().current.as_ref().map(|b| b.state),
            Some(BlockState::Falling)
        );
    }

    #[test]
    fn slow_tap_does_not_drop() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        game.update(FRAME_MS);
        game.touch_start(200.0, 300.0, 0.0);
        game.touch_end(400.0);
        assert_eq!(
            game.state().current.as_ref().map(|b| b.state),
            Some(BlockState::Hanging)
        );
        game.click();
        assert_eq!(
            game.state().current.as_ref().map(|b| b.state),
            Some(BlockState::Falling)
        );
    }

    #[test]
    fn seeded_restarts_replay_the_same_blocks() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        game.restart_with_seed(2024);
        game.update(FRAME_MS);
        let first = game.state().current.as_ref().map(|b| (b.w, b.color));

        game.restart_with_seed(2024);
        game.update(FRAME_MS);
        let second = game.state().current.as_ref().map(|b| (b.w, b.color));
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(game.seed(), 2024);
    }

    #[test]
    fn import_picks_up_best_score() {
        let store = MemoryStore::new();
        let mut game = Game::with_seed(400.0, 600.0, Storage::new(store), 1);
        let best = Rc::new(RefCell::new(None));
        let sink = best.clone();
        game.on_best_score_update(move |b| *sink.borrow_mut() = Some(b));

        assert!(game.import_data(r#"{"best_score":120,"settings":{"sound_enabled":false}}"#));
        assert_eq!(game.best_score(), 120);
        assert_eq!(*best.borrow(), Some(120));
        assert!(!game.settings().sound_enabled);
        assert!(!game.import_data("garbage"));
    }

    #[test]
    fn reloading_picks_up_an_outside_best_score() {
        let store = MemoryStore::new();
        let mut game = Game::with_seed(400.0, 600.0, Storage::new(store.clone()), 3);
        let bests = Rc::new(RefCell::new(Vec::new()));
        let sink = bests.clone();
        game.on_best_score_update(move |b| sink.borrow_mut().push(b));

        store.set(keys::BEST_SCORE, "77").unwrap();
        store.set(keys::SETTINGS, r#"{"high_contrast":true}"#).unwrap();
        let settings = game.load_settings();
        assert!(settings.high_contrast);
        assert_eq!(game.best_score(), 77);

        game.storage().clear_all();
        game.load_settings();
        assert_eq!(game.best_score(), 0);
        assert!(!game.settings().high_contrast);
        assert_eq!(*bests.borrow(), vec![77, 0]);
    }

    #[test]
    fn render_produces_geometry() {
        let store = MemoryStore::new();
        let mut game = game_on(&store, 400.0);
        game.update(FRAME_MS);
        let vertices = game.render();
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % 3, 0);
    }
}
