//! End-to-end sessions through the public `Game` API

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use glam::Vec2;
use stack_crane::consts::FRAME_MS;
use stack_crane::persistence::{KeyValueStore, MemoryStore, Storage, keys};
use stack_crane::sim::{Block, BlockColor, BlockState, GamePhase};
use stack_crane::{CancelToken, FrameLoop, Game, GameEvent, GameHandle};

const SEED: u64 = 4242;

fn new_game(store: &MemoryStore) -> Game {
    let mut game = Game::with_seed(400.0, 600.0, Storage::new(store.clone()), SEED);
    game.start_game();
    calm(&mut game);
    game
}

/// No gusts: placements stay deterministic
fn calm(game: &mut Game) {
    let wind = &mut game.state_mut().world.wind;
    wind.strength = 0.0;
    wind.timer = f32::MAX;
}

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

/// Put a falling block at `x`, a hair above the landing surface
fn place_falling(game: &mut Game, x: f32, w: f32) {
    let state = game.state_mut();
    let surface = state.landing_surface_y();
    state.current = Some(Block {
        x,
        y: surface - 20.0 - 0.1,
        w,
        h: 20.0,
        vel: Vec2::ZERO,
        state: BlockState::Falling,
        tilt: 0.0,
        color: BlockColor::Blue,
    });
}

#[test]
fn first_block_on_the_platform() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    drop_and_settle(&mut game);

    let state = game.state();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.score, 1);
    assert_eq!(state.combo, 0);
    assert_eq!(state.blocks_placed, 1);
    assert_eq!(state.level, 1);
    assert_eq!(state.stack.len(), 1);
    assert_eq!(state.stack[0].state, BlockState::Landed);
    assert_eq!(state.stack[0].bottom(), state.world.platform.y);
}

#[test]
fn perfect_second_block_scores_nine() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);
    assert_eq!(game.score(), 1);

    let combos = Rc::new(RefCell::new(Vec::new()));
    let sink = combos.clone();
    game.on_combo_update(move |c| sink.borrow_mut().push(c));

    calm(&mut game);
    place_falling(&mut game, 203.0, 80.0);
    game.update(FRAME_MS);

    assert_eq!(game.score(), 9);
    assert_eq!(game.combo(), 1);
    assert_eq!(game.state().perfect_placements, 1);
    assert_eq!(*combos.borrow(), vec![1]);
    assert_eq!(game.best_score(), 9);
    assert_eq!(store.get(keys::BEST_SCORE).unwrap().as_deref(), Some("9"));
}

#[test]
fn sloppy_block_resets_the_combo() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);
    place_falling(&mut game, 202.0, 80.0);
    game.update(FRAME_MS);
    assert_eq!(game.combo(), 1);

    place_falling(&mut game, 222.0, 80.0);
    game.update(FRAME_MS);
    assert_eq!(game.combo(), 0);
    assert_eq!(game.phase(), GamePhase::Playing);
}

#[test]
fn losing_below_the_best_keeps_the_best() {
    let store = MemoryStore::new();
    store.set(keys::BEST_SCORE, "50").unwrap();
    let mut game = new_game(&store);
    let bests = Rc::new(RefCell::new(Vec::new()));
    let sink = bests.clone();
    game.on_best_score_update(move |b| sink.borrow_mut().push(b));

    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);
    // Way off the top block
    place_falling(&mut game, 300.0, 80.0);
    game.update(FRAME_MS);

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.best_score(), 50);
    assert!(bests.borrow().is_empty());
    assert_eq!(store.get(keys::BEST_SCORE).unwrap().as_deref(), Some("50"));
    assert_eq!(game.storage().stats().games_played, 1);
}

#[test]
fn shrinking_the_window_under_a_falling_block_loses_it() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);
    assert_eq!(game.score(), 1);

    {
        let state = game.state_mut();
        let block = state.current.as_mut().unwrap();
        block.y = 400.0;
        block.state = BlockState::Falling;
    }
    game.resize(400.0, 250.0);
    game.update(FRAME_MS);

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.state().stack.len(), 1);
    assert_eq!(game.score(), 1);
    assert_eq!(game.storage().stats().games_played, 1);
}

#[test]
fn game_over_ignores_play_until_restart() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);
    place_falling(&mut game, 300.0, 80.0);
    game.update(FRAME_MS);
    assert_eq!(game.phase(), GamePhase::GameOver);

    game.drop_block();
    game.toggle_pause();
    game.update(FRAME_MS);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.score(), 1);

    game.key_down("KeyR");
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.score(), 0);
    assert!(game.state().stack.is_empty());
    assert_eq!(game.state().crane.x, 200.0);
}

#[test]
fn every_subscriber_hears_every_change() {
    let store = MemoryStore::new();
    let mut game = Game::with_seed(400.0, 600.0, Storage::new(store), SEED);
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (first.clone(), second.clone());
    let id = game.on_state_change(move |p| a.borrow_mut().push(p));
    game.on_state_change(move |p| b.borrow_mut().push(p));

    game.start_game();
    game.toggle_pause();
    assert!(game.unsubscribe(id));
    game.toggle_pause();

    assert_eq!(*first.borrow(), vec![GamePhase::Playing, GamePhase::Paused]);
    assert_eq!(
        *second.borrow(),
        vec![GamePhase::Playing, GamePhase::Paused, GamePhase::Playing]
    );
}

#[test]
fn progress_survives_export_and_import() {
    let source = MemoryStore::new();
    let mut game = new_game(&source);
    drop_and_settle(&mut game);
    game.key_down("KeyR");
    let exported = game.storage().export_json().unwrap();

    let target = MemoryStore::new();
    let mut fresh = Game::with_seed(400.0, 600.0, Storage::new(target.clone()), 1);
    assert_eq!(fresh.best_score(), 0);
    assert!(fresh.import_data(&exported));
    assert_eq!(fresh.best_score(), 1);
    assert_eq!(target.get(keys::BEST_SCORE).unwrap().as_deref(), Some("1"));
}

#[test]
fn daily_seed_holds_for_the_day() {
    let storage = Storage::new(MemoryStore::new());
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let seed = storage.daily_seed_on(day);
    assert_eq!(storage.daily_seed_on(day), seed);
    assert!(seed < 1_000_000);
}

#[test]
fn unavailable_storage_still_plays() {
    let mut game = Game::with_seed(400.0, 600.0, Storage::new(MemoryStore::unavailable()), SEED);
    game.start_game();
    calm(&mut game);
    drop_and_settle(&mut game);
    assert_eq!(game.score(), 1);
    assert_eq!(game.best_score(), 1);
}

#[test]
fn frame_loop_drives_and_teardown_stops_it() {
    let store = MemoryStore::new();
    let handle = GameHandle::new(new_game(&store));
    let events = Rc::new(RefCell::new(0));
    let sink = events.clone();
    handle.with(|g| {
        g.subscribe(move |_| *sink.borrow_mut() += 1);
    });

    let cancel = CancelToken::new();
    let mut frame_loop = FrameLoop::new(handle.clone(), cancel.clone());
    // A long stall between frames is capped to one reference frame
    assert!(frame_loop.step(0.0));
    assert!(frame_loop.step(5000.0));
    let block_y = handle
        .with(|g| g.state().current.as_ref().map(|b| b.y))
        .flatten();
    assert_eq!(block_y, Some(40.0));

    cancel.cancel();
    handle.destroy();
    assert!(!frame_loop.step(5016.0));
    assert_eq!(handle.with(|g| g.start_game()), None);
    assert_eq!(handle.with(|g| g.drop_block()), None);
    assert_eq!(*events.borrow(), 0);
}

#[test]
fn events_carry_new_values() {
    let store = MemoryStore::new();
    let mut game = new_game(&store);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    game.subscribe(move |e| sink.borrow_mut().push(*e));

    place_falling(&mut game, 200.0, 80.0);
    game.update(FRAME_MS);

    let seen = seen.borrow();
    assert!(seen.contains(&GameEvent::ScoreUpdated(1)));
    assert!(seen.contains(&GameEvent::ComboUpdated(0)));
    assert!(seen.contains(&GameEvent::BestScoreUpdated(1)));
}
