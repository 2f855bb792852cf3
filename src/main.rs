//! Stack Crane entry point
//!
//! On the web: wires the canvas, DOM controls and animation frames to a
//! [`Game`](stack_crane::Game). Natively: runs a seeded autopilot session
//! headless and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    //! Expected DOM: `#canvas`, HUD values `#score`, `#best`, `#combo`,
    //! `#level`, overlays `#overlay-menu`, `#overlay-paused`,
    //! `#overlay-gameover` (with `#final-score`), buttons `#start-btn`,
    //! `#daily-btn`, `#restart-btn`, `#resume-btn`, touch buttons
    //! `#touch-left`, `#touch-right`, `#touch-drop` and settings checkboxes
    //! `#setting-high-contrast`, `#setting-reduced-motion`, `#setting-sound`.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use stack_crane::audio::WebFeedback;
    use stack_crane::persistence::Storage;
    use stack_crane::renderer::RenderState;
    use stack_crane::sim::{GamePhase, TouchAction};
    use stack_crane::{CancelToken, FrameLoop, Game, GameHandle, SettingsPatch};

    /// Keys whose browser default (scrolling) is suppressed
    const CAPTURED_KEYS: [&str; 5] = ["Space", "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown"];

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn show_overlay(phase: GamePhase) {
        for candidate in [GamePhase::Menu, GamePhase::Paused, GamePhase::GameOver] {
            set_hidden(&format!("overlay-{}", candidate.as_str()), candidate != phase);
        }
    }

    fn on_click(id: &str, handle: &GameHandle, f: impl Fn(&mut Game) + 'static) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let handle = handle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            handle.with(|g| f(g));
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Stack Crane starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let mut game = Game::new(client_w as f32, client_h as f32, Storage::browser());
        let feedback = WebFeedback::new();
        game.set_feedback_sink(feedback.clone());
        let handle = GameHandle::new(game);

        subscribe_hud(&handle);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(
            surface,
            &adapter,
            width,
            height,
            (client_w as f32, client_h as f32),
        )
        .await
        .expect("Failed to create device");
        let render_state = Rc::new(RefCell::new(render_state));

        setup_input_handlers(&canvas, &handle, feedback);
        setup_buttons(&handle);
        setup_settings(&handle);
        setup_auto_pause(&handle);
        setup_resize(&canvas, &handle, render_state.clone());

        let cancel = CancelToken::new();
        let presenter_state = render_state.clone();
        let frame_loop = FrameLoop::new(handle.clone(), cancel.clone()).with_presenter(move |game| {
            let vertices = game.render();
            let mut rs = presenter_state.borrow_mut();
            match rs.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = rs.size;
                    let world = rs.world_size;
                    rs.resize(w, h, world);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        });
        let frame_loop = Rc::new(RefCell::new(frame_loop));
        let raf_id = Rc::new(Cell::new(None));

        setup_teardown(&handle, cancel, raf_id.clone());
        request_animation_frame(frame_loop, raf_id);

        show_overlay(GamePhase::Menu);
        log::info!("Stack Crane running!");
    }

    fn subscribe_hud(handle: &GameHandle) {
        let last_score = Rc::new(Cell::new(0u64));
        let score_sink = last_score.clone();
        handle.with(|g| {
            set_text("best", &g.best_score().to_string());
            g.on_score_update(move |score| {
                score_sink.set(score);
                set_text("score", &score.to_string());
            });
            g.on_best_score_update(|best| set_text("best", &best.to_string()));
            g.on_combo_update(|combo| set_text("combo", &combo.to_string()));
            g.on_level_update(|level| set_text("level", &level.to_string()));
            g.on_state_change(move |phase| {
                show_overlay(phase);
                if phase == GamePhase::GameOver {
                    set_text("final-score", &last_score.get().to_string());
                }
            });
        });
    }

    fn touch_point(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        let touch = event.changed_touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        handle: &GameHandle,
        feedback: WebFeedback,
    ) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if CAPTURED_KEYS.contains(&code.as_str()) {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                handle.with(|g| g.key_down(&code));
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                handle.with(|g| g.key_up(&event.code()));
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click drops (and unlocks audio)
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                feedback.resume();
                handle.with(|g| g.click());
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Swipe / tap
        {
            let handle = handle.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_point(&canvas_clone, &event) {
                    let now = js_sys::Date::now();
                    handle.with(|g| g.touch_start(x, y, now));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let handle = handle.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_point(&canvas_clone, &event) {
                    handle.with(|g| g.touch_move(x, y));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let now = js_sys::Date::now();
                handle.with(|g| g.touch_end(now));
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                handle.with(|g| g.touch_cancel());
            });
            let _ = canvas
                .add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen buttons
        for id in ["touch-left", "touch-right", "touch-drop"] {
            let Some(action) = id.strip_prefix("touch-").and_then(TouchAction::parse) else {
                continue;
            };
            let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
                continue;
            };
            let phases = [("touchstart", true), ("touchend", false), ("touchcancel", false)];
            for (event_name, pressed) in phases {
                let handle = handle.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    handle.with(|g| g.handle_touch(action, pressed));
                });
                let _ = el
                    .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_buttons(handle: &GameHandle) {
        on_click("start-btn", handle, |g| g.start_game());
        on_click("restart-btn", handle, |g| g.restart());
        on_click("resume-btn", handle, |g| g.force_resume());
        on_click("daily-btn", handle, |g| g.start_daily_challenge());
    }

    fn setup_settings(handle: &GameHandle) {
        let Some(settings) = handle.with(|g| *g.settings()) else {
            return;
        };
        let toggles: [(&str, bool, fn(bool) -> SettingsPatch); 3] = [
            ("setting-high-contrast", settings.high_contrast, |v| SettingsPatch {
                high_contrast: Some(v),
                ..Default::default()
            }),
            ("setting-reduced-motion", settings.reduced_motion, |v| SettingsPatch {
                reduced_motion: Some(v),
                ..Default::default()
            }),
            ("setting-sound", settings.sound_enabled, |v| SettingsPatch {
                sound_enabled: Some(v),
                ..Default::default()
            }),
        ];

        for (id, initial, patch) in toggles {
            let Some(input) = document()
                .and_then(|d| d.get_element_by_id(id))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            input.set_checked(initial);
            let handle = handle.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let checked = input_clone.checked();
                handle.with(|g| g.update_settings(patch(checked)));
            });
            let _ = input
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(handle: &GameHandle) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let handle = handle.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    handle.with(|g| {
                        if g.phase() == GamePhase::Playing {
                            log::info!("Auto-paused (tab hidden)");
                        }
                        g.force_pause();
                    });
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                handle.with(|g| {
                    if g.phase() == GamePhase::Playing {
                        log::info!("Auto-paused (window blur)");
                    }
                    g.force_pause();
                });
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(
        canvas: &HtmlCanvasElement,
        handle: &GameHandle,
        render_state: Rc<RefCell<RenderState>>,
    ) {
        let window = web_sys::window().expect("no window");
        let handle = handle.clone();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            handle.with(|g| g.resize(client_w as f32, client_h as f32));
            render_state
                .borrow_mut()
                .resize(width, height, (client_w as f32, client_h as f32));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Page teardown: stop the loop, cancel the pending frame, drop the game
    fn setup_teardown(handle: &GameHandle, cancel: CancelToken, raf_id: Rc<Cell<Option<i32>>>) {
        let window = web_sys::window().expect("no window");
        let handle = handle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            cancel.cancel();
            if let Some(id) = raf_id.take()
                && let Some(window) = web_sys::window()
            {
                let _ = window.cancel_animation_frame(id);
            }
            handle.destroy();
        });
        let _ = window
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(frame_loop: Rc<RefCell<FrameLoop>>, raf_id: Rc<Cell<Option<i32>>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next_loop = frame_loop.clone();
        let next_id = raf_id.clone();
        let closure = Closure::once(move |time: f64| {
            next_id.set(None);
            if next_loop.borrow_mut().step(time) {
                request_animation_frame(next_loop, next_id);
            } else {
                log::info!("Frame loop stopped");
            }
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => raf_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Stack Crane (native) starting...");
    log::info!("Native mode runs a headless autopilot; use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    autopilot::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use stack_crane::consts::FRAME_MS;
    use stack_crane::persistence::{MemoryStore, Storage};
    use stack_crane::sim::{BlockState, GamePhase};
    use stack_crane::{Game, GameEvent};

    const MAX_FRAMES: u32 = 60 * 60 * 5;
    /// Release when the hook is this close to the target
    const AIM_TOLERANCE: f32 = 3.0;

    /// Steer over the top of the stack, drop, repeat until the tower falls
    pub fn run(seed: u64) {
        let storage = Storage::new(MemoryStore::new());
        let mut game = Game::with_seed(400.0, 600.0, storage, seed);
        game.subscribe(|event| match event {
            GameEvent::LevelUpdated(level) if *level > 1 => log::info!("Level {}", level),
            GameEvent::ComboUpdated(combo) if *combo > 1 => log::info!("Combo x{}", combo),
            _ => {}
        });
        game.start_game();

        let mut frames = 0;
        while game.phase() == GamePhase::Playing && frames < MAX_FRAMES {
            steer(&mut game);
            game.update(FRAME_MS);
            frames += 1;
        }

        let state = game.state();
        log::info!(
            "Autopilot finished after {} frames: score {}, {} blocks, level {}, {} perfect",
            frames,
            state.score,
            state.blocks_placed,
            state.level,
            state.perfect_placements
        );
        let stats = game.storage().stats();
        log::info!(
            "Stats: {} game(s), average score {:.1}",
            stats.games_played,
            stats.average_score
        );
    }

    fn steer(game: &mut Game) {
        let state = game.state();
        let hanging = state
            .current
            .as_ref()
            .is_some_and(|b| b.state == BlockState::Hanging);
        let target = state
            .stack
            .last()
            .map_or(state.world.center_x(), |top| top.x);
        let crane_x = state.crane.x;

        game.key_up("ArrowLeft");
        game.key_up("ArrowRight");
        if !hanging {
            return;
        }
        if (crane_x - target).abs() <= AIM_TOLERANCE {
            game.drop_block();
        } else if crane_x < target {
            game.key_down("ArrowRight");
        } else {
            game.key_down("ArrowLeft");
        }
    }
}
