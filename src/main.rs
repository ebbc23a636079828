//! Eight Ball entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use eight_ball::Settings;
    use eight_ball::commentary::{self, ChatLog, CommentaryTicket};
    use eight_ball::consts::*;
    use eight_ball::renderer::{RenderState, Viewport, build_scene};
    use eight_ball::sim::{GamePhase, GameState, Side, TickConfig, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        tick_config: TickConfig,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        chat: ChatLog,
        /// Last text written to each HUD element, to skip redundant DOM writes
        hud_cache: Vec<(&'static str, String)>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement) -> Self {
            let settings = Settings::load();
            let tick_config = TickConfig {
                physics: settings.physics.clone(),
                opponent_delay_ticks: settings.opponent_delay_ticks,
            };
            Self {
                state: GameState::new(seed),
                settings,
                tick_config,
                render_state: None,
                canvas,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                chat: ChatLog::new(),
                hud_cache: Vec::new(),
            }
        }

        /// Canvas-relative CSS pixels to table coordinates
        fn to_table(&self, x: f32, y: f32) -> Vec2 {
            let viewport = Viewport::new(
                self.canvas.client_width() as f32,
                self.canvas.client_height() as f32,
                Vec2::new(self.state.table.width, self.state.table.height),
            );
            viewport.screen_to_table(Vec2::new(x, y))
        }

        /// Run simulation ticks; returns commentary prompts raised this frame
        fn update(&mut self, dt: f32) -> Vec<String> {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, &self.tick_config);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.press = None;
                self.input.pointer = None;
                self.input.release = None;
                self.input.confirm_place = false;
            }

            let mut prompts = Vec::new();
            for event in self.state.take_events() {
                self.chat.record(&event);
                if self.settings.commentary {
                    prompts.extend(commentary::commentary_prompt(&event));
                }
            }
            prompts
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = build_scene(&self.state, &self.settings);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn set_text(&mut self, document: &Document, id: &'static str, text: String) {
            if let Some((_, cached)) = self.hud_cache.iter().find(|(key, _)| *key == id) {
                if *cached == text {
                    return;
                }
            }
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(&text));
            }
            self.hud_cache.retain(|(key, _)| *key != id);
            self.hud_cache.push((id, text));
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let status = match (self.state.phase, self.state.winner) {
                (GamePhase::GameOver, Some(winner)) => {
                    format!("WINNER: {}", winner.name().to_uppercase())
                }
                (GamePhase::Moving, _) => "Balls Rolling...".to_string(),
                (GamePhase::PlacingCueBall, _) => "Ball in Hand".to_string(),
                _ => "Aiming...".to_string(),
            };
            self.set_text(&document, "hud-status", status);

            let turn = match self.state.turn {
                Side::Player => "Your Turn",
                Side::Opponent => "Robot's Turn",
            };
            self.set_text(&document, "hud-turn", turn.to_string());

            let group = match self.state.player_group {
                Some(group) => format!("You: {}S", group.as_str()),
                None => "Open Table".to_string(),
            };
            self.set_text(&document, "hud-group", group);

            let mode = if self.input.autoplay { "Autoplay" } else { "" };
            self.set_text(&document, "hud-mode", mode.to_string());

            let chat = self
                .chat
                .messages()
                .map(|m| format!("{}: {}", m.sender.label(), m.text))
                .collect::<Vec<_>>()
                .join("\n");
            self.set_text(&document, "chat-log", chat);

            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    if let Some(winner) = self.state.winner {
                        self.set_text(&document, "winner-text", format!("{} WINS!", winner.name()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Reset game state for restart; replies still in flight are dropped
        fn restart(&mut self, seed: u64) {
            self.state = GameState::new(seed);
            self.accumulator = 0.0;
            let autoplay = self.input.autoplay;
            self.input = TickInput {
                autoplay,
                ..Default::default()
            };
            self.chat.reset();
            log::info!("Game restarted with seed: {}", seed);
        }

        fn toggle_setting(&mut self, key: &str) {
            match key {
                "g" | "G" => self.settings.guide_line = !self.settings.guide_line,
                "c" | "C" => self.settings.commentary = !self.settings.commentary,
                _ => return,
            }
            self.settings.save();
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Eight Ball starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone())));
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let table = {
            let g = game.borrow();
            Vec2::new(g.state.table.width, g.state.table.height)
        };
        let render_state = RenderState::new(surface, &adapter, width, height, table)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_restart_buttons(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Eight Ball running!");
        Ok(())
    }

    fn touch_point(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        // changedTouches also covers touchend, where touches is empty
        let touch = event.changed_touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    #[derive(Clone, Copy)]
    enum Pointer {
        Press,
        Move,
        Release,
    }

    fn apply_pointer(game: &Rc<RefCell<Game>>, kind: Pointer, x: f32, y: f32) {
        let mut g = game.borrow_mut();
        let point = g.to_table(x, y);
        match kind {
            Pointer::Press => g.input.press = Some(point),
            Pointer::Move => g.input.pointer = Some(point),
            Pointer::Release => g.input.release = Some(point),
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        for (name, kind) in [
            ("mousedown", Pointer::Press),
            ("mousemove", Pointer::Move),
            ("mouseup", Pointer::Release),
        ] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                apply_pointer(&game, kind, event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (name, kind) in [
            ("touchstart", Pointer::Press),
            ("touchmove", Pointer::Move),
            ("touchend", Pointer::Release),
        ] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_point(&canvas_clone, &event) {
                    apply_pointer(&game, kind, x, y);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => g.input.confirm_place = true,
                    "a" | "A" => {
                        g.input.autoplay = !g.input.autoplay;
                        log::info!("Autoplay: {}", g.input.autoplay);
                    }
                    key => g.toggle_setting(key),
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Ask for a line of table talk without blocking the frame
    fn spawn_commentary(game: Rc<RefCell<Game>>, prompt: String, ticket: CommentaryTicket) {
        wasm_bindgen_futures::spawn_local(async move {
            let reply = commentary::generate_commentary(&prompt).await;
            game.borrow_mut().chat.accept(ticket, reply);
        });
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let (prompts, ticket) = {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let prompts = g.update(dt);
            g.render();
            g.update_hud();
            (prompts, g.chat.ticket())
        };

        for prompt in prompts {
            spawn_commentary(game.clone(), prompt, ticket);
        }

        request_animation_frame(game);
    }

    fn setup_restart_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for id in ["restart-btn", "play-again-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let seed = js_sys::Date::now() as u64;
                    game.borrow_mut().restart(seed);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Eight Ball failed to start: {:?}", e);
    }
}

/// Native build: play one headless autoplay game and log how it went
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use eight_ball::commentary::{self, ChatLog};
    use eight_ball::sim::{GamePhase, GameState, TickConfig, TickInput, tick};

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(8);
    log::info!("Eight Ball (native) starting headless game with seed {}", seed);
    log::info!("The interactive table runs in the browser - build with `trunk serve`");

    let mut state = GameState::new(seed);
    let mut chat = ChatLog::new();
    let settings = eight_ball::Settings::load();
    let config = TickConfig {
        physics: settings.physics,
        opponent_delay_ticks: 0,
    };
    let input = TickInput {
        autoplay: true,
        ..Default::default()
    };

    // An hour of play at 60 Hz
    const TICK_LIMIT: u64 = 60 * 60 * 60;
    while state.phase != GamePhase::GameOver && state.time_ticks < TICK_LIMIT {
        tick(&mut state, &input, &config);
        for event in state.take_events() {
            chat.record(&event);
            if let Some((sender, text)) = commentary::event_message(&event) {
                log::info!("{}: {}", sender.label(), text);
            }
            if let Some(prompt) = commentary::commentary_prompt(&event) {
                log::debug!("{}", prompt);
            }
        }
    }

    match state.winner {
        Some(winner) => println!(
            "{} wins after {} shots ({} ticks)",
            winner.name(),
            state.shots_taken,
            state.time_ticks
        ),
        None => println!("No winner after {} shots", state.shots_taken),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
