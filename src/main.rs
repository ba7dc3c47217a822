//! Flappy Pillars entry point
//!
//! On the web this wires the DOM (menus, settings panel, input) to a
//! `GameSession` and drives it with requestAnimationFrame and a one second
//! countdown interval. Native builds run a headless autopilot round.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, HtmlCanvasElement, HtmlInputElement, HtmlSelectElement};

    use flappy_pillars::audio::{AudioSink, MusicTrack, SoundCue, WebAudio};
    use flappy_pillars::persistence::{LocalStore, PreferenceStore};
    use flappy_pillars::renderer::CanvasRenderer;
    use flappy_pillars::sim::{AttractScene, FieldSize, GamePhase};
    use flappy_pillars::{
        EyeSize, FrameHandle, FrameView, GameSession, Renderer, Scheduler, Settings, TimerHandle,
        Tuning, fit_aspect,
    };

    /// Browser side of the session's collaborators
    struct WebHost {
        app: Weak<RefCell<App>>,
        renderer: CanvasRenderer,
        audio: WebAudio,
        frame: Option<(FrameHandle, i32, Closure<dyn FnMut(f64)>)>,
        /// Fired frame callback, kept alive until it has finished running
        retired_frame: Option<Closure<dyn FnMut(f64)>>,
        timer: Option<(TimerHandle, i32, Closure<dyn FnMut()>)>,
        /// Stopped timer callback, kept alive until it has finished running
        retired_timer: Option<Closure<dyn FnMut()>>,
    }

    impl Scheduler for WebHost {
        fn request_frame(&mut self, handle: FrameHandle) {
            let Some(window) = web_sys::window() else { return };
            let app = self.app.clone();
            let callback = Closure::<dyn FnMut(f64)>::once(move |_time: f64| {
                if let Some(app) = app.upgrade() {
                    run_frame(&app, handle);
                }
            });
            match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                Ok(id) => self.frame = Some((handle, id, callback)),
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let Some((pending, id, callback)) = self.frame.take() else {
                return;
            };
            if pending != handle {
                self.frame = Some((pending, id, callback));
                return;
            }
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
            // Never ran, safe to free now
            drop(callback);
        }

        fn start_countdown(&mut self, handle: TimerHandle) {
            let Some(window) = web_sys::window() else { return };
            let app = self.app.clone();
            let callback = Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = app.upgrade() {
                    run_countdown_tick(&app, handle);
                }
            });
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                1000,
            ) {
                Ok(id) => self.timer = Some((handle, id, callback)),
                Err(e) => log::error!("setInterval failed: {:?}", e),
            }
        }

        fn stop_countdown(&mut self, handle: TimerHandle) {
            let Some((running, id, callback)) = self.timer.take() else {
                return;
            };
            if running != handle {
                self.timer = Some((running, id, callback));
                return;
            }
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(id);
            }
            // Usually called from inside this very callback
            self.retired_timer = Some(callback);
        }
    }

    impl Renderer for WebHost {
        fn draw_frame(&mut self, frame: &FrameView<'_>) {
            self.renderer.draw_frame(frame);
        }
    }

    impl AudioSink for WebHost {
        fn play(&mut self, cue: SoundCue) {
            self.audio.play(cue);
        }

        fn set_music(&mut self, track: MusicTrack) {
            self.audio.set_music(track);
        }
    }

    struct App {
        session: GameSession,
        host: WebHost,
        settings: Settings,
        prefs: Option<PreferenceStore<LocalStore>>,
        attract: AttractScene,
        background: CanvasRenderer,
        attract_seed: u64,
    }

    impl App {
        fn save_settings(&mut self) {
            self.host.renderer.set_preferences(&self.settings);
            self.background.set_preferences(&self.settings);
            self.host.audio.apply_settings(&self.settings);
            if let Some(prefs) = self.prefs.as_mut() {
                if let Err(e) = prefs.save(&self.settings) {
                    log::warn!("Could not save settings: {}", e);
                }
            }
        }
    }

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    fn canvas(document: &Document, id: &str) -> HtmlCanvasElement {
        document
            .get_element_by_id(id)
            .expect("missing canvas")
            .dyn_into()
            .expect("not a canvas")
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy Pillars starting...");

        let document = document();
        let game_canvas = canvas(&document, "game-canvas");
        let bg_canvas = canvas(&document, "background-canvas");
        let field = resize_canvases(&[&game_canvas, &bg_canvas]);

        let prefs = match LocalStore::open() {
            Ok(store) => Some(PreferenceStore::new(store)),
            Err(e) => {
                log::warn!("{}; settings will not persist", e);
                None
            }
        };
        let settings = prefs
            .as_ref()
            .map(|p| p.load())
            .unwrap_or_default();

        let tuning = Tuning::default();
        let seed = js_sys::Date::now() as u64;
        let renderer = CanvasRenderer::new(game_canvas, &settings).expect("2d canvas");
        let background = CanvasRenderer::new(bg_canvas, &settings).expect("2d canvas");
        let audio = WebAudio::new(&settings);

        let app = Rc::new_cyclic(|weak| {
            RefCell::new(App {
                attract: AttractScene::new(&tuning, field, seed ^ 0x5eed),
                session: GameSession::new(tuning, field, seed),
                host: WebHost {
                    app: weak.clone(),
                    renderer,
                    audio,
                    frame: None,
                    retired_frame: None,
                    timer: None,
                    retired_timer: None,
                },
                settings,
                prefs,
                background,
                attract_seed: seed,
            })
        });

        log::info!("Session created with seed: {}", seed);

        init_settings_inputs(&document, &app.borrow().settings);
        setup_menu(&document, app.clone());
        setup_settings_panel(&document, app.clone());
        setup_round_buttons(&document, app.clone());
        setup_input_handlers(app.clone());
        setup_resize(app.clone());

        app.borrow_mut().host.set_music(MusicTrack::Menu);
        sync_dom(&app.borrow());
        request_background_frame(app);

        log::info!("Flappy Pillars running!");
    }

    // === Session callbacks ===

    fn run_frame(app: &Rc<RefCell<App>>, handle: FrameHandle) {
        let mut guard = app.borrow_mut();
        let App { session, host, .. } = &mut *guard;
        if host.frame.as_ref().is_some_and(|(pending, _, _)| *pending == handle) {
            // This callback is still on the stack
            host.retired_frame = host.frame.take().map(|(_, _, callback)| callback);
        }
        let game_over = session
            .on_frame(handle, host)
            .is_some_and(|outcome| outcome.collision.is_some());
        if game_over {
            sync_dom(&guard);
        }
    }

    fn run_countdown_tick(app: &Rc<RefCell<App>>, handle: TimerHandle) {
        let mut guard = app.borrow_mut();
        let App { session, host, .. } = &mut *guard;
        session.on_countdown_tick(handle, host);
        sync_dom(&guard);
    }

    /// Run a session command with the host, then refresh overlays
    fn command(app: &Rc<RefCell<App>>, f: impl FnOnce(&mut GameSession, &mut WebHost)) {
        let mut guard = app.borrow_mut();
        let App { session, host, .. } = &mut *guard;
        f(session, host);
        sync_dom(&guard);
    }

    // === Menu background (attract mode) ===

    fn request_background_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let callback = Closure::once_into_js(move |time: f64| {
            {
                let mut guard = app.borrow_mut();
                let App {
                    session,
                    attract,
                    background,
                    ..
                } = &mut *guard;
                if session.phase() == GamePhase::Menu {
                    attract.step(session.tuning(), time / 1000.0);
                    background.draw_attract(attract, session.tuning().pillar_width);
                }
            }
            request_background_frame(app);
        });
        let _ = window.request_animation_frame(callback.unchecked_ref());
    }

    // === DOM ===

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Show the containers and overlays that match the session phase
    fn sync_dom(app: &App) {
        let document = document();
        let phase = app.session.phase();

        set_hidden(&document, "menu-container", phase != GamePhase::Menu);
        set_hidden(&document, "game-container", phase == GamePhase::Menu);
        set_hidden(&document, "pause-menu", phase != GamePhase::Paused);

        match app.session.countdown_remaining() {
            Some(n) => {
                if let Some(el) = document.get_element_by_id("countdown") {
                    el.set_text_content(Some(&n.to_string()));
                }
                set_hidden(&document, "countdown", false);
            }
            None => set_hidden(&document, "countdown", true),
        }

        if let GamePhase::GameOver { final_score, .. } = phase {
            if let Some(el) = document.get_element_by_id("final-score") {
                el.set_text_content(Some(&final_score.to_string()));
            }
            set_hidden(&document, "game-over", false);
        } else {
            set_hidden(&document, "game-over", true);
        }
    }

    fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            listen(&el, "click", move |_| handler());
        }
    }

    fn on_change(document: &Document, id: &str, handler: impl FnMut(web_sys::Event) + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            listen(&el, "change", handler);
        }
    }

    fn input_of(event: &web_sys::Event) -> Option<HtmlInputElement> {
        event.target()?.dyn_into::<HtmlInputElement>().ok()
    }

    fn setup_menu(document: &Document, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click(document, "new-game", move || {
                command(&app, |s, h| s.start_round(h));
            });
        }
        on_click(document, "settings", || open_settings(true));
        on_click(document, "back-to-menu", || open_settings(false));
        on_click(document, "quit", || {
            if let Some(window) = web_sys::window() {
                let _ = window.close();
            }
        });
    }

    fn open_settings(open: bool) {
        let document = document();
        set_hidden(&document, "settings-menu", !open);
        set_hidden(&document, "menu", open);
    }

    fn init_settings_inputs(document: &Document, settings: &Settings) {
        let input = |id: &str| {
            document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        };
        if let Some(el) = input("bird-color") {
            el.set_value(&settings.bird_color);
        }
        if let Some(el) = input("game-volume") {
            el.set_value(&settings.effects_volume.to_string());
        }
        if let Some(el) = input("music-volume") {
            el.set_value(&settings.music_volume.to_string());
        }
        if let Some(el) = input("mute") {
            el.set_checked(settings.muted);
        }
        if let Some(el) = document
            .get_element_by_id("eye-size")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            el.set_value(settings.eye_size.as_str());
        }
    }

    fn setup_settings_panel(document: &Document, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_change(document, "bird-color", move |event| {
                let Some(input) = input_of(&event) else { return };
                let mut a = app.borrow_mut();
                if a.settings.set_bird_color(&input.value()) {
                    a.save_settings();
                }
            });
        }
        {
            let app = app.clone();
            on_change(document, "eye-size", move |event| {
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
                else {
                    return;
                };
                if let Some(size) = EyeSize::from_str(&select.value()) {
                    let mut a = app.borrow_mut();
                    a.settings.eye_size = size;
                    a.save_settings();
                }
            });
        }
        {
            let app = app.clone();
            on_change(document, "game-volume", move |event| {
                let Some(vol) = input_of(&event).and_then(|i| i.value().parse::<f32>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                a.settings.set_effects_volume(vol);
                a.save_settings();
            });
        }
        {
            let app = app.clone();
            on_change(document, "music-volume", move |event| {
                let Some(vol) = input_of(&event).and_then(|i| i.value().parse::<f32>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                a.settings.set_music_volume(vol);
                a.save_settings();
            });
        }
        on_change(document, "mute", move |event| {
            let Some(input) = input_of(&event) else { return };
            let mut a = app.borrow_mut();
            a.settings.muted = input.checked();
            a.save_settings();
        });
    }

    fn setup_round_buttons(document: &Document, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click(document, "resume", move || {
                command(&app, |s, h| s.resume_round(h));
            });
        }
        for id in ["restart", "reset"] {
            let app = app.clone();
            on_click(document, id, move || {
                command(&app, |s, h| s.restart_round(h));
            });
        }
        for id in ["back-to-main-menu", "game-over-menu"] {
            let app = app.clone();
            on_click(document, id, move || {
                command(&app, |s, h| s.return_to_menu(h));
            });
        }
        on_click(document, "pause-settings", || open_settings(true));
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let app = app.clone();
            listen(&window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                match event.key().as_str() {
                    " " => command(&app, |s, h| s.flap(h)),
                    "Escape" => command(&app, |s, h| s.pause(h)),
                    _ => {}
                }
            });
        }
        for event in ["click", "touchstart"] {
            let app = app.clone();
            listen(&window, event, move |_| {
                command(&app, |s, h| s.flap(h));
            });
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        listen(&window, "resize", move |_| {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            let field = resize_canvases(&[a.host.renderer.canvas(), a.background.canvas()]);
            a.session.set_field_size(field.width, field.height);
            a.attract_seed = a.attract_seed.wrapping_add(1);
            a.attract = AttractScene::new(a.session.tuning(), field, a.attract_seed);
        });
    }

    /// Letterbox every canvas to the playfield aspect ratio
    fn resize_canvases(canvases: &[&HtmlCanvasElement]) -> FieldSize {
        let window = web_sys::window().expect("no window");
        let vw = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        let vh = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        let (w, h) = fit_aspect(vw, vh);
        for canvas in canvases {
            canvas.set_width(w as u32);
            canvas.set_height(h as u32);
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", w as u32));
            let _ = style.set_property("height", &format!("{}px", h as u32));
        }
        FieldSize::new(w.floor(), h.floor())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use flappy_pillars::host::HeadlessHost;
    use flappy_pillars::sim::{FieldSize, GamePhase, Round};
    use flappy_pillars::{GameSession, Tuning};

    /// Hard stop for a round that never ends (about ten minutes at 60 Hz)
    const MAX_TICKS: u64 = 60 * 60 * 10;

    /// Flap whenever the bird sinks below the middle of the next gap
    fn should_flap(round: &Round, tuning: &Tuning) -> bool {
        let actor = &round.actor;
        let Some(next) = round
            .obstacles
            .iter()
            .find(|o| o.right(tuning.pillar_width) >= actor.x() - actor.radius)
        else {
            return actor.y() > round.field.height / 2.0 && actor.vel >= 0.0;
        };
        let target = (next.gap_top + next.gap_bottom) / 2.0 + actor.radius;
        actor.y() > target && actor.vel >= 0.0
    }

    pub fn run(tuning: Tuning, seed: u64) -> u32 {
        let mut host = HeadlessHost::new();
        let mut session = GameSession::new(tuning, FieldSize::new(800.0, 450.0), seed);

        session.start_round(&mut host);
        while let Some(timer) = host.countdown {
            session.on_countdown_tick(timer, &mut host);
        }

        let mut ticks = 0;
        while let Some(frame) = host.take_frame() {
            if ticks >= MAX_TICKS {
                log::info!("Tick limit reached, pausing");
                host.pending_frame = Some(frame);
                session.pause(&mut host);
                break;
            }
            if let Some(round) = session.round() {
                if should_flap(round, session.tuning()) {
                    session.flap(&mut host);
                }
            }
            session.on_frame(frame, &mut host);
            ticks += 1;
        }

        match session.phase() {
            GamePhase::GameOver { final_score, cause } => {
                log::info!("Round over after {} ticks: {:?}", ticks, cause);
                final_score
            }
            _ => session.score(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Pillars (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let tuning = match std::env::var("FLAPPY_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| flappy_pillars::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        Err(_) => flappy_pillars::Tuning::default(),
    };

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let score = headless::run(tuning, seed);
    println!("Autopilot scored {} (seed {})", score, seed);
}
