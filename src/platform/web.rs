//! Browser bindings
//!
//! `WebGame` is the handle the page drives: it forwards pointer events in
//! client coordinates, calls `frame` from `requestAnimationFrame` and draws
//! the returned snapshot. Progress documents live in LocalStorage.

use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::persistence::{DocumentStore, PersistError, ProfileRecord};
use crate::platform::CanvasTransform;
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{GameState, InputEvent, StoreOffer};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialized by a previous instance
        return;
    }
    log::info!("Echo Path starting...");
}

/// Document store backed by `window.localStorage`, one item per key
#[derive(Debug, Default)]
pub struct LocalStore {
    prefix: String,
}

impl LocalStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistError::Unavailable("LocalStorage not available".into()))
    }

    fn js_err(e: JsValue) -> PersistError {
        PersistError::Unavailable(format!("{:?}", e))
    }
}

impl DocumentStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        let storage = Self::storage()?;
        let item = storage
            .get_item(&format!("{}{}", self.prefix, key))
            .map_err(Self::js_err)?;
        match item {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, doc: Value) -> Result<(), PersistError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(&doc)?;
        storage
            .set_item(&format!("{}{}", self.prefix, key), &json)
            .map_err(Self::js_err)
    }

    fn list(&self, prefix: &str) -> Result<Vec<Value>, PersistError> {
        let storage = Self::storage()?;
        let full_prefix = format!("{}{}", self.prefix, prefix);
        let count = storage.length().map_err(Self::js_err)?;

        let mut keys = Vec::new();
        for i in 0..count {
            if let Some(key) = storage.key(i).map_err(Self::js_err)? {
                if key.starts_with(&full_prefix) {
                    keys.push(key);
                }
            }
        }
        // Storage order is unspecified
        keys.sort();

        let mut docs = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(json) = storage.get_item(&key).map_err(Self::js_err)? {
                docs.push(serde_json::from_str(&json)?);
            }
        }
        Ok(docs)
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Game instance exported to the page
#[wasm_bindgen]
pub struct WebGame {
    session: Session<LocalStore>,
    audio: AudioManager,
    settings: Settings,
    transform: CanvasTransform,
    last_time: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(user_id: String) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(seed, Tuning::default());
        log::info!("Campaign generated with seed: {}", seed);

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        WebGame {
            session: Session::new(state, LocalStore::new("echo_path/"), user_id),
            audio,
            settings,
            transform: CanvasTransform::default(),
            last_time: 0.0,
        }
    }

    /// Resolve the starting screen; returns the phase name
    pub fn boot(&mut self) -> String {
        format!("{:?}", self.session.boot())
    }

    /// Canvas bounding rect in client coordinates
    pub fn set_canvas_rect(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.transform = CanvasTransform::new(left, top, width, height);
    }

    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        let p = self.transform.to_field(glam::Vec2::new(client_x, client_y));
        self.session.push_input(InputEvent::PointerDown(p));
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        let p = self.transform.to_field(glam::Vec2::new(client_x, client_y));
        self.session.push_input(InputEvent::PointerMove(p));
    }

    pub fn pointer_up(&mut self) {
        self.session.push_input(InputEvent::PointerUp);
    }

    /// Advance to `now_ms` (the rAF timestamp), play sounds and return the
    /// frame snapshot as JSON
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let dt = if self.last_time > 0.0 {
            ((now_ms - self.last_time) / 1000.0) as f32
        } else {
            crate::consts::SIM_DT
        };
        self.last_time = now_ms;

        self.session.update(dt);
        let events = self.session.drain_events();
        self.audio.play_events(&events);

        serde_json::to_string(&self.session.snapshot()).map_err(to_js)
    }

    pub fn save_profile(&mut self, name: String, avatar: String) -> Result<(), JsValue> {
        let profile = ProfileRecord { name, avatar };
        self.session.save_profile(profile).map_err(to_js)
    }

    pub fn start_run(&mut self) -> bool {
        self.session.start_run()
    }

    pub fn retry(&mut self) -> bool {
        self.session.retry()
    }

    pub fn buy_respawn(&mut self) -> bool {
        self.session.buy_respawn()
    }

    pub fn restart_from_zero(&mut self) -> bool {
        self.session.restart_from_zero()
    }

    pub fn exit_to_menu(&mut self) -> bool {
        self.session.exit_to_menu()
    }

    pub fn open_store(&mut self) -> bool {
        self.session.open_store()
    }

    pub fn open_ranking(&mut self) -> bool {
        self.session.open_ranking()
    }

    /// Buy a store screen offer by catalog position
    pub fn buy(&mut self, index: usize) -> bool {
        match StoreOffer::CATALOG.get(index) {
            Some(offer) => self.session.buy(*offer),
            None => false,
        }
    }

    pub fn buy_quick_echoes(&mut self) -> bool {
        self.session.buy(StoreOffer::QuickEchoes15)
    }

    /// Sorted leaderboard rows as JSON
    pub fn leaderboard_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.leaderboard().top()).map_err(to_js)
    }

    pub fn reward_active(&self) -> bool {
        self.session
            .leaderboard()
            .reward_active(self.session.user_id())
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.toggle_mute();
        self.audio.apply_settings(&self.settings);
        self.settings.save();
        muted
    }

    /// Called from the page's focus/blur and visibilitychange handlers
    pub fn set_focused(&mut self, focused: bool) {
        self.audio.set_focused(focused, &self.settings);
    }

    pub fn set_volume(&mut self, master: f32) {
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.audio.apply_settings(&self.settings);
        self.settings.save();
    }
}
