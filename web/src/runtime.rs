//! The handle a page script holds.
//!
//! `Runtime` wraps a [`Context`] driven by `requestAnimationFrame`. JS calls
//! `new Runtime(configJson)` once on load; the loop starts immediately.
//! Visibility changes pause and resume the loop and are broadcast on the
//! global emitter as a [`VISIBILITY`] event.

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;

use framekit::events::VISIBILITY;
use framekit::loader::AssetLoader;
use framekit::storage::{MemoryStore, Storage};
use framekit::{Config, Context};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

use crate::fetch::FetchAssetFetcher;
use crate::frame::AnimationFrameRequester;
use crate::js_error;
use crate::storage::LocalStorage;

/// Parse the page-supplied configuration. `None` or blank means defaults.
pub(crate) fn parse_config(json: Option<&str>) -> framekit::Result<Config> {
    match json.map(str::trim) {
        None | Some("") => Ok(Config::default()),
        Some(raw) => Config::from_json(raw),
    }
}

/// Parse an event payload. Blank means `null`.
pub(crate) fn parse_payload(json: &str) -> framekit::Result<Value> {
    if json.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(json)?)
}

enum Store {
    Local(Storage<LocalStorage>),
    Memory(Storage<MemoryStore>),
}

#[wasm_bindgen]
pub struct Runtime {
    ctx: Context,
    store: Store,
}

#[wasm_bindgen]
impl Runtime {
    /// Create the runtime and request the first frame.
    ///
    /// # Errors
    ///
    /// Throws if there is no `window` or `config_json` is not a config object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Runtime, JsValue> {
        let config = parse_config(config_json.as_deref()).map_err(js_error)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let store = match LocalStorage::from_window(&window) {
            Some(local) => Store::Local(Storage::new(local)),
            None => {
                tracing::warn!("falling back to in-memory storage");
                Store::Memory(Storage::new(MemoryStore::new()))
            }
        };
        let ctx = Context::new(config, AnimationFrameRequester::new(window));
        ctx.render().arm();
        Ok(Self { ctx, store })
    }

    pub fn pause(&self) {
        self.ctx.render().pause();
    }

    pub fn resume(&self) {
        self.ctx.render().resume();
    }

    #[wasm_bindgen(js_name = isPaused)]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.ctx.render().is_paused()
    }

    /// Timestamp of the current frame, in milliseconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.ctx.time()
    }

    /// Capped delta of the current frame, in milliseconds.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.ctx.delta()
    }

    /// Pause while hidden, resume when shown, and tell subscribers.
    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&self, visible: bool) {
        if visible {
            self.ctx.render().resume();
        } else {
            self.ctx.render().pause();
        }
        self.ctx.global_emitter().fire(VISIBILITY, &json!({ "type": if visible { "focus" } else { "blur" } }));
    }

    /// Fire `event` on the global emitter with a JSON payload.
    ///
    /// # Errors
    ///
    /// Throws if `payload_json` is not valid JSON.
    pub fn emit(&self, event: &str, payload_json: &str) -> Result<bool, JsValue> {
        let payload = parse_payload(payload_json).map_err(js_error)?;
        Ok(self.ctx.global_emitter().fire(event, &payload))
    }

    /// Load `paths` and call `on_complete` once every one finished.
    #[wasm_bindgen(js_name = loadAssets)]
    pub fn load_assets(&self, paths: Vec<String>, on_complete: js_sys::Function) {
        let loader = AssetLoader::new(&self.ctx, paths);
        loader.load(&FetchAssetFetcher, move || {
            if let Err(err) = on_complete.call0(&JsValue::NULL) {
                tracing::warn!(error = ?err, "asset completion callback threw");
            }
        });
    }

    /// Store a JSON value; `null` removes the key.
    ///
    /// # Errors
    ///
    /// Throws if `value_json` is not valid JSON.
    #[wasm_bindgen(js_name = setItem)]
    pub fn set_item(&self, key: &str, value_json: &str) -> Result<(), JsValue> {
        let value = parse_payload(value_json).map_err(js_error)?;
        match &self.store {
            Store::Local(s) => s.set(key, &value),
            Store::Memory(s) => s.set(key, &value),
        }
        Ok(())
    }

    /// Read a stored value back as JSON text, or `undefined` if absent.
    ///
    /// # Errors
    ///
    /// Throws if the stored value looks like JSON but does not parse.
    #[wasm_bindgen(js_name = getItem)]
    pub fn get_item(&self, key: &str) -> Result<Option<String>, JsValue> {
        let value = match &self.store {
            Store::Local(s) => s.get(key),
            Store::Memory(s) => s.get(key),
        }
        .map_err(js_error)?;
        Ok(value.map(|v| v.to_string()))
    }
}
