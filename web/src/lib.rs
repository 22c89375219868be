//! Browser host for the framekit scheduling core.
//!
//! This crate is compiled to WebAssembly and runs in the page. It supplies
//! the browser side of the core's seams: `requestAnimationFrame` drives the
//! render loop, `localStorage` backs the key/value store, and `fetch` loads
//! assets. Everything that does not need a browser lives in `framekit` and
//! is tested natively there.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`frame`] | `requestAnimationFrame`-backed [`framekit::render::FrameRequester`] |
//! | [`storage`] | `localStorage`-backed [`framekit::storage::KeyValueStore`] |
//! | [`fetch`] | `fetch`-backed [`framekit::loader::AssetFetcher`] |
//! | [`runtime`] | `#[wasm_bindgen]` handle the page script holds |

pub mod fetch;
pub mod frame;
pub mod runtime;
pub mod storage;

use wasm_bindgen::prelude::*;

/// Module entry point: route panics and `tracing` events to the console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("console logger not installed: {err}")));
    }
    tracing::debug!("framekit web host started");
}

/// Convert any displayable error into a JS exception value.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
