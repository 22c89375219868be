//! `requestAnimationFrame` as the render loop's frame source.

use std::rc::Weak;

use framekit::render::{FrameRequester, Render};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Schedules [`Render::step`] before the browser's next repaint.
///
/// Each request hands the browser a one-shot closure holding only a weak
/// reference to the loop, so dropping the runtime stops the loop at the next
/// frame.
#[derive(Debug, Clone)]
pub struct AnimationFrameRequester {
    window: web_sys::Window,
}

impl AnimationFrameRequester {
    #[must_use]
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl FrameRequester for AnimationFrameRequester {
    fn request_frame(&self, render: Weak<Render>) {
        let step = Closure::once_into_js(move |timestamp: f64| {
            if let Some(render) = render.upgrade() {
                render.step(timestamp);
            }
        });
        if let Err(err) = self.window.request_animation_frame(step.unchecked_ref()) {
            tracing::warn!(error = ?err, "requestAnimationFrame failed; render loop stalled");
        }
    }
}
