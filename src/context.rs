//! The process-wide scheduling context.
//!
//! One [`Context`] per page owns the render loop, the timer queue, the tween
//! manager and the global event emitter. Constructing it registers the timer
//! tick and then the tween update as the render loop's first two callbacks.
//!
//! Handles are cheap to clone and share one underlying context.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::events::{Emitter, Events};
use crate::render::{FrameCallback, FrameRequester, Render, Tick};
use crate::timer::{Timer, TimerId};
use crate::tween::{Tween, TweenHandle, TweenManager, TweenTarget};

struct Inner {
    config: Config,
    render: Rc<Render>,
    timer: Rc<Timer>,
    tweens: Rc<TweenManager>,
    global: Rc<Emitter>,
}

/// Shared handle to the render loop, timers, tweens and global events.
#[derive(Clone)]
pub struct Context {
    inner: Rc<Inner>,
}

impl Context {
    /// Build a context driven by `requester`. Call [`Render::arm`] (via
    /// [`Context::render`]) once the host is ready for frames.
    pub fn new(config: Config, requester: impl FrameRequester + 'static) -> Self {
        let render = Render::new(config.skip_limit_ms, requester);
        let timer = Rc::new(Timer::new(config.min_timer_ms));
        let tweens = Rc::new(TweenManager::new());

        let t = Rc::clone(&timer);
        render.start(
            &FrameCallback::new(move |tick| {
                if let Tick::Frame { time, delta } = tick {
                    t.tick(time, delta);
                }
            }),
            None,
        );
        let m = Rc::clone(&tweens);
        render.start(
            &FrameCallback::new(move |tick| {
                if let Tick::Frame { time, .. } = tick {
                    m.update(time);
                }
            }),
            None,
        );

        tracing::debug!(
            skip_limit_ms = config.skip_limit_ms,
            min_timer_ms = config.min_timer_ms,
            "context created"
        );
        Self {
            inner: Rc::new(Inner { config, render, timer, tweens, global: Rc::new(Emitter::new()) }),
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn render(&self) -> &Rc<Render> {
        &self.inner.render
    }

    #[must_use]
    pub fn timer(&self) -> &Rc<Timer> {
        &self.inner.timer
    }

    #[must_use]
    pub fn tweens(&self) -> &Rc<TweenManager> {
        &self.inner.tweens
    }

    /// The emitter every bus falls through to.
    #[must_use]
    pub fn global_emitter(&self) -> &Rc<Emitter> {
        &self.inner.global
    }

    /// Timestamp of the current frame.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.inner.render.time()
    }

    /// Capped delta of the current frame.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.inner.render.delta()
    }

    // ── Conveniences ────────────────────────────────────────────

    /// A new per-instance event bus falling through to the global emitter.
    #[must_use]
    pub fn events(&self) -> Events {
        Events::new(&self.inner.global)
    }

    /// Run `callback` once `time_ms` of frame time has passed.
    pub fn delayed_call(&self, callback: impl FnOnce() + 'static, time_ms: f64) -> TimerId {
        self.inner.timer.create(callback, time_ms)
    }

    pub fn clear_timeout(&self, id: &TimerId) -> bool {
        self.inner.timer.clear_timeout(id)
    }

    /// Start `tween` on `target` from the current frame time.
    pub fn tween<T: TweenTarget + 'static>(&self, target: &Rc<RefCell<T>>, tween: Tween) -> TweenHandle {
        self.inner.tweens.start(target, tween, self.time())
    }

    pub fn clear_tween<T: ?Sized>(&self, target: &Rc<RefCell<T>>) {
        self.inner.tweens.clear_tween(target);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.inner.config)
            .field("render", &self.inner.render)
            .field("timer", &self.inner.timer)
            .field("tweens", &self.inner.tweens)
            .finish_non_exhaustive()
    }
}
