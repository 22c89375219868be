//! Lifecycle owner for scheduling resources.
//!
//! A [`Component`] remembers what it scheduled (timer handles, render
//! callbacks, tweens) and the child components added to it, so a single
//! [`Component::destroy`] tears all of it down.
//!
//! TEARDOWN ORDER
//! ==============
//! 1. Mark destroyed; every later operation returns [`Error::Disposed`].
//! 2. Detach from the parent, unless the parent is itself being destroyed.
//! 3. Destroy children, last added first.
//! 4. Stop render callbacks, cancel remembered timers, stop tweens.
//! 5. Destroy the event bus.
//!
//! Only the most recent `max_component_timers` timer handles are remembered.
//! Older timers still fire; they just escape bulk cancellation.

#[cfg(test)]
#[path = "component_test.rs"]
mod component_test;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::events::Events;
use crate::render::FrameCallback;
use crate::timer::TimerId;
use crate::tween::{Tween, TweenHandle, TweenTarget};

struct Inner {
    ctx: Context,
    events: Events,
    parent: RefCell<Weak<Inner>>,
    children: RefCell<Vec<Component>>,
    timers: RefCell<VecDeque<TimerId>>,
    loops: RefCell<Vec<FrameCallback>>,
    tweens: RefCell<Vec<TweenHandle>>,
    destroyed: Cell<bool>,
}

impl Inner {
    fn check(&self) -> Result<()> {
        if self.destroyed.get() { Err(Error::Disposed) } else { Ok(()) }
    }
}

/// Owns an event bus plus everything it scheduled. Clones share one component.
#[derive(Clone)]
pub struct Component {
    inner: Rc<Inner>,
}

impl Component {
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            inner: Rc::new(Inner {
                ctx: ctx.clone(),
                events: ctx.events(),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                timers: RefCell::new(VecDeque::new()),
                loops: RefCell::new(Vec::new()),
                tweens: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn events(&self) -> &Events {
        &self.inner.events
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.inner.ctx
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Whether both handles refer to the same component.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Children ────────────────────────────────────────────────

    /// Adopt `child`, moving it away from any previous parent.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] if either component was destroyed.
    pub fn add(&self, child: &Component) -> Result<()> {
        self.inner.check()?;
        child.inner.check()?;
        if let Some(old) = child.parent() {
            if old.ptr_eq(self) {
                return Ok(());
            }
            old.remove(child);
        }
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(child.clone());
        Ok(())
    }

    /// Forget `child` without destroying it. Returns whether it was a child.
    pub fn remove(&self, child: &Component) -> bool {
        let mut children = self.inner.children.borrow_mut();
        let before = children.len();
        children.retain(|c| !c.ptr_eq(child));
        let removed = children.len() != before;
        if removed {
            *child.inner.parent.borrow_mut() = Weak::new();
        }
        removed
    }

    #[must_use]
    pub fn parent(&self) -> Option<Component> {
        self.inner.parent.borrow().upgrade().map(|inner| Component { inner })
    }

    #[must_use]
    pub fn children(&self) -> Vec<Component> {
        self.inner.children.borrow().clone()
    }

    // ── Timers ──────────────────────────────────────────────────

    /// Schedule `callback` after `time_ms` and remember the handle.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Component::destroy`].
    pub fn delayed_call(&self, callback: impl FnOnce() + 'static, time_ms: f64) -> Result<TimerId> {
        self.inner.check()?;
        let id = self.inner.ctx.delayed_call(callback, time_ms);
        let mut timers = self.inner.timers.borrow_mut();
        timers.push_back(id.clone());
        while timers.len() > self.inner.ctx.config().max_component_timers {
            timers.pop_front();
        }
        Ok(id)
    }

    /// Cancel every remembered timer.
    pub fn clear_timers(&self) {
        let timers = self.inner.timers.take();
        for id in timers.iter().rev() {
            self.inner.ctx.clear_timeout(id);
        }
    }

    // ── Render loops ────────────────────────────────────────────

    /// Register `callback` on the render loop and remember it.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Component::destroy`].
    pub fn start_render(&self, callback: &FrameCallback, fps: Option<f64>) -> Result<()> {
        self.inner.check()?;
        let mut loops = self.inner.loops.borrow_mut();
        if !loops.iter().any(|c| c.ptr_eq(callback)) {
            loops.push(callback.clone());
        }
        self.inner.ctx.render().start(callback, fps);
        Ok(())
    }

    /// Unregister `callback`. Returns whether the render loop had it.
    pub fn stop_render(&self, callback: &FrameCallback) -> bool {
        self.inner.loops.borrow_mut().retain(|c| !c.ptr_eq(callback));
        self.inner.ctx.render().stop(callback)
    }

    /// Unregister every callback this component started.
    pub fn clear_renders(&self) {
        let loops = self.inner.loops.take();
        for callback in loops.iter().rev() {
            self.inner.ctx.render().stop(callback);
        }
    }

    // ── Tweens ──────────────────────────────────────────────────

    /// Start `tween` on `target` from the current frame time.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Component::destroy`].
    pub fn tween<T: TweenTarget + 'static>(&self, target: &Rc<RefCell<T>>, tween: Tween) -> Result<TweenHandle> {
        self.inner.check()?;
        let handle = self.inner.ctx.tween(target, tween);
        let mut tweens = self.inner.tweens.borrow_mut();
        tweens.retain(TweenHandle::is_active);
        tweens.push(handle.clone());
        Ok(handle)
    }

    /// Stop every tween this component started that is still running.
    pub fn clear_tweens(&self) {
        for handle in self.inner.tweens.take() {
            handle.stop();
        }
    }

    // ── Teardown ────────────────────────────────────────────────

    /// Release everything this component owns. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        if let Some(parent) = self.parent() {
            if !parent.is_destroyed() {
                parent.remove(self);
            }
        }
        let children = self.inner.children.take();
        for child in children.iter().rev() {
            child.destroy();
        }
        self.clear_renders();
        self.clear_timers();
        self.clear_tweens();
        self.inner.events.destroy();
        tracing::debug!(owner = ?self.inner.events.owner(), "component destroyed");
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("children", &self.inner.children.borrow().len())
            .field("timers", &self.inner.timers.borrow().len())
            .field("loops", &self.inner.loops.borrow().len())
            .field("destroyed", &self.inner.destroyed.get())
            .finish_non_exhaustive()
    }
}
