//! Render loop: one global per-frame tick fanned out to registered callbacks.
//!
//! The platform's animation-frame primitive is abstracted as a
//! [`FrameRequester`]. Every [`Render::step`] updates the shared [`Clock`],
//! runs each registered [`FrameCallback`] once (or skips it, when it is rate
//! limited and its interval has not elapsed), and asks the requester for the
//! next frame unless the loop is paused.
//!
//! ITERATION
//! =========
//! Slots are visited by decrementing index, i.e. in reverse registration
//! order. `stop` never removes a slot while a step is in progress; it
//! tombstones it, and tombstones are compacted once the pass is over. A
//! callback started during a step is appended past the cursor, so it first
//! runs on the following step. Callers must not rely on the order itself.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared frame clock, written once per step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    /// Timestamp of the current frame, in milliseconds.
    pub time: f64,
    /// Milliseconds since the previous frame, capped at the skip limit.
    pub delta: f64,
}

/// What a frame callback receives on invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Unthrottled callbacks get the frame time and delta every step.
    Frame { time: f64, delta: f64 },
    /// Rate-limited callbacks get a running counter starting at 0.
    Counted(u64),
}

/// The platform's "call me before the next repaint" primitive.
///
/// Implementations must eventually call [`Render::step`] on the upgraded
/// `render` with a monotonically increasing timestamp.
pub trait FrameRequester {
    fn request_frame(&self, render: Weak<Render>);
}

/// A requester that only counts requests; the host drives
/// [`Render::step`] itself. Used by native hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualRequester {
    requests: Rc<Cell<usize>>,
}

impl ManualRequester {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames requested so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameRequester for ManualRequester {
    fn request_frame(&self, _render: Weak<Render>) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// A shareable frame callback. Identity is the allocation, so clones of one
/// handle are "the same callback" for [`Render::start`] and [`Render::stop`].
#[derive(Clone)]
pub struct FrameCallback(Rc<RefCell<dyn FnMut(Tick)>>);

impl FrameCallback {
    pub fn new(f: impl FnMut(Tick) + 'static) -> Self {
        Self(Rc::new(RefCell::new(f)))
    }

    /// Whether both handles refer to the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, tick: Tick) {
        match self.0.try_borrow_mut() {
            Ok(mut f) => f(tick),
            Err(_) => tracing::warn!("frame callback re-entered itself; skipping nested call"),
        }
    }
}

impl fmt::Debug for FrameCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrameCallback").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Throttle {
    interval: f64,
    last_fire: f64,
    next_frame: u64,
}

impl Throttle {
    fn new(fps: f64) -> Self {
        Self { interval: 1000.0 / fps, last_fire: f64::NEG_INFINITY, next_frame: 0 }
    }
}

#[derive(Debug)]
struct Slot {
    /// `None` once stopped; compacted after the current step.
    callback: Option<FrameCallback>,
    throttle: Option<Throttle>,
}

/// The frame scheduler. Always lives behind an `Rc` so requesters can hold a
/// weak handle back to it.
pub struct Render {
    me: Weak<Render>,
    requester: Box<dyn FrameRequester>,
    skip_limit: f64,
    clock: Cell<Clock>,
    last: Cell<Option<f64>>,
    slots: RefCell<Vec<Slot>>,
    paused: Cell<bool>,
    stepping: Cell<bool>,
    /// A frame has been requested and its step has not run yet.
    pending: Cell<bool>,
}

impl Render {
    /// Create a render loop. Nothing is requested until [`Render::arm`].
    pub fn new(skip_limit: f64, requester: impl FrameRequester + 'static) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            requester: Box::new(requester),
            skip_limit,
            clock: Cell::new(Clock::default()),
            last: Cell::new(None),
            slots: RefCell::new(Vec::new()),
            paused: Cell::new(false),
            stepping: Cell::new(false),
            pending: Cell::new(false),
        })
    }

    /// Request the first frame. Hosts call this once when the page is ready.
    pub fn arm(&self) {
        self.request();
    }

    // --- Registration ---

    /// Register `callback`. With `fps`, it runs at most once per `1000 / fps`
    /// milliseconds and receives [`Tick::Counted`].
    ///
    /// Registering a callback that is already present never adds a second
    /// slot; when `fps` is given its throttle is reset.
    pub fn start(&self, callback: &FrameCallback, fps: Option<f64>) {
        let throttle = fps.filter(|f| f.is_finite() && *f > 0.0).map(Throttle::new);
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots
            .iter_mut()
            .find(|s| s.callback.as_ref().is_some_and(|c| c.ptr_eq(callback)))
        {
            if throttle.is_some() {
                slot.throttle = throttle;
            }
            return;
        }
        slots.push(Slot { callback: Some(callback.clone()), throttle });
    }

    /// Unregister `callback`. Returns whether it was registered.
    pub fn stop(&self, callback: &FrameCallback) -> bool {
        let found = {
            let mut slots = self.slots.borrow_mut();
            match slots
                .iter_mut()
                .find(|s| s.callback.as_ref().is_some_and(|c| c.ptr_eq(callback)))
            {
                Some(slot) => {
                    slot.callback = None;
                    true
                }
                None => false,
            }
        };
        if found && !self.stepping.get() {
            self.compact();
        }
        found
    }

    /// Whether `callback` is currently registered.
    #[must_use]
    pub fn contains(&self, callback: &FrameCallback) -> bool {
        self.slots
            .borrow()
            .iter()
            .any(|s| s.callback.as_ref().is_some_and(|c| c.ptr_eq(callback)))
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.callback.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Loop control ---

    /// Stop requesting frames after the current one.
    pub fn pause(&self) {
        if !self.paused.replace(true) {
            tracing::debug!("render loop paused");
        }
    }

    /// Re-arm the loop. No-op unless paused. A frame still outstanding from
    /// before the pause carries the loop on, so no second one is requested.
    pub fn resume(&self) {
        if !self.paused.get() {
            return;
        }
        self.paused.set(false);
        tracing::debug!("render loop resumed");
        self.request();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    // --- Clock ---

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock.get()
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock.get().time
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.clock.get().delta
    }

    // --- Tick ---

    /// Advance one frame at timestamp `now` (milliseconds).
    pub fn step(&self, now: f64) {
        if self.stepping.get() {
            tracing::warn!("render step called from inside a frame callback; ignoring");
            return;
        }
        self.pending.set(false);
        let delta = self.last.get().map_or(0.0, |last| (now - last).min(self.skip_limit).max(0.0));
        self.last.set(Some(now));
        self.clock.set(Clock { time: now, delta });

        self.stepping.set(true);
        let mut i = self.slots.borrow().len();
        while i > 0 {
            i -= 1;
            let next = {
                let mut slots = self.slots.borrow_mut();
                slots.get_mut(i).and_then(|slot| {
                    let callback = slot.callback.clone()?;
                    let tick = match slot.throttle.as_mut() {
                        Some(throttle) => {
                            if now - throttle.last_fire < throttle.interval {
                                return None;
                            }
                            throttle.last_fire = now;
                            let frame = throttle.next_frame;
                            throttle.next_frame += 1;
                            Tick::Counted(frame)
                        }
                        None => Tick::Frame { time: now, delta },
                    };
                    Some((callback, tick))
                })
            };
            if let Some((callback, tick)) = next {
                callback.call(tick);
            }
        }
        self.stepping.set(false);
        self.compact();

        if !self.paused.get() {
            self.request();
        }
    }

    /// At most one frame is outstanding at a time.
    fn request(&self) {
        if self.pending.replace(true) {
            return;
        }
        self.requester.request_frame(self.me.clone());
    }

    fn compact(&self) {
        self.slots.borrow_mut().retain(|s| s.callback.is_some());
    }
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Render")
            .field("clock", &self.clock.get())
            .field("callbacks", &self.len())
            .field("paused", &self.paused.get())
            .finish_non_exhaustive()
    }
}
