//! Numeric property tweens and the manager that drives them.
//!
//! A tween snapshots the numeric properties present both on its target and in
//! its end values, then on every [`TweenManager::update`] writes
//! `mix(start, end, ease(progress))` back into the target. Properties that
//! are absent or non-numeric at creation are ignored.
//!
//! Each target has one *single-tween slot*: starting a tween on a target
//! stops whatever tween occupied the slot (its completion never fires).
//! Targets whose [`TweenTarget::multi_tween`] returns `true` keep a list
//! instead, and tweens on them run side by side.

#[cfg(test)]
#[path = "tween_test.rs"]
mod tween_test;

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::interpolation::{ELASTIC_AMPLITUDE, ELASTIC_PERIOD, Ease};
use crate::math;

/// Something with named numeric properties a tween can drive.
pub trait TweenTarget {
    /// Current numeric value of `prop`, or `None` if absent or not numeric.
    fn get(&self, prop: &str) -> Option<f64>;
    fn set(&mut self, prop: &str, value: f64);
    /// Allow several concurrent tweens instead of a single slot.
    fn multi_tween(&self) -> bool {
        false
    }
}

impl TweenTarget for BTreeMap<String, f64> {
    fn get(&self, prop: &str) -> Option<f64> {
        BTreeMap::get(self, prop).copied()
    }

    fn set(&mut self, prop: &str, value: f64) {
        self.insert(prop.to_owned(), value);
    }
}

impl TweenTarget for HashMap<String, f64> {
    fn get(&self, prop: &str) -> Option<f64> {
        HashMap::get(self, prop).copied()
    }

    fn set(&mut self, prop: &str, value: f64) {
        self.insert(prop.to_owned(), value);
    }
}

impl TweenTarget for serde_json::Map<String, Value> {
    fn get(&self, prop: &str) -> Option<f64> {
        serde_json::Map::get(self, prop).and_then(Value::as_f64)
    }

    fn set(&mut self, prop: &str, value: f64) {
        self.insert(prop.to_owned(), Value::from(value));
    }
}

/// Description of a tween, consumed by [`TweenManager::start`].
pub struct Tween {
    props: BTreeMap<String, f64>,
    duration: f64,
    ease: Ease,
    delay: f64,
    spring: Option<f64>,
    damping: Option<f64>,
    on_update: Option<Box<dyn FnMut(f64)>>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Tween {
    /// Tween towards `props` over `duration_ms`.
    pub fn new<K: Into<String>>(props: impl IntoIterator<Item = (K, f64)>, duration_ms: f64) -> Self {
        Self {
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            duration: duration_ms,
            ease: Ease::default(),
            delay: 0.0,
            spring: None,
            damping: None,
            on_update: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn ease(mut self, ease: impl Into<Ease>) -> Self {
        self.ease = ease.into();
        self
    }

    #[must_use]
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    /// Elastic amplitude.
    #[must_use]
    pub fn spring(mut self, spring: f64) -> Self {
        self.spring = Some(spring);
        self
    }

    /// Elastic period.
    #[must_use]
    pub fn damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    /// Called with the eased factor after every applied update.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called once when the tween reaches its end. Never called if stopped.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("props", &self.props)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Address of a target allocation, used to find its slot.
type TargetKey = usize;

fn target_key<T: ?Sized>(target: &Rc<RefCell<T>>) -> TargetKey {
    Rc::as_ptr(target).cast::<()>() as usize
}

struct Track {
    prop: String,
    from: f64,
    to: f64,
}

struct TweenState {
    key: TargetKey,
    target: Rc<RefCell<dyn TweenTarget>>,
    registry: Weak<Registry>,
    tracks: Vec<Track>,
    duration: f64,
    ease: Ease,
    amplitude: f64,
    period: f64,
    start_time: Cell<f64>,
    elapsed: Cell<f64>,
    paused: Cell<bool>,
    active: Cell<bool>,
    on_update: RefCell<Option<Box<dyn FnMut(f64)>>>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl TweenState {
    fn update(self: &Rc<Self>, now: f64) {
        if !self.active.get() || self.paused.get() || now < self.start_time.get() {
            return;
        }
        let elapsed = if self.duration > 0.0 {
            math::clamp((now - self.start_time.get()) / self.duration, 0.0, 1.0)
        } else {
            1.0
        };
        self.elapsed.set(elapsed);
        let factor = self.interpolate(elapsed);
        if let Ok(mut on_update) = self.on_update.try_borrow_mut() {
            if let Some(f) = on_update.as_mut() {
                f(factor);
            }
        }
        if elapsed >= 1.0 && self.active.get() {
            let on_complete = self.on_complete.borrow_mut().take();
            self.detach();
            tracing::trace!(target_key = self.key, "tween complete");
            if let Some(f) = on_complete {
                f();
            }
        }
    }

    fn interpolate(&self, elapsed: f64) -> f64 {
        let factor = self.ease.apply_with(elapsed, self.amplitude, self.period);
        match self.target.try_borrow_mut() {
            Ok(mut target) => {
                for track in &self.tracks {
                    target.set(&track.prop, math::mix(track.from, track.to, factor));
                }
            }
            Err(_) => tracing::warn!(target_key = self.key, "tween target is borrowed; skipping frame"),
        }
        factor
    }

    fn detach(self: &Rc<Self>) {
        if !self.active.replace(false) {
            return;
        }
        self.on_complete.borrow_mut().take();
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self);
        }
    }
}

#[derive(Default)]
struct Slot {
    single: Option<Rc<TweenState>>,
    multi: Vec<Rc<TweenState>>,
}

#[derive(Default)]
struct Registry {
    tweens: RefCell<Vec<Rc<TweenState>>>,
    slots: RefCell<HashMap<TargetKey, Slot>>,
}

impl Registry {
    fn detach(&self, state: &Rc<TweenState>) {
        self.tweens.borrow_mut().retain(|t| !Rc::ptr_eq(t, state));
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots.get_mut(&state.key) {
            if slot.single.as_ref().is_some_and(|s| Rc::ptr_eq(s, state)) {
                slot.single = None;
            }
            slot.multi.retain(|t| !Rc::ptr_eq(t, state));
            if slot.single.is_none() && slot.multi.is_empty() {
                slots.remove(&state.key);
            }
        }
    }

    fn clear_key(&self, key: TargetKey) {
        let slot = self.slots.borrow_mut().remove(&key);
        if let Some(slot) = slot {
            for state in slot.single.into_iter().chain(slot.multi.into_iter().rev()) {
                state.detach();
            }
        }
    }
}

/// Handle to a running tween.
#[derive(Clone)]
pub struct TweenHandle(Rc<TweenState>);

impl TweenHandle {
    /// Advance to `now`. The manager does this every frame.
    pub fn update(&self, now: f64) {
        self.0.update(now);
    }

    pub fn pause(&self) {
        self.0.paused.set(true);
    }

    /// Resume from where the tween was paused, not from its beginning.
    /// No-op unless paused.
    pub fn resume(&self, now: f64) {
        let state = &self.0;
        if !state.paused.replace(false) {
            return;
        }
        state.start_time.set(now - state.elapsed.get() * state.duration);
    }

    /// Stop without completing. The completion callback never fires.
    pub fn stop(&self) {
        self.0.detach();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.active.get()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.0.paused.get()
    }

    /// Linear progress in `[0, 1]` as of the last applied update.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.0.elapsed.get()
    }

    /// Properties this tween drives.
    pub fn props(&self) -> impl Iterator<Item = &str> {
        self.0.tracks.iter().map(|t| t.prop.as_str())
    }
}

impl fmt::Debug for TweenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenHandle")
            .field("progress", &self.0.elapsed.get())
            .field("paused", &self.0.paused.get())
            .field("active", &self.0.active.get())
            .finish_non_exhaustive()
    }
}

/// Pool of active tweens, updated once per frame.
#[derive(Default)]
pub struct TweenManager {
    registry: Rc<Registry>,
}

impl TweenManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tween` on `target` at time `now`.
    pub fn start<T: TweenTarget + 'static>(&self, target: &Rc<RefCell<T>>, tween: Tween, now: f64) -> TweenHandle {
        let key = target_key(target);
        let (multi, tracks) = match target.try_borrow() {
            Ok(t) => {
                let tracks = tween
                    .props
                    .iter()
                    .filter_map(|(prop, to)| t.get(prop).map(|from| Track { prop: prop.clone(), from, to: *to }))
                    .collect();
                (t.multi_tween(), tracks)
            }
            Err(_) => {
                tracing::warn!(target_key = key, "tween target is borrowed at start; nothing to animate");
                (false, Vec::new())
            }
        };
        if !multi {
            let previous = self.registry.slots.borrow_mut().get_mut(&key).and_then(|s| s.single.take());
            if let Some(previous) = previous {
                previous.detach();
            }
        }

        let dyn_target: Rc<RefCell<dyn TweenTarget>> = target.clone();
        let state = Rc::new(TweenState {
            key,
            target: dyn_target,
            registry: Rc::downgrade(&self.registry),
            tracks,
            duration: tween.duration,
            ease: tween.ease,
            amplitude: tween.spring.unwrap_or(ELASTIC_AMPLITUDE),
            period: tween.damping.unwrap_or(ELASTIC_PERIOD),
            start_time: Cell::new(now + tween.delay),
            elapsed: Cell::new(0.0),
            paused: Cell::new(false),
            active: Cell::new(true),
            on_update: RefCell::new(tween.on_update),
            on_complete: RefCell::new(tween.on_complete),
        });

        self.registry.tweens.borrow_mut().push(Rc::clone(&state));
        let mut slots = self.registry.slots.borrow_mut();
        let slot = slots.entry(key).or_default();
        if multi {
            slot.multi.push(Rc::clone(&state));
        } else {
            slot.single = Some(Rc::clone(&state));
        }
        tracing::trace!(target_key = key, duration = state.duration, "tween started");
        TweenHandle(state)
    }

    /// Advance every active tween to `now`. Registered on the render loop.
    pub fn update(&self, now: f64) {
        let snapshot: Vec<Rc<TweenState>> = self.registry.tweens.borrow().clone();
        for state in snapshot.iter().rev() {
            state.update(now);
        }
    }

    /// Stop every tween on `target`, single slot and multi list alike.
    pub fn clear_tween<T: ?Sized>(&self, target: &Rc<RefCell<T>>) {
        self.registry.clear_key(target_key(target));
    }

    /// Whether `target` has any running tween.
    #[must_use]
    pub fn is_tweening<T: ?Sized>(&self, target: &Rc<RefCell<T>>) -> bool {
        self.registry.slots.borrow().contains_key(&target_key(target))
    }

    /// Number of active tweens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.tweens.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TweenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenManager").field("active", &self.len()).finish()
    }
}

