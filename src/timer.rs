//! Delayed one-shot callbacks advanced by the render loop.
//!
//! A timer does not consult a wall clock: every frame, [`Timer::tick`] adds
//! the frame delta to each pending entry and fires those whose accumulated
//! time reached their target.
//!
//! DISCARD
//! =======
//! Expiry and removal happen in different passes. When an entry expires, its
//! callback is taken out (so it can never run again) and the entry stays in
//! the list as discarded; discarded and cancelled entries are swept at the
//! start of the next tick. Nothing is ever removed from the list while the
//! expiry pass is walking it, which keeps callbacks free to create or cancel
//! timers.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::cell::{Cell, RefCell};
use std::fmt;

use rand::Rng;

/// Upper bound (inclusive) of the random jitter mixed into timer ids.
const ID_JITTER: u64 = 99_999;

/// Opaque cancellation handle returned by [`Timer::create`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(String);

impl TimerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Entry {
    id: TimerId,
    time: f64,
    elapsed: f64,
    /// `None` once fired or cancelled; the entry is then awaiting the sweep.
    callback: Option<Box<dyn FnOnce()>>,
}

/// The delayed-call queue.
pub struct Timer {
    min_time: f64,
    entries: RefCell<Vec<Entry>>,
    /// Timestamp of the most recent frame, used to derive ids.
    now: Cell<f64>,
}

impl Timer {
    #[must_use]
    pub fn new(min_time: f64) -> Self {
        Self { min_time, entries: RefCell::new(Vec::new()), now: Cell::new(0.0) }
    }

    /// Schedule `callback` to run once `time_ms` of frame time has elapsed.
    ///
    /// Arguments are captured by the closure. Durations below the configured
    /// minimum (including zero, negative and NaN) are raised to it. An
    /// infinite duration never fires.
    pub fn create(&self, callback: impl FnOnce() + 'static, time_ms: f64) -> TimerId {
        // `f64::max` returns the non-NaN side.
        let time = time_ms.max(self.min_time);
        let id = self.next_id();
        tracing::trace!(id = %id, time, "timer created");
        self.entries.borrow_mut().push(Entry { id: id.clone(), time, elapsed: 0.0, callback: Some(Box::new(callback)) });
        id
    }

    /// Cancel a pending timer. Returns `false` if `id` is unknown or already fired.
    pub fn clear_timeout(&self, id: &TimerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|e| e.id == *id && e.callback.is_some()) {
            Some(entry) => {
                entry.callback = None;
                tracing::trace!(id = %id, "timer cleared");
                true
            }
            None => false,
        }
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: &TimerId) -> bool {
        self.entries.borrow().iter().any(|e| e.id == *id && e.callback.is_some())
    }

    /// Number of timers still waiting to fire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().iter().filter(|e| e.callback.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance all timers by one frame. Called by the render loop.
    pub fn tick(&self, time: f64, delta: f64) {
        self.now.set(time);
        self.entries.borrow_mut().retain(|e| e.callback.is_some());

        let mut i = 0;
        loop {
            let expired = {
                let mut entries = self.entries.borrow_mut();
                let Some(entry) = entries.get_mut(i) else {
                    break;
                };
                i += 1;
                if entry.callback.is_none() {
                    continue;
                }
                entry.elapsed += delta;
                if entry.elapsed < entry.time {
                    continue;
                }
                tracing::trace!(id = %entry.id, elapsed = entry.elapsed, "timer fired");
                entry.callback.take()
            };
            if let Some(callback) = expired {
                callback();
            }
        }
    }

    fn next_id(&self) -> TimerId {
        let mut rng = rand::rng();
        // Float-to-int casts saturate; the timestamp is only an id seed.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let base = self.now.get().max(0.0) as u64;
        loop {
            let candidate = TimerId((base + rng.random_range(0..=ID_JITTER)).to_string());
            if !self.entries.borrow().iter().any(|e| e.id == candidate) {
                return candidate;
            }
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer").field("pending", &self.len()).finish_non_exhaustive()
    }
}
