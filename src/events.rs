//! Publish/subscribe with two dispatch scopes and owner-scoped teardown.
//!
//! An [`Emitter`] is a flat list of `(event, callback, owner)` subscriptions.
//! There is one process-wide emitter (held by the [`crate::Context`]) and one
//! private emitter per [`Events`] bus.
//!
//! DISPATCH
//! ========
//! [`Events::fire`] is local-first: if any live subscription on the bus's own
//! emitter matches, the global emitter is not consulted for that call, even
//! when it has subscribers for the same name. Only when nothing matched
//! locally does the event fall through to the global emitter.
//!
//! REMOVAL
//! =======
//! Removal while a dispatch is walking the list only tombstones entries; they
//! are compacted once the outermost dispatch returns. Subscriptions added
//! during a dispatch are not seen by that dispatch.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::error::{Error, Result};

// ── Well-known event names ───────────────────────────────────────

pub const VISIBILITY: &str = "visibility";
pub const KEYBOARD_PRESS: &str = "keyboard_press";
pub const KEYBOARD_DOWN: &str = "keyboard_down";
pub const KEYBOARD_UP: &str = "keyboard_up";
pub const RESIZE: &str = "resize";
pub const COMPLETE: &str = "complete";
pub const PROGRESS: &str = "progress";
pub const UPDATE: &str = "update";
pub const LOADED: &str = "loaded";
pub const ERROR: &str = "error";
pub const READY: &str = "ready";
pub const HOVER: &str = "hover";
pub const CLICK: &str = "click";

/// Event handler. Identity (for removal) is the `Rc` allocation.
pub type EventCallback = Rc<dyn Fn(&Value)>;

/// Wrap a closure as an [`EventCallback`].
pub fn callback(f: impl Fn(&Value) + 'static) -> EventCallback {
    Rc::new(f)
}

/// Identifies the bus that made a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

impl OwnerId {
    fn next() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

struct Subscription {
    event: String,
    callback: EventCallback,
    owner: Option<OwnerId>,
    removed: bool,
}

/// A subscription list for one scope.
#[derive(Default)]
pub struct Emitter {
    subs: RefCell<Vec<Subscription>>,
    /// Buses that subscribed into this emitter.
    links: RefCell<Vec<Weak<Bus>>>,
    dispatching: Cell<u32>,
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to `event`, optionally on behalf of a bus.
    pub fn add(&self, event: &str, callback: &EventCallback, owner: Option<OwnerId>) {
        self.subs.borrow_mut().push(Subscription {
            event: event.to_owned(),
            callback: Rc::clone(callback),
            owner,
            removed: false,
        });
    }

    /// Remove every subscription matching both `event` and `callback`,
    /// whoever made it. Returns whether anything was removed.
    pub fn remove(&self, event: &str, callback: &EventCallback) -> bool {
        self.remove_where(|s| s.event == event && Rc::ptr_eq(&s.callback, callback))
    }

    /// Deliver `payload` to every live subscription for `event`.
    /// Returns whether at least one subscription matched.
    pub fn fire(&self, event: &str, payload: &Value) -> bool {
        self.dispatching.set(self.dispatching.get() + 1);
        let count = self.subs.borrow().len();
        let mut called = false;
        for i in 0..count {
            let target = {
                let subs = self.subs.borrow();
                subs.get(i)
                    .filter(|s| !s.removed && s.event == event)
                    .map(|s| Rc::clone(&s.callback))
            };
            if let Some(callback) = target {
                callback(payload);
                called = true;
            }
        }
        self.dispatching.set(self.dispatching.get() - 1);
        self.compact();
        called
    }

    /// Drop every subscription made by `owner`.
    pub fn destroy_owner(&self, owner: OwnerId) {
        self.remove_where(|s| s.owner == Some(owner));
    }

    /// Live subscriptions for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.subs.borrow().iter().filter(|s| !s.removed && s.event == event).count()
    }

    /// Live subscriptions in total.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.borrow().iter().filter(|s| !s.removed).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `owner` still holds any subscription here.
    fn has_owner(&self, owner: OwnerId) -> bool {
        self.subs.borrow().iter().any(|s| !s.removed && s.owner == Some(owner))
    }

    fn link(&self, bus: &Rc<Bus>) {
        let mut links = self.links.borrow_mut();
        // Buses dropped without `destroy` leave dead entries behind.
        links.retain(|l| l.strong_count() > 0);
        if !links.iter().any(|l| l.as_ptr() == Rc::as_ptr(bus)) {
            links.push(Rc::downgrade(bus));
        }
    }

    fn forget_link(&self, bus: &Bus) {
        self.links.borrow_mut().retain(|l| !std::ptr::eq(l.as_ptr(), bus));
    }

    fn clear(&self) {
        self.remove_where(|_| true);
    }

    fn remove_where(&self, mut pred: impl FnMut(&Subscription) -> bool) -> bool {
        let mut removed = false;
        for sub in self.subs.borrow_mut().iter_mut().filter(|s| !s.removed) {
            if pred(sub) {
                sub.removed = true;
                removed = true;
            }
        }
        self.compact();
        removed
    }

    fn compact(&self) {
        if self.dispatching.get() == 0 {
            self.subs.borrow_mut().retain(|s| !s.removed);
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscriptions", &self.len())
            .field("links", &self.links.borrow().len())
            .finish()
    }
}

struct Bus {
    owner: OwnerId,
    emitter: Rc<Emitter>,
    global: Rc<Emitter>,
    /// Emitters this bus subscribed into.
    linked: RefCell<Vec<Rc<Emitter>>>,
    disposed: Cell<bool>,
}

impl Bus {
    fn unlink(&self, emitter: &Rc<Emitter>) {
        self.linked.borrow_mut().retain(|e| !Rc::ptr_eq(e, emitter));
    }

    fn check(&self) -> Result<()> {
        if self.disposed.get() { Err(Error::Disposed) } else { Ok(()) }
    }
}

/// A per-instance event bus.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct Events {
    bus: Rc<Bus>,
}

impl Events {
    /// Create a bus whose fall-through scope is `global`.
    #[must_use]
    pub fn new(global: &Rc<Emitter>) -> Self {
        Self {
            bus: Rc::new(Bus {
                owner: OwnerId::next(),
                emitter: Rc::new(Emitter::new()),
                global: Rc::clone(global),
                linked: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.bus.owner
    }

    /// This bus's private emitter.
    #[must_use]
    pub fn emitter(&self) -> &Rc<Emitter> {
        &self.bus.emitter
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.bus.disposed.get()
    }

    /// Subscribe to `event` on the process-wide emitter.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Events::destroy`].
    pub fn subscribe_global(&self, event: &str, callback: &EventCallback) -> Result<()> {
        self.bus.check()?;
        self.bus.global.add(event, callback, Some(self.bus.owner));
        Ok(())
    }

    /// Subscribe to `event` fired by `other`'s bus.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] if either bus was destroyed.
    pub fn subscribe_to(&self, other: &Events, event: &str, callback: &EventCallback) -> Result<()> {
        self.bus.check()?;
        other.bus.check()?;
        let emitter = &other.bus.emitter;
        emitter.add(event, callback, Some(self.bus.owner));
        emitter.link(&self.bus);
        let mut linked = self.bus.linked.borrow_mut();
        if !linked.iter().any(|e| Rc::ptr_eq(e, emitter)) {
            linked.push(Rc::clone(emitter));
        }
        Ok(())
    }

    /// Remove a global subscription matching `event` and `callback`.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Events::destroy`].
    pub fn unsubscribe_global(&self, event: &str, callback: &EventCallback) -> Result<()> {
        self.bus.check()?;
        self.bus.global.remove(event, callback);
        Ok(())
    }

    /// Remove a subscription on `other`'s bus matching `event` and `callback`.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Events::destroy`].
    pub fn unsubscribe_from(&self, other: &Events, event: &str, callback: &EventCallback) -> Result<()> {
        self.bus.check()?;
        let emitter = &other.bus.emitter;
        emitter.remove(event, callback);
        if !emitter.has_owner(self.bus.owner) {
            emitter.forget_link(&self.bus);
            self.bus.unlink(emitter);
        }
        Ok(())
    }

    /// Fire `event` locally, falling through to the global emitter only if
    /// no local subscription matched.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Events::destroy`].
    pub fn fire(&self, event: &str, payload: &Value) -> Result<()> {
        self.bus.check()?;
        if !self.bus.emitter.fire(event, payload) {
            self.bus.global.fire(event, payload);
        }
        Ok(())
    }

    /// Fire `event` on this bus only.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] after [`Events::destroy`].
    pub fn fire_local(&self, event: &str, payload: &Value) -> Result<()> {
        self.bus.check()?;
        self.bus.emitter.fire(event, payload);
        Ok(())
    }

    /// Tear down every subscription this bus made or received. Idempotent.
    pub fn destroy(&self) {
        let bus = &self.bus;
        if bus.disposed.replace(true) {
            return;
        }
        bus.global.destroy_owner(bus.owner);
        for emitter in bus.linked.take() {
            emitter.destroy_owner(bus.owner);
            emitter.forget_link(bus);
        }
        for link in bus.emitter.links.take() {
            if let Some(subscriber) = link.upgrade() {
                subscriber.unlink(&bus.emitter);
            }
        }
        bus.emitter.clear();
        tracing::debug!(owner = bus.owner.0, "event bus destroyed");
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("owner", &self.bus.owner)
            .field("emitter", &self.bus.emitter)
            .field("linked", &self.bus.linked.borrow().len())
            .field("disposed", &self.bus.disposed.get())
            .finish()
    }
}
