//! Asset loading with progress reporting, and loaders that aggregate loaders.
//!
//! Fetching is the host's job ([`AssetFetcher`]); this module does the
//! bookkeeping. An [`AssetLoader`] counts a failed asset as loaded (the page
//! should still come up with a missing image), fires a local [`PROGRESS`]
//! event with `{ "percent": loaded / total }` after every completion, and a
//! local [`COMPLETE`] once all are in, followed by its completion callback.
//!
//! Construction and [`AssetLoader::load`] are separate steps so listeners,
//! including a [`MultiLoader`], can subscribe before anything completes.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Value, json};

use crate::context::Context;
use crate::error::Result;
use crate::events::{COMPLETE, Events, PROGRESS, callback};
use crate::path;

/// A fetched asset body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    pub body: String,
}

/// Completion callback handed to an [`AssetFetcher`].
pub type FetchDone = Box<dyn FnOnce(Result<Asset>)>;

/// The host's non-blocking fetch primitive. `done` is called exactly once,
/// possibly before `fetch` returns.
pub trait AssetFetcher {
    fn fetch(&self, url: &str, done: FetchDone);
}

/// Something that reports progress through local events.
pub trait Loader {
    fn events(&self) -> &Events;
    /// Fraction complete in `[0, 1]`.
    fn percent(&self) -> f64;
}

/// Bodies of successfully loaded assets, by key.
#[derive(Debug, Default)]
pub struct AssetCache {
    items: RefCell<HashMap<String, Asset>>,
}

impl AssetCache {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Asset> {
        self.items.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, asset: Asset) {
        self.items.borrow_mut().insert(key.into(), asset);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

// ── AssetLoader ─────────────────────────────────────────────────

struct AssetState {
    events: Events,
    cache: Rc<AssetCache>,
    /// `(key, url)`, url already CDN-prefixed.
    assets: Vec<(String, String)>,
    loaded: Cell<usize>,
    percent: Cell<f64>,
    started: Cell<bool>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl AssetState {
    #[allow(clippy::cast_precision_loss)]
    fn asset_loaded(&self, key: &str, url: &str, result: Result<Asset>) {
        match result {
            Ok(asset) => {
                tracing::trace!(key, url, "asset loaded");
                self.cache.insert(key, asset);
            }
            Err(err) => tracing::warn!(key, url, error = %err, "asset failed to load; counting it as loaded"),
        }
        let loaded = self.loaded.get() + 1;
        self.loaded.set(loaded);
        self.percent.set(loaded as f64 / self.assets.len() as f64);
        if let Err(err) = self.report() {
            tracing::debug!(error = %err, "asset loader destroyed before completion");
        }
    }

    fn report(&self) -> Result<()> {
        self.events.fire_local(PROGRESS, &json!({ "percent": self.percent.get() }))?;
        if self.loaded.get() >= self.assets.len() {
            self.finish()?;
        }
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        self.events.fire_local(COMPLETE, &Value::Null)?;
        let on_complete = self.on_complete.borrow_mut().take();
        if let Some(f) = on_complete {
            f();
        }
        Ok(())
    }
}

/// Loads a set of assets through an [`AssetFetcher`].
#[derive(Clone)]
pub struct AssetLoader {
    state: Rc<AssetState>,
}

impl AssetLoader {
    /// Load `paths`, keying each by its basename without extension.
    pub fn new<P: AsRef<str>>(ctx: &Context, paths: impl IntoIterator<Item = P>) -> Self {
        Self::with_keys(
            ctx,
            paths.into_iter().map(|p| (path::basename(p.as_ref(), false).to_owned(), p.as_ref().to_owned())),
        )
    }

    /// Load explicit `(key, path)` pairs. A repeated key keeps the last path.
    pub fn with_keys<K: Into<String>, P: AsRef<str>>(ctx: &Context, pairs: impl IntoIterator<Item = (K, P)>) -> Self {
        let cdn = &ctx.config().cdn;
        let mut assets: Vec<(String, String)> = Vec::new();
        for (key, p) in pairs {
            let key = key.into();
            let url = format!("{cdn}{}", p.as_ref());
            match assets.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = url,
                None => assets.push((key, url)),
            }
        }
        Self {
            state: Rc::new(AssetState {
                events: ctx.events(),
                cache: Rc::new(AssetCache::default()),
                assets,
                loaded: Cell::new(0),
                percent: Cell::new(0.0),
                started: Cell::new(false),
                on_complete: RefCell::new(None),
            }),
        }
    }

    /// Start fetching every asset. `on_complete` runs after the local
    /// [`COMPLETE`] event. An empty loader completes immediately.
    pub fn load(&self, fetcher: &dyn AssetFetcher, on_complete: impl FnOnce() + 'static) {
        let state = &self.state;
        if state.started.replace(true) {
            tracing::warn!("asset loader already started; ignoring second load");
            return;
        }
        *state.on_complete.borrow_mut() = Some(Box::new(on_complete));
        tracing::debug!(total = state.assets.len(), "loading assets");
        if state.assets.is_empty() {
            state.percent.set(1.0);
            if let Err(err) = state.finish() {
                tracing::debug!(error = %err, "asset loader destroyed before completion");
            }
            return;
        }
        for (key, url) in &state.assets {
            let s = Rc::clone(state);
            let (k, u) = (key.clone(), url.clone());
            fetcher.fetch(url, Box::new(move |result| s.asset_loaded(&k, &u, result)));
        }
    }

    /// Bodies loaded so far.
    #[must_use]
    pub fn cache(&self) -> &Rc<AssetCache> {
        &self.state.cache
    }

    /// `(key, url)` pairs this loader fetches.
    #[must_use]
    pub fn assets(&self) -> &[(String, String)] {
        &self.state.assets
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.started.get() && self.state.loaded.get() >= self.state.assets.len()
    }

    /// Drop all listeners. Later completions are counted but not reported.
    pub fn destroy(&self) {
        self.state.events.destroy();
        self.state.on_complete.borrow_mut().take();
    }
}

impl Loader for AssetLoader {
    fn events(&self) -> &Events {
        &self.state.events
    }

    fn percent(&self) -> f64 {
        self.state.percent.get()
    }
}

impl fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetLoader")
            .field("total", &self.state.assets.len())
            .field("loaded", &self.state.loaded.get())
            .finish_non_exhaustive()
    }
}

// ── MultiLoader ─────────────────────────────────────────────────

struct MultiState {
    events: Events,
    loaders: RefCell<Vec<Box<dyn Loader>>>,
    completed: Cell<usize>,
    percent: Cell<f64>,
}

impl MultiState {
    #[allow(clippy::cast_precision_loss)]
    fn progress(&self) -> Result<()> {
        let percent = {
            let loaders = self.loaders.borrow();
            if loaders.is_empty() {
                return Ok(());
            }
            loaders.iter().map(|l| l.percent()).sum::<f64>() / loaders.len() as f64
        };
        self.percent.set(percent);
        self.events.fire_local(PROGRESS, &json!({ "percent": percent }))
    }

    fn child_complete(&self) -> Result<()> {
        let completed = self.completed.get() + 1;
        self.completed.set(completed);
        if completed == self.loaders.borrow().len() {
            self.events.fire_local(COMPLETE, &Value::Null)?;
        }
        Ok(())
    }
}

/// Aggregates several loaders into one progress stream.
#[derive(Clone)]
pub struct MultiLoader {
    state: Rc<MultiState>,
}

impl MultiLoader {
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            state: Rc::new(MultiState {
                events: ctx.events(),
                loaders: RefCell::new(Vec::new()),
                completed: Cell::new(0),
                percent: Cell::new(0.0),
            }),
        }
    }

    /// Track `loader`. Progress becomes the average over every pushed loader.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Disposed`] if this or the child's bus was destroyed.
    pub fn push<L: Loader + Clone + 'static>(&self, loader: &L) -> Result<()> {
        let weak = Rc::downgrade(&self.state);
        let on_progress = callback(move |_| relay(&weak, MultiState::progress));
        let weak = Rc::downgrade(&self.state);
        let on_complete = callback(move |_| relay(&weak, MultiState::child_complete));
        self.state.events.subscribe_to(loader.events(), PROGRESS, &on_progress)?;
        self.state.events.subscribe_to(loader.events(), COMPLETE, &on_complete)?;
        self.state.loaders.borrow_mut().push(Box::new(loader.clone()));
        Ok(())
    }

    /// Force completion: report 100% and fire [`COMPLETE`].
    ///
    /// # Errors
    ///
    /// [`crate::Error::Disposed`] after [`MultiLoader::destroy`].
    pub fn complete(&self) -> Result<()> {
        self.state.percent.set(1.0);
        self.state.events.fire_local(PROGRESS, &json!({ "percent": 1.0 }))?;
        self.state.events.fire_local(COMPLETE, &Value::Null)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.loaders.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn destroy(&self) {
        self.state.events.destroy();
    }
}

fn relay(state: &Weak<MultiState>, f: fn(&MultiState) -> Result<()>) {
    if let Some(state) = state.upgrade() {
        if let Err(err) = f(&state) {
            tracing::debug!(error = %err, "multi loader destroyed; dropping child event");
        }
    }
}

impl Loader for MultiLoader {
    fn events(&self) -> &Events {
        &self.state.events
    }

    fn percent(&self) -> f64 {
        self.state.percent.get()
    }
}

impl fmt::Debug for MultiLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLoader")
            .field("loaders", &self.len())
            .field("completed", &self.state.completed.get())
            .field("percent", &self.state.percent.get())
            .finish_non_exhaustive()
    }
}
