//! `window.localStorage` as a [`KeyValueStore`].
//!
//! Storage can be unavailable (private browsing, quota exceeded). Reads then
//! behave as missing keys and writes are dropped with a warning.

use framekit::storage::KeyValueStore;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// The window's local storage, if the browser exposes one.
    #[must_use]
    pub fn from_window(window: &web_sys::Window) -> Option<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = ?err, "localStorage unavailable");
                None
            }
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = ?err, "localStorage read failed");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set_item(key, value) {
            tracing::warn!(key, error = ?err, "localStorage write failed");
        }
    }

    fn remove_item(&self, key: &str) {
        if let Err(err) = self.storage.remove_item(key) {
            tracing::warn!(key, error = ?err, "localStorage remove failed");
        }
    }
}
