//! Key/value persistence with a small JSON convention on top.
//!
//! The backing store only holds strings. [`Storage`] writes objects and
//! arrays as JSON text and strings verbatim, and on read turns text that
//! starts with `{` or `[` back into JSON and `"true"`/`"false"` into
//! booleans. Anything else comes back as a string, so a stored number is
//! read as its decimal text.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// String key/value backend, e.g. the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-process store for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// JSON-aware view over a [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store `value` under `key`. `null` removes the key.
    pub fn set(&self, key: &str, value: &Value) {
        match value {
            Value::Null => {
                self.store.remove_item(key);
                tracing::trace!(key, "storage key removed");
            }
            Value::String(s) => self.store.set_item(key, s),
            other => self.store.set_item(key, &other.to_string()),
        }
    }

    /// Read `key`, decoding JSON containers and booleans.
    ///
    /// # Errors
    ///
    /// [`Error::Storage`] if the stored text looks like JSON but does not parse.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(raw) = self.store.get_item(key) else {
            return Ok(None);
        };
        if raw.starts_with('{') || raw.starts_with('[') {
            return serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| Error::Storage { key: key.to_owned(), source });
        }
        Ok(Some(match raw.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw),
        }))
    }
}
