//! Reusable object pool.
//!
//! Objects are handed out oldest first. When the pool is empty, [`ObjectPool::get`]
//! builds a fresh one with the factory, if the pool has one.

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;

use std::collections::VecDeque;
use std::fmt;

pub struct ObjectPool<T> {
    items: VecDeque<T>,
    factory: Option<Box<dyn Fn() -> T>>,
}

impl<T> ObjectPool<T> {
    /// An empty pool without a factory: `get` only returns what was `put`.
    #[must_use]
    pub fn new() -> Self {
        Self { items: VecDeque::new(), factory: None }
    }

    /// A pool prefilled with `prefill` objects built by `factory`.
    pub fn with_factory(factory: impl Fn() -> T + 'static, prefill: usize) -> Self {
        let items = (0..prefill).map(|_| factory()).collect();
        Self { items, factory: Some(Box::new(factory)) }
    }

    /// Take the oldest pooled object, or build one.
    pub fn get(&mut self) -> Option<T> {
        self.items.pop_front().or_else(|| self.factory.as_ref().map(|f| f()))
    }

    /// Return an object to the pool.
    pub fn put(&mut self, item: T) {
        self.items.push_back(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every pooled object.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for ObjectPool<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("len", &self.items.len())
            .field("factory", &self.factory.is_some())
            .finish()
    }
}
