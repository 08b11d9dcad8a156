//! Per-container build cache.
//!
//! Each slot holds the shared future of one build. The slot is written
//! before the build is first polled, which is what coalesces concurrent
//! requests for the same name onto a single build. A completed `Shared`
//! keeps its output, so a retained slot doubles as the cached value.

use std::collections::HashMap;

use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::dependencies::AnyArc;
use crate::error::DiResult;

/// Outcome of resolving one name: a value, nothing built, or a failure.
pub type Resolved = DiResult<Option<AnyArc>>;

/// A cloneable handle on one build; every clone observes the same outcome.
pub type Resolution = Shared<BoxFuture<'static, Resolved>>;

#[derive(Default)]
pub(crate) struct BuildCache {
    slots: Mutex<HashMap<String, Resolution>>,
}

impl BuildCache {
    pub(crate) fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    /// Returns the slot for `name`, or installs the one made by `start`.
    ///
    /// The boolean is `true` when an existing slot was reused.
    pub(crate) fn get_or_start(&self, name: &str, start: impl FnOnce() -> Resolution) -> (Resolution, bool) {
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(name) {
            return (existing.clone(), true);
        }
        let resolution = start();
        slots.insert(name.to_string(), resolution.clone());
        (resolution, false)
    }

    pub(crate) fn evict(&self, name: &str) {
        self.slots.lock().remove(name);
    }

    /// Empties the cache and returns how many slots were dropped.
    ///
    /// Slots are dropped after the lock is released.
    pub(crate) fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.slots.lock());
        drained.len()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.slots.lock().contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}
