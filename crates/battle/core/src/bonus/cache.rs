//! Revision-keyed memo for derived values.

use std::cell::RefCell;
use std::collections::HashMap;

/// Memoizes derived totals until the bearer's revision changes.
///
/// Each entry is keyed by a static label plus a small discriminator such as
/// the combat mode. Callers keep the key space small. A lookup with a newer
/// revision recomputes.
#[derive(Debug, Default)]
pub struct ValueCache {
    entries: RefCell<HashMap<(&'static str, u32), (u64, i32)>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` at `revision`, computing it if needed.
    pub fn get_or_compute(
        &self,
        key: (&'static str, u32),
        revision: u64,
        compute: impl FnOnce() -> i32,
    ) -> i32 {
        if let Some(&(cached_revision, value)) = self.entries.borrow().get(&key)
            && cached_revision == revision
        {
            return value;
        }
        let value = compute();
        self.entries.borrow_mut().insert(key, (revision, value));
        value
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl Clone for ValueCache {
    fn clone(&self) -> Self {
        // A clone starts cold; its bearer may diverge immediately.
        Self::default()
    }
}

/// Melee and ranged variants of a range-gated total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangedTotals {
    melee: i32,
    ranged: i32,
}

impl RangedTotals {
    pub const fn new(melee: i32, ranged: i32) -> Self {
        Self { melee, ranged }
    }

    pub const fn melee_value(&self) -> i32 {
        self.melee
    }

    pub const fn ranged_value(&self) -> i32 {
        self.ranged
    }

    pub const fn value(&self, ranged: bool) -> i32 {
        if ranged { self.ranged } else { self.melee }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn recomputes_only_on_new_revision() {
        let cache = ValueCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };

        assert_eq!(cache.get_or_compute(("speed", 0), 1, compute), 42);
        assert_eq!(cache.get_or_compute(("speed", 0), 1, compute), 42);
        assert_eq!(calls.get(), 1);

        assert_eq!(cache.get_or_compute(("speed", 0), 2, compute), 42);
        assert_eq!(calls.get(), 2);

        assert_eq!(cache.get_or_compute(("speed", 1), 2, compute), 42);
        assert_eq!(calls.get(), 3);
    }
}
