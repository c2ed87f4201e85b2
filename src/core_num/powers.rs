//! Cache of `10^exp` for `exp` a non-negative multiple of 16, populated on
//! demand by a recursive squaring/combining schedule that may run
//! sequentially or on a work-stealing pool ([`rayon::join`]).
//!
//! The exponents needed for a divide-and-conquer parse of a digit range
//! `[from, to)` are produced by repeatedly applying [`split_floor_16`]; by
//! construction every power the digit-range parser (`super::digits`) asks
//! for is always a key already present in the cache.

use std::collections::BTreeMap;
use std::sync::RwLock;

use num_bigint::BigUint;

/// Base case: `10^0 .. 10^16`, seeded directly rather than derived by
/// squaring (squaring bottoms out at these).
const BASE_POWERS: [u64; 17] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
];

/// `mid = to - floor((to - from + 1) / 2, multiple of 16)`, i.e. the
/// midpoint is pulled so the right half `[mid, to)` has a length that is a
/// multiple of 16. This guarantees every power of ten the digit-range
/// parser ever needs (`10^(to - mid)`) has an exponent that is a multiple
/// of 16, and is therefore always a key of this cache.
pub fn split_floor_16(from: usize, to: usize) -> usize {
    let half = (to - from + 1) / 2;
    let half_floor_16 = (half / 16) * 16;
    to - half_floor_16.max(16)
}

/// Shared cache keyed by exponent (multiple of 16) mapping to `10^exp`.
///
/// Reads dominate once warmed; writes happen only during pre-fill and are
/// idempotent (re-inserting the same key with the same value is safe), so
/// a `RwLock<BTreeMap<..>>` with a read-check-then-write-lock pattern
/// avoids contention without needing a lock-free map dependency.
pub struct PowersOfTenCache {
    table: RwLock<BTreeMap<u32, BigUint>>,
}

impl Default for PowersOfTenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PowersOfTenCache {
    pub fn new() -> Self {
        let mut table = BTreeMap::new();
        for (exp, &v) in BASE_POWERS.iter().enumerate() {
            table.insert(exp as u32, BigUint::from(v));
        }
        PowersOfTenCache {
            table: RwLock::new(table),
        }
    }

    /// Returns `10^exp`, cloning out of the cache. Panics if `exp` was
    /// never populated by [`fill_range`](Self::fill_range) — callers are
    /// required to pre-populate before parsing, per the digit-range
    /// parser's contract.
    pub fn get(&self, exp: u32) -> BigUint {
        self.table
            .read()
            .unwrap()
            .get(&exp)
            .cloned()
            .unwrap_or_else(|| panic!("PowersOfTenCache: 10^{} was not pre-filled", exp))
    }

    fn contains(&self, exp: u32) -> bool {
        self.table.read().unwrap().contains_key(&exp)
    }

    fn insert_if_absent(&self, exp: u32, value: BigUint) {
        let mut guard = self.table.write().unwrap();
        // Idempotent: a concurrent writer may have beaten us to it with an
        // equal value (the split tree is deterministic, so any two
        // populations of the same key are numerically identical).
        guard.entry(exp).or_insert(value);
    }

    /// Recursively populates every key needed by a divide-and-conquer parse
    /// of a digit range of length `len`, running sequentially.
    pub fn fill_range(&self, len: usize, threshold: usize) {
        self.fill_node(0, len, threshold);
    }

    /// Same as [`fill_range`](Self::fill_range), but independent subtrees
    /// may run concurrently on `pool`.
    pub fn fill_range_parallel(&self, len: usize, threshold: usize) {
        self.fill_node_parallel(0, len, threshold);
    }

    fn fill_node(&self, lo: usize, hi: usize, threshold: usize) -> Option<u32> {
        let len = hi - lo;
        if len <= threshold {
            return None;
        }
        let mid = split_floor_16(lo, hi);
        let key = (hi - mid) as u32;
        // Always recurse into both children: `key` being cached already
        // says nothing about whether the *different-length* sub-ranges
        // `[lo, mid)` and `[mid, hi)` have their own split keys populated
        // (the same combine exponent can recur across unrelated range
        // lengths). `populate_key` itself is the one that's safe to
        // short-circuit on `contains`.
        self.fill_node(lo, mid, threshold);
        self.fill_node(mid, hi, threshold);
        self.populate_key(key);
        Some(key)
    }

    fn fill_node_parallel(&self, lo: usize, hi: usize, threshold: usize) -> Option<u32> {
        let len = hi - lo;
        if len <= threshold {
            return None;
        }
        let mid = split_floor_16(lo, hi);
        let key = (hi - mid) as u32;
        rayon::join(
            || self.fill_node_parallel(lo, mid, threshold),
            || self.fill_node_parallel(mid, hi, threshold),
        );
        self.populate_key(key);
        Some(key)
    }

    /// Computes `10^key` from smaller cached powers and inserts it.
    /// `key` is always a multiple of 16; `key <= 16` is already a base-case
    /// entry from [`new`](Self::new). Otherwise it recursively halves `key`
    /// (rounding the lower half down to a multiple of 16) into two smaller
    /// multiples of 16, ensures both are populated, and combines them by
    /// multiplication. Self-sufficient: does not depend on which other
    /// keys a caller has or hasn't populated yet.
    fn populate_key(&self, key: u32) {
        if self.contains(key) || key <= 16 {
            return;
        }
        tracing::trace!(exp = key, "populating powers-of-ten cache entry");
        let half = ((key / 2) / 16 * 16).max(16);
        let remaining = key - half;
        self.populate_key(half);
        self.populate_key(remaining);
        let value = self.get(half) * self.get(remaining);
        self.insert_if_absent(key, value);
    }
}
