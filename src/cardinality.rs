// vim: tw=80
//! Call count policies for expectations.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sentinel meaning "no upper bound".
const UNBOUNDED: usize = usize::MAX;

/// How often an expectation must fire, how often it may fire, and how often
/// it actually has.
///
/// The running count lives here so that sequences, which hold an `Arc` to the
/// cardinality of each member, can observe satisfaction without reaching back
/// into the owning expectation list.
#[derive(Debug)]
pub(crate) struct Cardinality {
    /// How many calls has this expectation already consumed?
    count: AtomicUsize,
    min: AtomicUsize,
    max: AtomicUsize,
}

impl Default for Cardinality {
    fn default() -> Self {
        // A fresh expectation may fire any number of times
        Cardinality {
            count: AtomicUsize::new(0),
            min: AtomicUsize::new(0),
            max: AtomicUsize::new(UNBOUNDED),
        }
    }
}

impl Cardinality {
    /// Record one more consumed call, returning the new total.
    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn min(&self) -> usize {
        self.min.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> Option<usize> {
        match self.max.load(Ordering::Relaxed) {
            UNBOUNDED => None,
            n => Some(n),
        }
    }

    /// Has this expectation fired at least the required number of times?
    pub fn is_satisfied(&self) -> bool {
        self.count() >= self.min()
    }

    /// Has this expectation fired the maximum allowed number of times?  A
    /// saturated expectation never consumes another call.
    pub fn is_saturated(&self) -> bool {
        match self.max() {
            Some(max) => self.count() >= max,
            None => false,
        }
    }

    pub fn set_exact(&self, n: usize) {
        self.min.store(n, Ordering::Relaxed);
        self.max.store(n, Ordering::Relaxed);
    }

    pub fn set_min(&self, n: usize) {
        self.min.store(n, Ordering::Relaxed);
        self.max.store(UNBOUNDED, Ordering::Relaxed);
    }

    pub fn set_max(&self, n: usize) {
        self.min.store(0, Ordering::Relaxed);
        self.max.store(n, Ordering::Relaxed);
    }

    /// Inclusive at both ends.  The builder validates `min <= max` before
    /// calling this.
    pub fn set_range(&self, min: usize, max: usize) {
        self.min.store(min, Ordering::Relaxed);
        self.max.store(max, Ordering::Relaxed);
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min(), self.max()) {
            (0, Some(0)) => write!(f, "never"),
            (1, Some(1)) => write!(f, "exactly once"),
            (n, Some(m)) if n == m => write!(f, "exactly {n} times"),
            (0, None) => write!(f, "any number of times"),
            (1, None) => write!(f, "at least once"),
            (n, None) => write!(f, "at least {n} times"),
            (0, Some(m)) => write!(f, "at most {m} times"),
            (n, Some(m)) => write!(f, "between {n} and {m} times"),
        }
    }
}
