use crate::sync::{AtomicI32, Ordering};

/// Atomic countdown latch.
///
/// A fresh latch holds one unit: the implicit self reference consumed by the
/// scheduler's initial readiness scan. [`Countdown::arm`] adds a unit that
/// must be released before the latch opens; [`Countdown::release`] removes one
/// and reports the zero transition to exactly one caller, which is what makes
/// dispatch at-most-once under concurrent completions.
///
/// Beyond backing every task slot's readiness counter, the latch is exported
/// for ad hoc caller-side synchronization objects that want the same
/// decrement-and-test race resolution without registering a task.
#[derive(Debug)]
pub struct Countdown {
    count: AtomicI32,
}

impl Countdown {
    /// A latch holding the single implicit self unit.
    pub fn new() -> Self {
        Self::with_count(1)
    }

    /// A latch holding `count` units.
    pub fn with_count(count: i32) -> Self {
        Self {
            count: AtomicI32::new(count),
        }
    }

    /// Add one unit that must be released before the latch opens.
    pub fn arm(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Release one unit. Returns `true` for exactly the caller that observes
    /// the transition to zero, regardless of how many threads race here.
    pub fn release(&self) -> bool {
        self.count.fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Current number of held units.
    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
