use std::sync::atomic::{AtomicI64, Ordering};

use cqrs_core::Timestamp;

use crate::clock::Clock;

/// A clock test double that returns a fixed, manually-advanced time rather
/// than the wall clock, so retro-event tests can control ordering exactly.
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(timestamp: Timestamp) -> Self {
        ManualClock { now: AtomicI64::new(timestamp) }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Timestamp) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
