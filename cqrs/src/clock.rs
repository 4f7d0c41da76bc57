use std::time::{SystemTime, UNIX_EPOCH};

use cqrs_core::Timestamp;

/// Wall-clock source needed at the `raise`/`recover` call sites that read
/// "now"; kept behind a trait so tests can pin time deterministically (see
/// `testing::ManualClock`).
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as Timestamp
    }
}
