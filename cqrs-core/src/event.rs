use serde::{Deserialize, Serialize};

use crate::{StateId, Timestamp, Version};

/// Caller-supplied idempotency token for a raised event. The event log's
/// `unique_key` is either caller-supplied (from an `EventUid`) or derived
/// deterministically from the event's natural identity when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventUid {
    pub key: String,
    /// When present, pins the event's timestamp (used for replays/migrations
    /// that must preserve original wall-clock ordering); absent means "now".
    pub timestamp: Option<Timestamp>,
}

impl EventUid {
    pub fn new(key: impl Into<String>) -> Self {
        EventUid { key: key.into(), timestamp: None }
    }

    pub fn with_timestamp(key: impl Into<String>, timestamp: Timestamp) -> Self {
        EventUid { key: key.into(), timestamp: Some(timestamp) }
    }
}

/// `{ Version, Timestamp }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub version: Version,
    pub timestamp: Timestamp,
}

/// `{ StateId, BasicInfo, Event payload }`.
///
/// Invariant on append: `basic_info.version == snapshot.version + 1` at the
/// call site; this is asserted by the raise pipeline, not here, since
/// `FullyEvent` itself is just a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullyEvent<E> {
    pub state_id: StateId,
    pub basic_info: BasicInfo,
    pub event: E,
}

impl<E> FullyEvent<E> {
    pub fn version(&self) -> Version {
        self.basic_info.version
    }

    pub fn timestamp(&self) -> Timestamp {
        self.basic_info.timestamp
    }
}
