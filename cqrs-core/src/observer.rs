use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ActorError;
use crate::state_id::StateId;
use crate::Version;

/// `{ TypeCode, BasicInfoBytes, EventBytes }` wire transport message.
/// `basic_info` is `None` for bare publishes, which use
/// `{ TypeCode, PayloadBytes }` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub type_code: u32,
    pub basic_info: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// A downstream consumer that tracks a committed version per aggregate.
#[async_trait]
pub trait ObserverUnit: Send + Sync {
    /// The observer's own name/identity, used in logs.
    fn name(&self) -> &str;

    /// The version this observer has committed for `state_id`.
    async fn committed_version(&self, state_id: &StateId) -> Result<Version, ActorError>;

    /// Synchronous fan-out handler: deliver a raised event's bytes directly
    /// (used as the in-process fallback path in `publish_to_bus`).
    async fn handle(&self, state_id: &StateId, message: &BusMessage) -> Result<(), ActorError>;

    /// Request this observer catch up to `version` (used by
    /// `SyncAllObserversOnActivate` and by `Reset`).
    async fn sync_to(&self, state_id: &StateId, version: Version) -> Result<bool, ActorError>;

    /// Request this observer reset its tracking for `state_id`, typically
    /// because the aggregate was just reset to a new `StateId` via
    /// `Reset()`.
    async fn reset(&self, old_state_id: &StateId, new_state_id: &StateId) -> Result<(), ActorError>;
}

/// The message-bus producer, specified only through the interface the
/// actor runtime consumes.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, state_id: &StateId, message: &BusMessage) -> Result<(), ActorError>;
}
