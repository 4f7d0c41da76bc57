use async_trait::async_trait;
use uuid::Uuid;

use crate::archive::ArchiveBrief;
use crate::error::ActorError;
use crate::snapshot::Snapshot;
use crate::state_id::StateId;
use crate::{Timestamp, Version};

/// Event log gateway. Implementations must be safe for concurrent use
/// across actors; per-`(StateId, Version)` atomicity is required.
#[async_trait]
pub trait EventLogGateway: Send + Sync {
    type Event: Send + Sync;

    /// Persists atomically keyed by `(StateId, Version)` and by
    /// `unique_key` for de-duplication. Returns `false` if a duplicate
    /// already exists under either key; `true` on first successful commit.
    async fn append(
        &self,
        state_id: &StateId,
        version: Version,
        timestamp: Timestamp,
        serialized_payload: &[u8],
        unique_key: &str,
    ) -> Result<bool, ActorError>;

    /// Events with `Version` in `[from_version_inclusive, to_version_inclusive]`,
    /// ascending. `from_timestamp` is a read hint implementations may use to
    /// skip partitions.
    async fn get_range(
        &self,
        state_id: &StateId,
        from_timestamp: Timestamp,
        from_version_inclusive: Version,
        to_version_inclusive: Version,
    ) -> Result<Vec<(Version, Timestamp, Vec<u8>)>, ActorError>;

    /// Removes events with `Version <= up_to_version_inclusive` from
    /// `from_timestamp` onward.
    async fn delete_previous(
        &self,
        state_id: &StateId,
        up_to_version_inclusive: Version,
        from_timestamp: Timestamp,
    ) -> Result<(), ActorError>;
}

/// Snapshot store gateway.
#[async_trait]
pub trait SnapshotStoreGateway<P: Send + Sync>: Send + Sync {
    async fn get(&self, state_id: &StateId) -> Result<Option<Snapshot<P>>, ActorError>;
    async fn insert(&self, snapshot: &Snapshot<P>) -> Result<(), ActorError>;
    async fn update(&self, snapshot: &Snapshot<P>) -> Result<(), ActorError>;
    async fn update_is_latest(&self, state_id: &StateId, is_latest: bool) -> Result<(), ActorError>;
    async fn update_latest_min_event_timestamp(
        &self,
        state_id: &StateId,
        timestamp: Timestamp,
    ) -> Result<(), ActorError>;
    async fn update_start_timestamp(&self, state_id: &StateId, timestamp: Timestamp) -> Result<(), ActorError>;
    async fn over(&self, state_id: &StateId, is_over: bool) -> Result<(), ActorError>;
    async fn delete(&self, state_id: &StateId) -> Result<(), ActorError>;
}

/// Archive store gateway.
#[async_trait]
pub trait ArchiveStoreGateway<P: Send + Sync>: Send + Sync {
    async fn get_briefs(&self, state_id: &StateId) -> Result<Vec<ArchiveBrief>, ActorError>;
    /// Snapshot captured at the brief's `EndVersion`.
    async fn get_by_id(&self, state_id: &StateId, brief_id: Uuid) -> Result<Option<Snapshot<P>>, ActorError>;
    async fn insert(&self, state_id: &StateId, brief: &ArchiveBrief, snapshot: &Snapshot<P>) -> Result<(), ActorError>;
    async fn delete(&self, state_id: &StateId, brief_id: Uuid) -> Result<(), ActorError>;
    async fn delete_all(&self, state_id: &StateId) -> Result<(), ActorError>;
    /// Marks the brief's events cleared.
    async fn event_is_clear(&self, state_id: &StateId, brief_id: Uuid) -> Result<(), ActorError>;
    /// Bulk-copies events `<= end_version` into archive-event storage.
    async fn event_archive(
        &self,
        state_id: &StateId,
        end_version: Version,
        start_timestamp: Timestamp,
    ) -> Result<(), ActorError>;
    async fn over(&self, state_id: &StateId, is_over: bool) -> Result<(), ActorError>;
}
