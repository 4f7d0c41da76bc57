use serde::{Deserialize, Serialize};

use crate::error::ActorError;
use crate::state_id::StateId;
use crate::{Timestamp, Version};

/// In-memory aggregate snapshot: user payload plus its bookkeeping header.
/// `SnapshotEventVersion` is deliberately kept out of this struct -- it
/// tracks the store, not the aggregate -- and lives on the actor state
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<P> {
    pub state_id: StateId,
    pub payload: P,
    pub version: Version,
    pub doing_version: Version,
    pub start_timestamp: Timestamp,
    pub latest_min_event_timestamp: Timestamp,
    pub is_latest: bool,
    pub is_over: bool,
}

impl<P> Snapshot<P> {
    /// A fresh snapshot for a never-before-seen aggregate, built from the
    /// caller-supplied `create_snapshot()` closure when recovery finds
    /// nothing to restore.
    pub fn fresh(state_id: StateId, payload: P, now: Timestamp) -> Self {
        Snapshot {
            state_id,
            payload,
            version: 0,
            doing_version: 0,
            start_timestamp: now,
            latest_min_event_timestamp: now,
            is_latest: true,
            is_over: false,
        }
    }

    /// `DoingVersion ∈ {Version, Version+1}` -- asserted after every
    /// checkpoint transition. Exposed so the raise/recovery engines can
    /// cheaply re-verify it at their own checkpoints.
    pub fn check_doing_version_invariant(&self) -> Result<(), ActorError> {
        if self.doing_version == self.version || self.doing_version == self.version + 1 {
            Ok(())
        } else {
            Err(ActorError::StateInsecurity {
                state_id: self.state_id.clone(),
                version: self.version,
                doing_version: self.doing_version,
            })
        }
    }

    /// Begin a two-phase commit: asserts `DoingVersion == Version` (no
    /// commit already in flight) then sets `DoingVersion = Version + 1`.
    /// This two-counter discipline is the only way to detect a torn commit
    /// after a failed append, so it is never collapsed into a single
    /// counter.
    pub fn increment_doing_version(&mut self) -> Result<(), ActorError> {
        if self.doing_version != self.version {
            return Err(ActorError::StateInsecurity {
                state_id: self.state_id.clone(),
                version: self.version,
                doing_version: self.doing_version,
            });
        }
        self.doing_version = self.version + 1;
        Ok(())
    }

    /// Undo `increment_doing_version` after a failed (de-duplicated) append.
    pub fn decrement_doing_version(&mut self) {
        self.doing_version = self.version;
    }

    /// Commit a two-phase advance: asserts the applied event's version
    /// matches `DoingVersion`, then sets `Version = DoingVersion`.
    pub fn update_version(&mut self, applied_event_version: Version) -> Result<(), ActorError> {
        if applied_event_version != self.doing_version {
            return Err(ActorError::StateInsecurity {
                state_id: self.state_id.clone(),
                version: self.version,
                doing_version: self.doing_version,
            });
        }
        self.version = self.doing_version;
        Ok(())
    }
}
