use thiserror::Error;

use crate::StateId;

/// Every error kind the actor runtime can surface.
#[derive(Debug, Error)]
pub enum ActorError {
    /// A `raise`, `reset`, or delete was attempted on a terminal aggregate.
    #[error("aggregate {0} is over, no further events may be raised")]
    StateIsOver(StateId),

    /// `Version == DoingVersion` was violated at a checkpoint.
    #[error("aggregate {state_id} invariant broken: version {version} != doing_version {doing_version}")]
    StateInsecurity {
        state_id: StateId,
        version: u64,
        doing_version: u64,
    },

    /// A retro-dated event falls inside a cleared archive window.
    #[error("aggregate {state_id} event at timestamp {timestamp} falls inside cleared archive starting at {cleared_start}")]
    EventIsCleared {
        state_id: StateId,
        timestamp: i64,
        cleared_start: i64,
    },

    /// `Over` was requested before every observer caught up.
    #[error("aggregate {0} has observers not yet caught up to the requested version")]
    ObserverNotCompleted(StateId),

    /// Activation-time observer sync returned false for at least one observer.
    #[error("aggregate {0} failed to sync all observers on activation")]
    SyncAllObserversFailed(StateId),

    /// The event applier dependency was missing at activation.
    #[error("no snapshot/event applier handler registered for aggregate {0}")]
    UnfindSnapshotHandler(StateId),

    /// Any gateway (event log, snapshot store, archive store) failure.
    #[error("storage error for aggregate {state_id}: {source}")]
    Storage {
        state_id: StateId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Payload encode/decode failure.
    #[error("serialization error for aggregate {state_id}: {source}")]
    Serialization {
        state_id: StateId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ActorError {
    pub fn storage<E>(state_id: StateId, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ActorError::Storage {
            state_id,
            source: Box::new(source),
        }
    }

    pub fn serialization<E>(state_id: StateId, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ActorError::Serialization {
            state_id,
            source: Box::new(source),
        }
    }

    /// True for invariant failures that are not recoverable locally (as
    /// opposed to storage/serialization failures, which trigger `recover()`
    /// inside the raise pipeline).
    pub fn is_invariant_failure(&self) -> bool {
        matches!(
            self,
            ActorError::StateIsOver(_) | ActorError::StateInsecurity { .. } | ActorError::EventIsCleared { .. }
        )
    }
}
