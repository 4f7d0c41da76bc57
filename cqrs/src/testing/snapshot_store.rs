use std::collections::HashMap;

use async_trait::async_trait;
use cqrs_core::{ActorError, Snapshot, SnapshotStoreGateway, StateId, Timestamp};
use tokio::sync::RwLock;

/// In-memory snapshot store backed by a `RwLock<HashMap<StateId, _>>`.
#[derive(Default)]
pub struct InMemorySnapshotStore<P> {
    data: RwLock<HashMap<StateId, Snapshot<P>>>,
}

#[async_trait]
impl<P: Clone + Send + Sync> SnapshotStoreGateway<P> for InMemorySnapshotStore<P> {
    async fn get(&self, state_id: &StateId) -> Result<Option<Snapshot<P>>, ActorError> {
        Ok(self.data.read().await.get(state_id).cloned())
    }

    async fn insert(&self, snapshot: &Snapshot<P>) -> Result<(), ActorError> {
        self.data.write().await.insert(snapshot.state_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn update(&self, snapshot: &Snapshot<P>) -> Result<(), ActorError> {
        self.data.write().await.insert(snapshot.state_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn update_is_latest(&self, state_id: &StateId, is_latest: bool) -> Result<(), ActorError> {
        if let Some(s) = self.data.write().await.get_mut(state_id) {
            s.is_latest = is_latest;
        }
        Ok(())
    }

    async fn update_latest_min_event_timestamp(
        &self,
        state_id: &StateId,
        timestamp: Timestamp,
    ) -> Result<(), ActorError> {
        if let Some(s) = self.data.write().await.get_mut(state_id) {
            s.latest_min_event_timestamp = timestamp;
        }
        Ok(())
    }

    async fn update_start_timestamp(&self, state_id: &StateId, timestamp: Timestamp) -> Result<(), ActorError> {
        if let Some(s) = self.data.write().await.get_mut(state_id) {
            s.start_timestamp = timestamp;
        }
        Ok(())
    }

    async fn over(&self, state_id: &StateId, is_over: bool) -> Result<(), ActorError> {
        if let Some(s) = self.data.write().await.get_mut(state_id) {
            s.is_over = is_over;
        }
        Ok(())
    }

    async fn delete(&self, state_id: &StateId) -> Result<(), ActorError> {
        self.data.write().await.remove(state_id);
        Ok(())
    }
}
