use std::sync::Mutex;

use async_trait::async_trait;
use cqrs_core::{ActorError, BusMessage, EventBus, ObserverUnit, StateId, Version};
use tokio::sync::RwLock;

/// Records every message handed to it; never fails. Useful as the bus
/// itself in tests that only assert publish fan-out order.
#[derive(Default)]
pub struct InMemoryBus {
    pub published: Mutex<Vec<(StateId, BusMessage)>>,
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, state_id: &StateId, message: &BusMessage) -> Result<(), ActorError> {
        self.published.lock().unwrap().push((state_id.clone(), message.clone()));
        Ok(())
    }
}

/// A bus double that always fails `publish`, for exercising the
/// `publish_to_bus` fallback paths.
#[derive(Default)]
pub struct FailingBus;

#[async_trait]
impl EventBus for FailingBus {
    async fn publish(&self, state_id: &StateId, _message: &BusMessage) -> Result<(), ActorError> {
        Err(ActorError::storage(state_id.clone(), std::io::Error::new(std::io::ErrorKind::Other, "bus down")))
    }
}

/// An observer double tracking a committed version per `StateId` plus
/// every message/reset it has been handed, for assertions in the
/// lifecycle/raise test suites.
pub struct RecordingObserver {
    name: String,
    committed: RwLock<std::collections::HashMap<StateId, Version>>,
    pub handled: Mutex<Vec<(StateId, BusMessage)>>,
    pub resets: Mutex<Vec<(StateId, StateId)>>,
    pub fail_handle: bool,
}

impl RecordingObserver {
    pub fn new(name: impl Into<String>) -> Self {
        RecordingObserver {
            name: name.into(),
            committed: RwLock::new(std::collections::HashMap::new()),
            handled: Mutex::new(Vec::new()),
            resets: Mutex::new(Vec::new()),
            fail_handle: false,
        }
    }

    pub async fn set_committed(&self, state_id: StateId, version: Version) {
        self.committed.write().await.insert(state_id, version);
    }
}

#[async_trait]
impl ObserverUnit for RecordingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn committed_version(&self, state_id: &StateId) -> Result<Version, ActorError> {
        Ok(self.committed.read().await.get(state_id).copied().unwrap_or(0))
    }

    async fn handle(&self, state_id: &StateId, message: &BusMessage) -> Result<(), ActorError> {
        if self.fail_handle {
            return Err(ActorError::storage(
                state_id.clone(),
                std::io::Error::new(std::io::ErrorKind::Other, "observer down"),
            ));
        }
        self.handled.lock().unwrap().push((state_id.clone(), message.clone()));
        let mut committed = self.committed.write().await;
        let entry = committed.entry(state_id.clone()).or_insert(0);
        if let Some(info) = &message.basic_info {
            if let Ok(basic) = serde_json::from_slice::<cqrs_core::BasicInfo>(info) {
                *entry = (*entry).max(basic.version);
            }
        }
        Ok(())
    }

    async fn sync_to(&self, state_id: &StateId, version: Version) -> Result<bool, ActorError> {
        self.committed.write().await.insert(state_id.clone(), version);
        Ok(true)
    }

    async fn reset(&self, old_state_id: &StateId, new_state_id: &StateId) -> Result<(), ActorError> {
        self.resets.lock().unwrap().push((old_state_id.clone(), new_state_id.clone()));
        self.committed.write().await.remove(old_state_id);
        Ok(())
    }
}
