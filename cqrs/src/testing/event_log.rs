use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use async_trait::async_trait;
use cqrs_core::{ActorError, EventLogGateway, StateId, Timestamp, Version};
use tokio::sync::RwLock;

#[derive(Default)]
struct Stream {
    events: Vec<(Version, Timestamp, Vec<u8>)>,
    unique_keys: HashSet<String>,
}

/// In-memory event log backed by a `RwLock<HashMap<StateId, Stream>>`,
/// implementing the `(StateId, Version)` + `unique_key` de-duplication
/// contract of [`EventLogGateway`].
pub struct InMemoryEventLog<Ev> {
    data: RwLock<HashMap<StateId, Stream>>,
    _event: PhantomData<fn() -> Ev>,
}

impl<Ev> Default for InMemoryEventLog<Ev> {
    fn default() -> Self {
        InMemoryEventLog { data: RwLock::new(HashMap::new()), _event: PhantomData }
    }
}

#[async_trait]
impl<Ev: Send + Sync> EventLogGateway for InMemoryEventLog<Ev> {
    type Event = Ev;

    async fn append(
        &self,
        state_id: &StateId,
        version: Version,
        timestamp: Timestamp,
        serialized_payload: &[u8],
        unique_key: &str,
    ) -> Result<bool, ActorError> {
        let mut guard = self.data.write().await;
        let stream = guard.entry(state_id.clone()).or_default();

        if stream.unique_keys.contains(unique_key) {
            return Ok(false);
        }
        if stream.events.iter().any(|(v, _, _)| *v == version) {
            return Ok(false);
        }

        stream.events.push((version, timestamp, serialized_payload.to_vec()));
        stream.unique_keys.insert(unique_key.to_owned());
        Ok(true)
    }

    async fn get_range(
        &self,
        state_id: &StateId,
        _from_timestamp: Timestamp,
        from_version_inclusive: Version,
        to_version_inclusive: Version,
    ) -> Result<Vec<(Version, Timestamp, Vec<u8>)>, ActorError> {
        let guard = self.data.read().await;
        let mut out = match guard.get(state_id) {
            Some(stream) => stream
                .events
                .iter()
                .filter(|(v, _, _)| *v >= from_version_inclusive && *v <= to_version_inclusive)
                .cloned()
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };
        out.sort_by_key(|(v, _, _)| *v);
        Ok(out)
    }

    async fn delete_previous(
        &self,
        state_id: &StateId,
        up_to_version_inclusive: Version,
        from_timestamp: Timestamp,
    ) -> Result<(), ActorError> {
        let mut guard = self.data.write().await;
        if let Some(stream) = guard.get_mut(state_id) {
            stream
                .events
                .retain(|(v, ts, _)| !(*v <= up_to_version_inclusive && *ts >= from_timestamp));
        }
        Ok(())
    }
}
