use std::marker::PhantomData;

use cqrs_core::{ActorError, Serializer, StateId, TypeCodeRegistry};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// `serde_json`-backed serializer double; real deployments would plug in
/// whatever wire format the host's serializer collaborator uses -- the
/// actor runtime never inspects the wire format itself.
#[derive(Default)]
pub struct JsonSerializer<T>(PhantomData<fn() -> T>);

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        JsonSerializer(PhantomData)
    }
}

impl<T: Serialize + DeserializeOwned + Send + Sync> Serializer<T> for JsonSerializer<T> {
    fn encode(&self, state_id: &StateId, value: &T) -> Result<Vec<u8>, ActorError> {
        serde_json::to_vec(value).map_err(|e| ActorError::serialization(state_id.clone(), e))
    }

    fn decode(&self, state_id: &StateId, bytes: &[u8]) -> Result<T, ActorError> {
        serde_json::from_slice(bytes).map_err(|e| ActorError::serialization(state_id.clone(), e))
    }
}

/// Type-code registry double that always returns a fixed code; tests that
/// care about per-variant codes can supply their own `TypeCodeRegistry`.
#[derive(Default)]
pub struct FixedTypeCode<T>(u32, PhantomData<fn() -> T>);

impl<T> FixedTypeCode<T> {
    pub fn new(code: u32) -> Self {
        FixedTypeCode(code, PhantomData)
    }
}

impl<T: Send + Sync> TypeCodeRegistry<T> for FixedTypeCode<T> {
    fn type_code_of(&self, _value: &T) -> u32 {
        self.0
    }
}
