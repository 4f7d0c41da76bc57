use crate::error::ActorError;
use crate::state_id::StateId;

/// The payload (de)serializer, specified only through the interface the
/// actor runtime consumes. The runtime calls this at every point it needs
/// event/snapshot bytes -- append, recovery replay, archive body, bus
/// publish -- and never inspects the wire format itself.
pub trait Serializer<T>: Send + Sync {
    fn encode(&self, state_id: &StateId, value: &T) -> Result<Vec<u8>, ActorError>;
    fn decode(&self, state_id: &StateId, bytes: &[u8]) -> Result<T, ActorError>;
}

/// The type-code registry. Maps an event type to the `TypeCode` used in
/// the bus wire message.
pub trait TypeCodeRegistry<T>: Send + Sync {
    fn type_code_of(&self, value: &T) -> u32;
}
