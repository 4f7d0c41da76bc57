//! In-memory gateway/bus/observer/clock test doubles, each a thin
//! `RwLock<HashMap<..>>` implementation of the corresponding storage
//! trait. Used by this crate's own test suite and available to downstream
//! crates that want to exercise the actor runtime without real storage.

mod archive_store;
mod bus;
mod clock;
mod event_log;
mod serializer;
mod snapshot_store;

pub use archive_store::InMemoryArchiveStore;
pub use bus::{FailingBus, InMemoryBus, RecordingObserver};
pub use clock::ManualClock;
pub use event_log::InMemoryEventLog;
pub use serializer::{FixedTypeCode, JsonSerializer};
pub use snapshot_store::InMemorySnapshotStore;
