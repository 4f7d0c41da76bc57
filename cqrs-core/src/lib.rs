//! Core types and traits consumed by the actor runtime in the `cqrs` crate.
//!
//! This crate defines the data model (snapshot, event, archive brief), the
//! storage gateway traits the actor host wires up at activation, and the
//! error/config types shared across the runtime. It performs no I/O and no
//! orchestration of its own -- see the `cqrs` crate for the recovery,
//! raise, archive and lifecycle engines built on top of these types.

mod applier;
mod archive;
mod config;
mod error;
mod event;
mod gateways;
mod observer;
mod serializer;
mod snapshot;
mod state_id;

pub use applier::EventApplier;
pub use archive::{ArchiveBrief, ArchiveBriefList, NewArchive};
pub use config::{ActorOptions, ArchiveOptions, EventArchiveType, OverType};
pub use error::ActorError;
pub use event::{BasicInfo, EventUid, FullyEvent};
pub use gateways::{ArchiveStoreGateway, EventLogGateway, SnapshotStoreGateway};
pub use observer::{BusMessage, EventBus, ObserverUnit};
pub use serializer::{Serializer, TypeCodeRegistry};
pub use snapshot::Snapshot;
pub use state_id::StateId;

/// Milliseconds since the Unix epoch. Kept as a bare alias (rather than a
/// newtype) because the core never interprets it beyond ordering and
/// arithmetic comparisons -- the host/serializer own calendar semantics.
pub type Timestamp = i64;

/// Monotonic event/snapshot version. Starts at 0 for a fresh aggregate.
pub type Version = u64;
