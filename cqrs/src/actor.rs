use std::marker::PhantomData;
use std::sync::Arc;

use cqrs_core::{
    ActorError, ActorOptions, ArchiveBrief, ArchiveBriefList, ArchiveStoreGateway, EventApplier,
    EventBus, EventLogGateway, ObserverUnit, Serializer, Snapshot, SnapshotStoreGateway, StateId,
    TypeCodeRegistry, Version,
};

use crate::clock::Clock;

/// The external collaborators an actor is wired to at activation: storage
/// gateways, the bus, the observer-unit list, and the serializer/type
/// registry. Bundled behind `Arc<dyn _>` rather than threaded through as
/// extra generic parameters on every engine function, so the collaborator
/// set can grow without adding generic parameters to `Actor` itself.
pub struct ActorDeps<P, Ev> {
    pub event_log: Arc<dyn EventLogGateway<Event = Ev>>,
    pub snapshot_store: Arc<dyn SnapshotStoreGateway<P>>,
    pub archive_store: Arc<dyn ArchiveStoreGateway<P>>,
    pub bus: Arc<dyn EventBus>,
    pub observers: Vec<Arc<dyn ObserverUnit>>,
    pub event_serializer: Arc<dyn Serializer<Ev>>,
    pub type_registry: Arc<dyn TypeCodeRegistry<Ev>>,
    pub clock: Arc<dyn Clock>,
}

/// The per-actor in-memory state: the snapshot, the brief list, the
/// pending/last archive briefs, and the snapshot-flush watermark, owned
/// exclusively by the actor for the duration of one activation.
/// Activation/deactivation/`Over`/`Reset` are implemented as methods on
/// this type in `lifecycle.rs`, with `recovery.rs`, `raise.rs` and
/// `archive_engine.rs` providing the other methods.
pub struct Actor<P, Ev, App> {
    pub(crate) state_id: StateId,
    pub(crate) options: ActorOptions,
    pub(crate) snapshot: Snapshot<P>,
    /// Version at which the last snapshot flush occurred. Held beside the
    /// snapshot rather than inside it, since it tracks the store, not the
    /// aggregate.
    pub(crate) snapshot_event_version: Version,
    pub(crate) briefs: ArchiveBriefList,
    pub(crate) last_archive: Option<ArchiveBrief>,
    pub(crate) new_archive: Option<ArchiveBrief>,
    /// Whether this actor has ever issued a snapshot-store write for this
    /// `StateId` -- drives insert-vs-update (`insert` on first write,
    /// `update` on every write after).
    pub(crate) has_ever_been_persisted: bool,
    pub(crate) deps: ActorDeps<P, Ev>,
    pub(crate) _applier: PhantomData<fn() -> App>,
}

impl<P, Ev, App> Actor<P, Ev, App>
where
    P: Send + Sync + Clone,
    Ev: Send + Sync + Clone,
    App: EventApplier<Payload = P, Event = Ev>,
{
    pub fn state_id(&self) -> &StateId {
        &self.state_id
    }

    pub fn snapshot(&self) -> &Snapshot<P> {
        &self.snapshot
    }

    pub fn version(&self) -> Version {
        self.snapshot.version
    }

    pub fn is_over(&self) -> bool {
        self.snapshot.is_over
    }

    pub fn briefs(&self) -> &ArchiveBriefList {
        &self.briefs
    }

    pub fn last_archive(&self) -> Option<&ArchiveBrief> {
        self.last_archive.as_ref()
    }

    pub fn new_archive(&self) -> Option<&ArchiveBrief> {
        self.new_archive.as_ref()
    }

    pub fn cleared_archive(&self) -> Option<&ArchiveBrief> {
        self.briefs.cleared_archive()
    }

    /// `save_snapshot(force)`: persists iff forced, or iff
    /// `Version - SnapshotEventVersion >= SnapshotVersionInterval`.
    pub(crate) async fn save_snapshot(&mut self, force: bool) -> Result<(), ActorError> {
        let due = self.snapshot.version.saturating_sub(self.snapshot_event_version)
            >= self.options.snapshot_version_interval;
        if !force && !due {
            return Ok(());
        }
        self.flush_snapshot().await
    }

    pub(crate) async fn flush_snapshot(&mut self) -> Result<(), ActorError> {
        self.snapshot.is_latest = true;
        if self.has_ever_been_persisted {
            self.deps.snapshot_store.update(&self.snapshot).await?;
        } else {
            self.deps.snapshot_store.insert(&self.snapshot).await?;
            self.has_ever_been_persisted = true;
        }
        self.snapshot_event_version = self.snapshot.version;
        tracing::debug!(state_id = %self.state_id, version = self.snapshot.version, "snapshot flushed");
        Ok(())
    }
}
