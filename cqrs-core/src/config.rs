/// The terminal-transition variants of `Over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverType {
    /// Mark the archive over-flag only (archives enabled).
    None,
    /// Delete all archives, move all events to archive-event store.
    ArchivingEvent,
    /// Delete all archives, delete all events.
    DeleteEvent,
    /// Delete archives, delete events, delete snapshot.
    DeleteAll,
}

/// Archive event-pruning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventArchiveType {
    /// Delete cleared events from the log outright.
    Delete,
    /// Move cleared events into archive-event storage.
    Move,
}

/// Archive subsystem configuration.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    pub on: bool,
    /// Threshold of non-cleared briefs that triggers event-clearing the
    /// oldest one, once observers have caught up.
    pub max_snapshot_archive_records: usize,
    /// Minimum `NewArchive` span (by version) that forces an archive at
    /// deactivation even if the normal completion policy hasn't fired.
    pub min_version_interval_at_deactivate: u64,
    pub event_archive_type: EventArchiveType,
    /// Minimum version span a pending archive must cover before it is
    /// eligible for promotion (`ArchiveBrief::is_completed`).
    pub min_archive_version_span: u64,
    /// Minimum wall-clock span (ms) since the prior archive's end before a
    /// pending archive is eligible for promotion.
    pub min_archive_timestamp_span_ms: i64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            on: true,
            max_snapshot_archive_records: 3,
            min_version_interval_at_deactivate: 50,
            event_archive_type: EventArchiveType::Move,
            min_archive_version_span: 100,
            min_archive_timestamp_span_ms: 60 * 60 * 1000,
        }
    }
}

/// Top-level configuration consumed by the actor runtime.
#[derive(Debug, Clone, Copy)]
pub struct ActorOptions {
    /// Page size for recovery reads (`NumberOfEventsPerRead`).
    pub number_of_events_per_read: u32,
    /// Versions between automatic snapshot flushes.
    pub snapshot_version_interval: u64,
    /// Minimum delta to trigger a forced flush on activate/deactivate.
    pub min_snapshot_version_interval: u64,
    /// Prefer bus-first (`true`) vs. in-process-observer-first (`false`)
    /// fan-out order for `publish_to_bus`.
    pub priority_async_event_bus: bool,
    /// Block activation until every observer catches up to the recovered
    /// version.
    pub sync_all_observers_on_activate: bool,
    pub archive: ArchiveOptions,
}

impl Default for ActorOptions {
    fn default() -> Self {
        ActorOptions {
            number_of_events_per_read: 200,
            snapshot_version_interval: 50,
            min_snapshot_version_interval: 10,
            priority_async_event_bus: false,
            sync_all_observers_on_activate: false,
            archive: ArchiveOptions::default(),
        }
    }
}
