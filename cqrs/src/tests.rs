use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorDeps};
use crate::testing::{
    FailingBus, FixedTypeCode, InMemoryArchiveStore, InMemoryBus, InMemoryEventLog,
    InMemorySnapshotStore, JsonSerializer, ManualClock, RecordingObserver,
};
use cqrs_core::{ActorOptions, ArchiveOptions, EventApplier, EventUid, OverType, StateId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Counter {
    value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CounterEvent {
    Incremented(i64),
    WasReset,
}

struct CounterApplier;

impl EventApplier for CounterApplier {
    type Payload = Counter;
    type Event = CounterEvent;

    fn apply(payload: &mut Counter, event: &cqrs_core::FullyEvent<CounterEvent>) {
        match &event.event {
            CounterEvent::Incremented(n) => payload.value += n,
            CounterEvent::WasReset => payload.value = 0,
        }
    }
}

type TestActor = Actor<Counter, CounterEvent, CounterApplier>;

struct Harness {
    event_log: Arc<InMemoryEventLog<CounterEvent>>,
    snapshot_store: Arc<InMemorySnapshotStore<Counter>>,
    archive_store: Arc<InMemoryArchiveStore<Counter>>,
    bus: Arc<InMemoryBus>,
    clock: Arc<ManualClock>,
    observer: Arc<RecordingObserver>,
    options: ActorOptions,
}

impl Harness {
    fn new(options: ActorOptions) -> Self {
        Harness {
            event_log: Arc::new(InMemoryEventLog::default()),
            snapshot_store: Arc::new(InMemorySnapshotStore::default()),
            archive_store: Arc::new(InMemoryArchiveStore::default()),
            bus: Arc::new(InMemoryBus::default()),
            clock: Arc::new(ManualClock::at(1_000)),
            observer: Arc::new(RecordingObserver::new("proj")),
            options,
        }
    }

    fn deps(&self) -> ActorDeps<Counter, CounterEvent> {
        ActorDeps {
            event_log: self.event_log.clone(),
            snapshot_store: self.snapshot_store.clone(),
            archive_store: self.archive_store.clone(),
            bus: self.bus.clone(),
            observers: vec![self.observer.clone()],
            event_serializer: Arc::new(JsonSerializer::new()),
            type_registry: Arc::new(FixedTypeCode::new(1)),
            clock: self.clock.clone(),
        }
    }

    async fn activate(&self, state_id: StateId) -> TestActor {
        Actor::activate(state_id, self.options, self.deps(), Counter::default).await.unwrap()
    }
}

fn default_options() -> ActorOptions {
    let mut options = ActorOptions::default();
    options.snapshot_version_interval = 5;
    options.min_snapshot_version_interval = 1;
    options.archive = ArchiveOptions { on: false, ..options.archive };
    options
}

#[tokio::test]
async fn raises_five_events_and_persists_on_interval() {
    let harness = Harness::new(default_options());
    let state_id = StateId::from("agg-1");
    let mut actor = harness.activate(state_id.clone()).await;

    for i in 1..=5 {
        let ok = actor.raise(CounterEvent::Incremented(i), None, Counter::default).await.unwrap();
        assert!(ok);
    }

    assert_eq!(actor.version(), 5);
    assert_eq!(actor.snapshot().payload.value, 1 + 2 + 3 + 4 + 5);

    let persisted = harness.snapshot_store.get(&state_id).await.unwrap().unwrap();
    assert_eq!(persisted.version, 5);

    // Deactivate + reactivate with no new events: IsLatest true, so
    // recovery performs zero log reads and lands on the same version.
    actor.deactivate().await.unwrap();
    let reactivated = harness.activate(state_id.clone()).await;
    assert_eq!(reactivated.version(), 5);
    assert_eq!(reactivated.snapshot().payload.value, 15);
}

#[tokio::test]
async fn retro_dated_event_lowers_start_and_min_timestamps() {
    let harness = Harness::new(default_options());
    let state_id = StateId::from("agg-2");
    let mut actor = harness.activate(state_id.clone()).await;

    harness.clock.set(100);
    actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();
    assert_eq!(actor.snapshot().start_timestamp, 100);

    harness.clock.set(50);
    actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();

    assert_eq!(actor.snapshot().start_timestamp, 50);
    assert_eq!(actor.snapshot().latest_min_event_timestamp, 50);

    let persisted = harness.snapshot_store.get(&state_id).await.unwrap().unwrap();
    assert_eq!(persisted.start_timestamp, 50);
    assert_eq!(persisted.latest_min_event_timestamp, 50);
}

#[tokio::test]
async fn duplicate_unique_key_is_rejected_and_version_unchanged() {
    let harness = Harness::new(default_options());
    let state_id = StateId::from("agg-3");
    let mut actor = harness.activate(state_id).await;

    let uid = EventUid::with_timestamp("fixed-key", 10);
    let first = actor.raise(CounterEvent::Incremented(1), Some(uid.clone()), Counter::default).await.unwrap();
    assert!(first);
    assert_eq!(actor.version(), 1);

    let second = actor.raise(CounterEvent::Incremented(1), Some(uid), Counter::default).await.unwrap();
    assert!(!second);
    assert_eq!(actor.version(), 1, "doing_version must be restored, version unchanged");

    let third = actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();
    assert!(third);
    assert_eq!(actor.version(), 2);
}

#[tokio::test]
async fn over_delete_all_rejects_further_raises() {
    let harness = Harness::new(default_options());
    let state_id = StateId::from("agg-4");
    let mut actor = harness.activate(state_id.clone()).await;

    actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();
    harness.observer.set_committed(state_id.clone(), 1).await;
    actor.over(OverType::DeleteAll).await.unwrap();

    assert!(actor.is_over());
    assert!(harness.snapshot_store.get(&state_id).await.unwrap().is_none());

    let err = actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap_err();
    assert!(matches!(err, cqrs_core::ActorError::StateIsOver(_)));
}

#[tokio::test]
async fn event_is_cleared_guard_rejects_retro_event_inside_cleared_window() {
    let mut options = default_options();
    options.archive.on = true;
    options.archive.max_snapshot_archive_records = 1;
    options.archive.min_archive_version_span = 1;
    options.archive.min_archive_timestamp_span_ms = 1;

    let harness = Harness::new(options);
    let state_id = StateId::from("agg-5");
    let mut actor = harness.activate(state_id.clone()).await;

    harness.observer.set_committed(state_id.clone(), 100).await;

    harness.clock.set(0);
    actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();
    harness.clock.set(1000);
    actor.raise(CounterEvent::Incremented(1), None, Counter::default).await.unwrap();

    assert!(actor.cleared_archive().is_some(), "first brief should have been cleared");

    harness.clock.set(500);
    let err = actor
        .raise(CounterEvent::Incremented(1), Some(EventUid::with_timestamp("retro", 500)), Counter::default)
        .await
        .unwrap_err();
    assert!(matches!(err, cqrs_core::ActorError::EventIsCleared { .. }));
}

#[tokio::test]
async fn bus_fallback_reaches_observers_when_bus_publish_fails() {
    let mut options = default_options();
    options.priority_async_event_bus = true;

    let harness = Harness::new(options);
    let state_id = StateId::from("agg-6");

    let deps = ActorDeps { bus: Arc::new(FailingBus), ..harness.deps() };
    let mut actor = Actor::<Counter, CounterEvent, CounterApplier>::activate(state_id, options, deps, Counter::default)
        .await
        .unwrap();

    actor.raise(CounterEvent::Incremented(7), None, Counter::default).await.unwrap();

    assert_eq!(harness.observer.handled.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn reset_instructs_observers_and_yields_fresh_aggregate() {
    let harness = Harness::new(default_options());
    let old_id = StateId::from("agg-7");
    let new_id = StateId::from("agg-7-reset");
    let mut actor = harness.activate(old_id.clone()).await;

    actor.raise(CounterEvent::Incremented(9), None, Counter::default).await.unwrap();
    harness.observer.set_committed(old_id.clone(), 1).await;
    actor.reset(new_id.clone(), Counter::default).await.unwrap();

    assert_eq!(actor.state_id(), &new_id);
    assert_eq!(actor.version(), 0);
    assert_eq!(actor.snapshot().payload, Counter::default());

    let resets = harness.observer.resets.lock().unwrap();
    assert_eq!(resets.as_slice(), &[(old_id, new_id)]);
}
