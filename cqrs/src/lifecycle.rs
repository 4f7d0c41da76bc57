use std::marker::PhantomData;

use cqrs_core::{ActorError, ActorOptions, ArchiveBriefList, BusMessage, EventApplier, OverType, StateId};

use crate::actor::{Actor, ActorDeps};

impl<P, Ev, App> Actor<P, Ev, App>
where
    P: Send + Sync + Clone,
    Ev: Send + Sync + Clone,
    App: EventApplier<Payload = P, Event = Ev>,
{
    /// Activation. The host has already resolved the primary key and wired
    /// dependencies by the time this is called; this method fetches the
    /// brief list (if archives are enabled), recovers the snapshot,
    /// reconstructs any pending archive the prior activation left in
    /// flight, and optionally blocks on observer sync.
    #[tracing::instrument(level = "info", skip(deps, options, create_snapshot), fields(state_id = %state_id))]
    pub async fn activate<F>(
        state_id: StateId,
        options: ActorOptions,
        deps: ActorDeps<P, Ev>,
        create_snapshot: F,
    ) -> Result<Self, ActorError>
    where
        F: FnOnce() -> P,
    {
        let mut briefs = ArchiveBriefList::default();
        let mut last_archive = None;
        let mut new_archive = None;

        if options.archive.on {
            let fetched = deps.archive_store.get_briefs(&state_id).await?;
            briefs = ArchiveBriefList::new(fetched);
            last_archive = briefs.last().cloned();

            if let Some(last) = last_archive.clone() {
                let completed = last.is_completed(&options.archive, None);
                if !completed && !last.event_is_cleared {
                    deps.archive_store.delete(&state_id, last.id).await?;
                    // Drop the partial brief from the list and treat it as
                    // the pending archive instead.
                    briefs.pop_last();
                    new_archive = Some(last);
                    last_archive = briefs.last().cloned();
                }
            }
        }

        let mut actor = Actor {
            state_id: state_id.clone(),
            options,
            snapshot: cqrs_core::Snapshot::fresh(state_id.clone(), create_snapshot(), deps.clock.now_ms()),
            snapshot_event_version: 0,
            briefs,
            last_archive,
            new_archive,
            has_ever_been_persisted: false,
            deps,
            _applier: PhantomData,
        };

        let fallback_payload = actor.snapshot.payload.clone();
        actor.recover(move || fallback_payload).await?;

        let pending_end = actor.new_archive.as_ref().map(|b| b.end_version);
        let last_end = actor.last_archive.as_ref().map(|b| b.end_version);
        let reconstruct_from = match (pending_end, last_end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };

        if actor.options.archive.on && actor.snapshot.version > 0 {
            if let Some(reconstruct_from) = reconstruct_from {
                if actor.snapshot.version > reconstruct_from {
                    actor.reconstruct_pending_archive(reconstruct_from).await?;
                }
            }
        }

        if actor.options.sync_all_observers_on_activate {
            for observer in actor.deps.observers.clone() {
                let ok = observer.sync_to(&actor.state_id, actor.snapshot.version).await?;
                if !ok {
                    return Err(ActorError::SyncAllObserversFailed(actor.state_id.clone()));
                }
            }
        }

        Ok(actor)
    }

    /// Re-folds events after `reconstruct_from` through `event_archive` to
    /// rebuild the pending archive a prior activation left in flight.
    async fn reconstruct_pending_archive(&mut self, reconstruct_from: u64) -> Result<(), ActorError> {
        let page_size = self.options.number_of_events_per_read as u64;
        let mut from_version = reconstruct_from + 1;
        loop {
            let to_version = from_version + page_size - 1;
            let page = self
                .deps
                .event_log
                .get_range(&self.state_id, self.snapshot.start_timestamp, from_version, to_version)
                .await?;
            let page_len = page.len() as u64;
            for (version, timestamp, bytes) in &page {
                let event = self.deps.event_serializer.decode(&self.state_id, bytes)?;
                let fully = cqrs_core::FullyEvent {
                    state_id: self.state_id.clone(),
                    basic_info: cqrs_core::BasicInfo { version: *version, timestamp: *timestamp },
                    event,
                };
                self.event_archive(&fully).await?;
            }
            from_version += page_size;
            if page_len < page_size {
                break;
            }
        }
        Ok(())
    }

    /// Deactivation.
    #[tracing::instrument(level = "info", skip(self), fields(state_id = %self.state_id))]
    pub async fn deactivate(&mut self) -> Result<(), ActorError> {
        let mut did_meaningful_work = false;

        if self.snapshot.version > self.snapshot_event_version {
            self.flush_snapshot().await?;
            did_meaningful_work = true;
        }

        if self.options.archive.on {
            let span = self
                .new_archive
                .as_ref()
                .map(|b| b.end_version.saturating_sub(b.start_version) + 1)
                .unwrap_or(0);
            if span >= self.options.archive.min_version_interval_at_deactivate {
                self.archive(true).await?;
                did_meaningful_work = true;
            }
        }

        if did_meaningful_work {
            self.on_deactivated().await;
        }

        Ok(())
    }

    /// No default behavior beyond logging. Fires when deactivation did
    /// meaningful work (a snapshot flush or a forced archive promotion),
    /// so callers that need a deactivation hook should observe this span
    /// rather than a separate callback.
    async fn on_deactivated(&self) {
        tracing::debug!(state_id = %self.state_id, version = self.snapshot.version, "deactivated");
    }

    /// `Over(overType)`.
    #[tracing::instrument(level = "info", skip(self), fields(state_id = %self.state_id))]
    pub async fn over(&mut self, over_type: OverType) -> Result<(), ActorError> {
        if self.snapshot.is_over {
            return Err(ActorError::StateIsOver(self.state_id.clone()));
        }
        if self.snapshot.version != self.snapshot.doing_version {
            return Err(ActorError::StateInsecurity {
                state_id: self.state_id.clone(),
                version: self.snapshot.version,
                doing_version: self.snapshot.doing_version,
            });
        }

        if over_type != OverType::None {
            for observer in &self.deps.observers {
                let committed = observer.committed_version(&self.state_id).await?;
                if committed < self.snapshot.version {
                    return Err(ActorError::ObserverNotCompleted(self.state_id.clone()));
                }
            }
        }

        self.snapshot.is_over = true;
        self.snapshot.is_latest = true;
        if self.snapshot.version > self.snapshot_event_version {
            self.flush_snapshot().await?;
        } else {
            self.deps.snapshot_store.over(&self.state_id, true).await?;
        }

        match over_type {
            OverType::ArchivingEvent => {
                self.deps.archive_store.delete_all(&self.state_id).await?;
                self.deps
                    .archive_store
                    .event_archive(&self.state_id, self.snapshot.version, self.snapshot.start_timestamp)
                    .await?;
            }
            OverType::DeleteEvent => {
                self.deps.archive_store.delete_all(&self.state_id).await?;
                self.deps
                    .event_log
                    .delete_previous(&self.state_id, self.snapshot.version, self.snapshot.start_timestamp)
                    .await?;
            }
            OverType::DeleteAll => {
                self.deps.archive_store.delete_all(&self.state_id).await?;
                self.deps
                    .event_log
                    .delete_previous(&self.state_id, self.snapshot.version, self.snapshot.start_timestamp)
                    .await?;
                self.deps.snapshot_store.delete(&self.state_id).await?;
            }
            OverType::None => {
                if self.options.archive.on {
                    self.deps.archive_store.over(&self.state_id, true).await?;
                }
            }
        }

        self.briefs = ArchiveBriefList::default();
        self.last_archive = None;
        self.new_archive = None;

        Ok(())
    }

    /// `Reset()`: `Over(DeleteAll)`, then recover into a fresh snapshot
    /// under `new_state_id`, then instruct observers to reset.
    #[tracing::instrument(level = "info", skip(self, create_snapshot), fields(old = %self.state_id, new = %new_state_id))]
    pub async fn reset<F>(&mut self, new_state_id: StateId, create_snapshot: F) -> Result<(), ActorError>
    where
        F: FnOnce() -> P,
    {
        let old_state_id = self.state_id.clone();
        self.over(OverType::DeleteAll).await?;

        self.state_id = new_state_id.clone();
        self.snapshot.is_over = false;
        self.has_ever_been_persisted = false;
        self.recover(create_snapshot).await?;

        for observer in self.deps.observers.clone() {
            observer.reset(&old_state_id, &new_state_id).await?;
        }

        Ok(())
    }

    /// Fire-and-forget bare publish (`Publish(msg)`): never touches the
    /// snapshot.
    pub async fn publish(&self, message: Ev) {
        let bytes = match self.deps.event_serializer.encode(&self.state_id, &message) {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(state_id = %self.state_id, error = %err, "publish: serialization failed");
                return;
            }
        };
        let type_code = self.deps.type_registry.type_code_of(&message);
        let msg = BusMessage { type_code, basic_info: None, payload: bytes };
        self.publish_to_bus(&msg).await;
    }

    /// `publish_to_bus`: async-bus-first or sync-fan-out-first, with the
    /// other path as fallback. Failures are logged, never propagated -- the
    /// event is already durable in the log.
    pub(crate) async fn publish_to_bus(&self, message: &BusMessage) {
        if self.options.priority_async_event_bus {
            if let Err(err) = self.deps.bus.publish(&self.state_id, message).await {
                tracing::warn!(state_id = %self.state_id, error = %err, "bus publish failed, falling back to sync fan-out");
                self.fan_out_sync(message).await;
            }
        } else {
            let mut any_failed = false;
            for observer in &self.deps.observers {
                if let Err(err) = observer.handle(&self.state_id, message).await {
                    tracing::warn!(state_id = %self.state_id, observer = observer.name(), error = %err, "observer handler failed");
                    any_failed = true;
                }
            }
            if any_failed {
                if let Err(err) = self.deps.bus.publish(&self.state_id, message).await {
                    tracing::warn!(state_id = %self.state_id, error = %err, "bus publish fallback also failed");
                }
            }
        }
    }

    async fn fan_out_sync(&self, message: &BusMessage) {
        for observer in &self.deps.observers {
            if let Err(err) = observer.handle(&self.state_id, message).await {
                tracing::warn!(state_id = %self.state_id, observer = observer.name(), error = %err, "observer handler failed");
            }
        }
    }
}
