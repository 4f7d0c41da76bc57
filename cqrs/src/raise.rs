use cqrs_core::{ActorError, BasicInfo, EventApplier, EventUid, FullyEvent};

use crate::actor::Actor;

impl<P, Ev, App> Actor<P, Ev, App>
where
    P: Send + Sync + Clone,
    Ev: Send + Sync + Clone,
    App: EventApplier<Payload = P, Event = Ev>,
{
    /// Raise pipeline. Returns `Ok(true)` on a committed event, `Ok(false)`
    /// on a de-duplicated append, and propagates invariant failures
    /// (`StateIsOver`, `StateInsecurity`, `EventIsCleared`) directly.
    /// Storage/serialization failures instead trigger local `recover()` + a
    /// forced snapshot flush before being re-thrown.
    #[tracing::instrument(level = "debug", skip(self, event, uid, create_snapshot), fields(state_id = %self.state_id))]
    pub async fn raise<F>(
        &mut self,
        event: Ev,
        uid: Option<EventUid>,
        create_snapshot: F,
    ) -> Result<bool, ActorError>
    where
        F: FnOnce() -> P,
    {
        if self.snapshot.is_over {
            return Err(ActorError::StateIsOver(self.state_id.clone()));
        }

        let version = self.snapshot.version + 1;
        let timestamp = uid
            .as_ref()
            .and_then(|u| u.timestamp)
            .unwrap_or_else(|| self.deps.clock.now_ms());
        let unique_key = uid
            .as_ref()
            .map(|u| u.key.clone())
            .unwrap_or_else(|| format!("{}:{}", self.state_id, version));

        let fully = FullyEvent {
            state_id: self.state_id.clone(),
            basic_info: BasicInfo { version, timestamp },
            event,
        };

        match self.raise_inner(fully, &unique_key).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_invariant_failure() => Err(err),
            Err(err) => {
                tracing::error!(state_id = %self.state_id, error = %err, "raise failed, rebuilding from storage");
                self.recover(create_snapshot).await?;
                self.flush_snapshot().await?;
                Err(err)
            }
        }
    }

    async fn raise_inner(&mut self, fully: FullyEvent<Ev>, unique_key: &str) -> Result<bool, ActorError> {
        self.on_raise_start(&fully).await?;

        self.snapshot.increment_doing_version()?;

        let bytes = self.deps.event_serializer.encode(&self.state_id, &fully.event)?;
        let appended = self
            .deps
            .event_log
            .append(&self.state_id, fully.version(), fully.timestamp(), &bytes, unique_key)
            .await?;

        if !appended {
            self.snapshot.decrement_doing_version();
            self.on_raise_failed().await?;
            return Ok(false);
        }

        App::apply(&mut self.snapshot.payload, &fully);
        self.snapshot.update_version(fully.version())?;

        self.on_raised(&fully).await?;
        self.save_snapshot(false).await?;
        self.publish_event(&fully, &bytes).await;

        Ok(true)
    }

    async fn on_raise_start(&mut self, fully: &FullyEvent<Ev>) -> Result<(), ActorError> {
        if self.snapshot.version > 0 && self.snapshot.is_latest {
            self.deps.snapshot_store.update_is_latest(&self.state_id, false).await?;
            self.snapshot.is_latest = false;
        }

        // Strictly precedes the brief-walk below: a retro-event inside the
        // cleared window is rejected before any brief is touched.
        if let Some(cleared) = self.briefs.cleared_archive().cloned() {
            if fully.timestamp() < cleared.end_timestamp {
                return Err(ActorError::EventIsCleared {
                    state_id: self.state_id.clone(),
                    timestamp: fully.timestamp(),
                    cleared_start: cleared.start_timestamp,
                });
            }
        }

        if fully.timestamp() < self.snapshot.latest_min_event_timestamp {
            self.deps
                .snapshot_store
                .update_latest_min_event_timestamp(&self.state_id, fully.timestamp())
                .await?;
            self.snapshot.latest_min_event_timestamp = fully.timestamp();

            if fully.timestamp() < self.snapshot.start_timestamp {
                self.deps
                    .snapshot_store
                    .update_start_timestamp(&self.state_id, fully.timestamp())
                    .await?;
                self.snapshot.start_timestamp = fully.timestamp();
            }
        }

        if self.options.archive.on {
            let retro_into_archives = self
                .last_archive
                .as_ref()
                .map(|last| fully.timestamp() < last.end_timestamp)
                .unwrap_or(false);

            if retro_into_archives {
                self.merge_retro_event_into_archives(fully.timestamp()).await?;
            }
        }

        Ok(())
    }

    /// Walks briefs from highest index down, folding every non-cleared
    /// brief whose `EndTimestamp` exceeds `event_timestamp` back into
    /// `NewArchive`.
    async fn merge_retro_event_into_archives(&mut self, event_timestamp: i64) -> Result<(), ActorError> {
        let popped = self.briefs.fold_back(event_timestamp);

        for brief in popped {
            self.deps.archive_store.delete(&self.state_id, brief.id).await?;
            self.new_archive = Some(match self.new_archive.take() {
                Some(pending) => pending.combine(&brief),
                None => brief,
            });
        }

        self.last_archive = self.briefs.last().cloned();
        Ok(())
    }

    /// Duplicate append: no default behavior beyond opportunistically
    /// promoting a pending archive, matching the default `on_raised` path --
    /// a duplicate append still means the wall clock and any already-merged
    /// `NewArchive` state moved forward.
    async fn on_raise_failed(&mut self) -> Result<(), ActorError> {
        if self.options.archive.on && self.new_archive.is_some() {
            self.archive(false).await?;
        }
        Ok(())
    }

    /// Extend `NewArchive` with the just-committed event, then maybe
    /// promote it.
    async fn on_raised(&mut self, fully: &FullyEvent<Ev>) -> Result<(), ActorError> {
        if self.options.archive.on {
            self.event_archive(fully).await?;
        }
        Ok(())
    }

    async fn publish_event(&self, fully: &FullyEvent<Ev>, bytes: &[u8]) {
        let type_code = self.deps.type_registry.type_code_of(&fully.event);
        let basic_info = serde_json::to_vec(&fully.basic_info).ok();
        let message = cqrs_core::BusMessage {
            type_code,
            basic_info,
            payload: bytes.to_vec(),
        };
        self.publish_to_bus(&message).await;
    }
}
