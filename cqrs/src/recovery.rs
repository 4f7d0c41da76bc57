use cqrs_core::{ActorError, EventApplier, FullyEvent, Snapshot};

use crate::actor::Actor;

impl<P, Ev, App> Actor<P, Ev, App>
where
    P: Send + Sync + Clone,
    Ev: Send + Sync + Clone,
    App: EventApplier<Payload = P, Event = Ev>,
{
    /// Rebuilds the in-memory snapshot from the snapshot store, falling
    /// back to the last archive body, falling back to a fresh snapshot,
    /// then replays events in bounded pages until `IsLatest`.
    #[tracing::instrument(level = "debug", skip(self, create_snapshot), fields(state_id = %self.state_id))]
    pub async fn recover<F>(&mut self, create_snapshot: F) -> Result<(), ActorError>
    where
        F: FnOnce() -> P,
    {
        let fetched = self.deps.snapshot_store.get(&self.state_id).await?;
        self.has_ever_been_persisted = fetched.is_some();

        let snapshot = match fetched {
            Some(s) => s,
            None => {
                let from_archive = if self.options.archive.on {
                    match self.last_archive.clone() {
                        Some(brief) => self.deps.archive_store.get_by_id(&self.state_id, brief.id).await?,
                        None => None,
                    }
                } else {
                    None
                };
                match from_archive {
                    Some(s) => s,
                    None => {
                        let now = self.deps.clock.now_ms();
                        Snapshot::fresh(self.state_id.clone(), create_snapshot(), now)
                    }
                }
            }
        };

        self.snapshot = snapshot;
        self.snapshot_event_version = self.snapshot.version;

        if !self.has_ever_been_persisted {
            // Establish the snapshot-store row immediately so the
            // field-level bookkeeping updates in `on_raise_start`
            // (`update_is_latest`, `update_latest_min_event_timestamp`,
            // `update_start_timestamp`) have a row to act on even before
            // the first interval-triggered flush.
            self.deps.snapshot_store.insert(&self.snapshot).await?;
            self.has_ever_been_persisted = true;
        }

        let page_size = self.options.number_of_events_per_read as u64;
        while !self.snapshot.is_latest {
            let from_version = self.snapshot.version + 1;
            let to_version = self.snapshot.version + page_size;
            let page = self
                .deps
                .event_log
                .get_range(
                    &self.state_id,
                    self.snapshot.latest_min_event_timestamp,
                    from_version,
                    to_version,
                )
                .await?;

            let page_len = page.len() as u64;
            for (version, timestamp, bytes) in &page {
                let event = self.deps.event_serializer.decode(&self.state_id, bytes)?;
                let fully = FullyEvent {
                    state_id: self.state_id.clone(),
                    basic_info: cqrs_core::BasicInfo { version: *version, timestamp: *timestamp },
                    event,
                };
                self.snapshot.increment_doing_version()?;
                App::apply(&mut self.snapshot.payload, &fully);
                self.snapshot.update_version(fully.version())?;
            }

            if page_len < page_size {
                self.snapshot.is_latest = true;
                break;
            }
        }

        if self
            .snapshot
            .version
            .saturating_sub(self.snapshot_event_version)
            >= self.options.min_snapshot_version_interval
        {
            self.flush_snapshot().await?;
        }

        Ok(())
    }
}
