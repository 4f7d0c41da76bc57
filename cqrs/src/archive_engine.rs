use cqrs_core::{ActorError, ArchiveBrief, EventApplier, EventArchiveType, FullyEvent};
use uuid::Uuid;

use crate::actor::Actor;

impl<P, Ev, App> Actor<P, Ev, App>
where
    P: Send + Sync + Clone,
    Ev: Send + Sync + Clone,
    App: EventApplier<Payload = P, Event = Ev>,
{
    /// Widens or creates `NewArchive` for the just-committed event, then
    /// checks whether it is eligible for promotion.
    pub(crate) async fn event_archive(&mut self, fully: &FullyEvent<Ev>) -> Result<(), ActorError> {
        match &mut self.new_archive {
            None => {
                let index = self.last_archive.as_ref().map(|b| b.index + 1).unwrap_or(0);
                self.new_archive = Some(ArchiveBrief {
                    id: Uuid::new_v4(),
                    index,
                    start_version: fully.version(),
                    end_version: fully.version(),
                    start_timestamp: fully.timestamp(),
                    end_timestamp: fully.timestamp(),
                    event_is_cleared: false,
                });
            }
            Some(pending) => {
                pending.start_timestamp = pending.start_timestamp.min(fully.timestamp());
                pending.end_timestamp = pending.end_timestamp.max(fully.timestamp());
                pending.end_version = fully.version();
            }
        }

        self.archive(false).await
    }

    /// `archive(force)`: promotes the pending archive to the brief list
    /// when forced or when it satisfies `is_completed`.
    pub(crate) async fn archive(&mut self, force: bool) -> Result<(), ActorError> {
        self.snapshot.check_doing_version_invariant()?;
        if self.snapshot.version != self.snapshot.doing_version {
            return Err(ActorError::StateInsecurity {
                state_id: self.state_id.clone(),
                version: self.snapshot.version,
                doing_version: self.snapshot.doing_version,
            });
        }

        let Some(pending) = self.new_archive.clone() else {
            return Ok(());
        };

        let eligible = force || pending.is_completed(&self.options.archive, self.last_archive.as_ref());
        if !eligible {
            return Ok(());
        }

        tracing::debug!(state_id = %self.state_id, index = pending.index, "promoting pending archive");
        self.deps.archive_store.insert(&self.state_id, &pending, &self.snapshot).await?;
        self.briefs.push(pending.clone());
        self.last_archive = Some(pending);
        self.new_archive = None;

        self.on_archive_completed().await
    }

    /// Event-cleaning: once `MaxSnapshotArchiveRecords` non-cleared briefs
    /// have accumulated, check whether every observer has caught up to the
    /// oldest one and, if so, clear its events and advance `ClearedArchive`.
    async fn on_archive_completed(&mut self) -> Result<(), ActorError> {
        let noncleared: Vec<ArchiveBrief> = self.briefs.non_cleared().cloned().collect();
        if noncleared.len() < self.options.archive.max_snapshot_archive_records {
            return Ok(());
        }
        let Some(oldest) = noncleared.first().cloned() else {
            return Ok(());
        };

        let mut all_caught_up = true;
        for observer in &self.deps.observers {
            let committed = observer.committed_version(&self.state_id).await?;
            if committed < oldest.end_version {
                all_caught_up = false;
                break;
            }
        }
        if !all_caught_up {
            return Ok(());
        }

        self.deps.archive_store.event_is_clear(&self.state_id, oldest.id).await?;
        if let Some(brief) = self.briefs_mut_find(oldest.id) {
            brief.event_is_cleared = true;
        }

        if self.snapshot_event_version < oldest.end_version {
            self.flush_snapshot().await?;
        }

        match self.options.archive.event_archive_type {
            EventArchiveType::Delete => {
                self.deps
                    .event_log
                    .delete_previous(&self.state_id, oldest.end_version, oldest.start_timestamp)
                    .await?;
            }
            EventArchiveType::Move => {
                self.deps
                    .archive_store
                    .event_archive(&self.state_id, oldest.end_version, oldest.start_timestamp)
                    .await?;
            }
        }

        let dropped = self.briefs.retain_only_newest_cleared(oldest.id);
        for id in dropped {
            self.deps.archive_store.delete(&self.state_id, id).await?;
        }
        self.last_archive = self.briefs.last().cloned();

        tracing::info!(state_id = %self.state_id, brief = %oldest.id, end_version = oldest.end_version, "archive events cleared");
        Ok(())
    }

    fn briefs_mut_find(&mut self, id: Uuid) -> Option<&mut ArchiveBrief> {
        self.briefs.iter_mut().find(|b| b.id == id)
    }
}
