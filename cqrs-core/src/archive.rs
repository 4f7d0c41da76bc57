use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ArchiveOptions;
use crate::{Timestamp, Version};

/// Archive metadata without the snapshot body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveBrief {
    pub id: Uuid,
    pub index: u32,
    pub start_version: Version,
    pub end_version: Version,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
    pub event_is_cleared: bool,
}

impl ArchiveBrief {
    /// Policy gate for promotion out of `NewArchive`: a minimum version
    /// span, a minimum wall-time span since the prior archive's end, or an
    /// operator-tunable threshold.
    pub fn is_completed(&self, options: &ArchiveOptions, last: Option<&ArchiveBrief>) -> bool {
        let version_span = self.end_version.saturating_sub(self.start_version) + 1;
        if version_span >= options.min_archive_version_span {
            return true;
        }
        let since_last = match last {
            Some(last) => self.end_timestamp - last.end_timestamp,
            None => self.end_timestamp - self.start_timestamp,
        };
        since_last >= options.min_archive_timestamp_span_ms
    }

    /// `combine_archive(main, merge)`: result spans the union of both
    /// briefs' version/timestamp ranges.
    pub fn combine(&self, merge: &ArchiveBrief) -> ArchiveBrief {
        ArchiveBrief {
            id: self.id,
            index: self.index.min(merge.index),
            start_version: self.start_version.min(merge.start_version),
            end_version: self.end_version.max(merge.end_version),
            start_timestamp: self.start_timestamp.min(merge.start_timestamp),
            end_timestamp: self.end_timestamp.max(merge.end_timestamp),
            event_is_cleared: false,
        }
    }
}

/// At most one in-flight brief accumulating events since the last
/// promotion. A type alias rather than a distinct struct because its shape
/// is identical to a completed `ArchiveBrief` until it is promoted -- only
/// the brief list decides whether an instance is "new" or "last".
pub type NewArchive = ArchiveBrief;

/// The ordered, contiguous-index brief list for one aggregate, encapsulating
/// the retro-event merge operation (`fold_back`) so it stays independently
/// testable rather than inlined in the raise pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveBriefList {
    briefs: Vec<ArchiveBrief>,
}

impl ArchiveBriefList {
    pub fn new(briefs: Vec<ArchiveBrief>) -> Self {
        ArchiveBriefList { briefs }
    }

    pub fn as_slice(&self) -> &[ArchiveBrief] {
        &self.briefs
    }

    pub fn is_empty(&self) -> bool {
        self.briefs.is_empty()
    }

    pub fn last(&self) -> Option<&ArchiveBrief> {
        self.briefs.last()
    }

    pub fn push(&mut self, brief: ArchiveBrief) {
        self.briefs.push(brief);
    }

    /// Highest-index cleared brief, if any -- `ClearedArchive`.
    pub fn cleared_archive(&self) -> Option<&ArchiveBrief> {
        self.briefs.iter().rev().find(|b| b.event_is_cleared)
    }

    pub fn non_cleared(&self) -> impl Iterator<Item = &ArchiveBrief> {
        self.briefs.iter().filter(|b| !b.event_is_cleared)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ArchiveBrief> {
        self.briefs.iter_mut()
    }

    /// Removes and returns the last (highest-index) brief, if any.
    pub fn pop_last(&mut self) -> Option<ArchiveBrief> {
        self.briefs.pop()
    }

    /// Pops briefs from the tail whose `EndTimestamp` exceeds
    /// `until_timestamp`, returning them oldest-first so the caller can fold
    /// each into the pending archive in order (the retro-event brief walk).
    /// Stops (without popping further) at the first brief whose
    /// `EndTimestamp` does not exceed `until_timestamp`, or at a cleared
    /// brief -- the caller is expected to have already rejected timestamps
    /// inside the cleared window before calling this, so the `ClearedArchive`
    /// guard must strictly precede this walk and a cleared brief is never
    /// popped here.
    pub fn fold_back(&mut self, until_timestamp: Timestamp) -> Vec<ArchiveBrief> {
        let mut popped = Vec::new();
        while let Some(candidate) = self.briefs.last() {
            if candidate.event_is_cleared || candidate.end_timestamp <= until_timestamp {
                break;
            }
            popped.push(self.briefs.pop().expect("checked non-empty above"));
        }
        popped.reverse();
        popped
    }

    /// Delete all cleared briefs older than the newest cleared one, keeping
    /// `keep` -- the event-cleaning step that retires stale cleared briefs
    /// once a newer one covers them. Returns the ids of the dropped briefs
    /// so the caller can also remove them from durable storage.
    pub fn retain_only_newest_cleared(&mut self, keep: Uuid) -> Vec<Uuid> {
        let mut seen_keep = false;
        let mut dropped = Vec::new();
        self.briefs.retain(|b| {
            if b.id == keep {
                seen_keep = true;
                true
            } else if b.event_is_cleared {
                dropped.push(b.id);
                false
            } else {
                true
            }
        });
        debug_assert!(seen_keep, "kept brief must still be present");
        dropped
    }
}
