use crate::FullyEvent;

/// Pure, user-supplied function `apply(snapshot, event) -> snapshot'`.
///
/// Implementations must not perform I/O and must be deterministic: the
/// recovery engine replays events through this trait, and the raise
/// pipeline calls it once per freshly-appended event, so the same event may
/// be applied again after a crash mid-replay. Idempotence across replays
/// follows from version gating done by the caller (`Snapshot::update_version`),
/// not from anything this trait needs to guarantee itself.
pub trait EventApplier {
    type Payload;
    type Event;

    fn apply(payload: &mut Self::Payload, event: &FullyEvent<Self::Event>);
}
