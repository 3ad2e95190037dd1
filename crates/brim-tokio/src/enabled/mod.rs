use std::sync::Arc;

use brim_runtime::{Depth, QueueId, Report, Source, Tracker};

pub(crate) mod mpsc;

pub use self::mpsc::{Permit, Receiver, Sender, channel, channel_in, channel_with_source, error};


/// Snapshot of every queue tracked by the process-wide tracker, sorted by
/// call site.
pub fn sample() -> Vec<Report> {
    Tracker::global().sample()
}

/// Tracks an application queue with the process-wide tracker, attributed to
/// the caller.
#[track_caller]
pub fn track_arc<Q>(queue: &Arc<Q>) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    Tracker::global().track_arc(queue, Source::caller())
}

pub fn track_arc_with_source<Q>(queue: &Arc<Q>, source: Source) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    Tracker::global().track_arc(queue, source)
}

pub fn track_arc_in<Q>(tracker: &Tracker, queue: &Arc<Q>, source: Source) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    tracker.track_arc(queue, source)
}
