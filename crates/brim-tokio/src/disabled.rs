use std::sync::{Arc, Once};

use brim_runtime::{Depth, QueueId, Report, Source, TRACKING_ENV, Tracker, parse_switch};
use tokio::sync::mpsc;
pub use tokio::sync::mpsc::{Permit, Receiver, Sender, error};

static TRACKING_REQUESTED_WARNING_ONCE: Once = Once::new();

fn warn_if_tracking_requested() {
    TRACKING_REQUESTED_WARNING_ONCE.call_once(|| {
        let Some(value) = std::env::var_os(TRACKING_ENV) else {
            return;
        };
        let value = value.to_string_lossy();
        if value.trim().is_empty() || parse_switch(&value) == Some(false) {
            return;
        }
        tracing::warn!(
            var = TRACKING_ENV,
            "queue tracking was requested, but brim was built without the `diagnostics` feature"
        );
    });
}

pub fn channel<T: Send + 'static>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    warn_if_tracking_requested();
    mpsc::channel(capacity.max(1))
}

pub fn channel_with_source<T: Send + 'static>(
    capacity: usize,
    _source: Source,
) -> (Sender<T>, Receiver<T>) {
    channel(capacity)
}

pub fn channel_in<T: Send + 'static>(
    _tracker: &Tracker,
    capacity: usize,
    _source: Source,
) -> (Sender<T>, Receiver<T>) {
    channel(capacity)
}

pub fn sample() -> Vec<Report> {
    Vec::new()
}

pub fn track_arc<Q>(_queue: &Arc<Q>) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    warn_if_tracking_requested();
    None
}

pub fn track_arc_with_source<Q>(queue: &Arc<Q>, _source: Source) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    track_arc(queue)
}

pub fn track_arc_in<Q>(_tracker: &Tracker, queue: &Arc<Q>, _source: Source) -> Option<QueueId>
where
    Q: Depth + Send + Sync + 'static,
{
    track_arc(queue)
}
