use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use brim_types::QueueId;
use tokio::sync::mpsc;

use crate::Registry;

/// Ids found dead by one snapshot, bound to the registry generation they were
/// read from.
struct Sweep {
    registry: Weak<Registry>,
    ids: Vec<QueueId>,
}

impl Sweep {
    fn apply(self) {
        // A reset replaced the generation; its entries are gone already.
        let Some(registry) = self.registry.upgrade() else {
            tracing::trace!(ids = self.ids.len(), "dropping sweep for a retired registry");
            return;
        };
        let removed = self.ids.iter().filter(|id| registry.remove(**id)).count();
        tracing::debug!(removed, remaining = registry.len(), "swept dead queue entries");
    }
}

/// Background worker that removes dead registry entries off the sampling path.
///
/// The worker thread starts on the first batch and exits once the owning
/// tracker is dropped.
pub(crate) struct Sweeper {
    thread_name: String,
    tx: OnceLock<Option<mpsc::UnboundedSender<Sweep>>>,
    pending: Arc<AtomicUsize>,
}

impl Sweeper {
    pub(crate) fn new(thread_name: String) -> Self {
        Self {
            thread_name,
            tx: OnceLock::new(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues `ids` for removal from `registry` and returns immediately.
    pub(crate) fn submit(&self, registry: &Arc<Registry>, ids: Vec<QueueId>) {
        let sweep = Sweep {
            registry: Arc::downgrade(registry),
            ids,
        };
        let Some(tx) = self.tx.get_or_init(|| self.spawn()) else {
            sweep.apply();
            return;
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        if let Err(mpsc::error::SendError(sweep)) = tx.send(sweep) {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            sweep.apply();
        }
    }

    /// Batches submitted but not applied yet.
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    fn spawn(&self) -> Option<mpsc::UnboundedSender<Sweep>> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Sweep>();
        let pending = Arc::clone(&self.pending);
        let spawned = std::thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                while let Some(sweep) = rx.blocking_recv() {
                    sweep.apply();
                    pending.fetch_sub(1, Ordering::AcqRel);
                }
            });
        match spawned {
            Ok(_) => Some(tx),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    thread = %self.thread_name,
                    "could not start sweeper thread, sweeping inline"
                );
                None
            }
        }
    }
}
