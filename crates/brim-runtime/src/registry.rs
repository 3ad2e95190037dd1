use std::sync::Arc;

use brim_types::QueueId;
use dashmap::DashMap;

use crate::Sampler;

/// Concurrent map from queue id to sampler.
///
/// Sharded, so inserts, removals, and iteration only ever contend on one
/// shard at a time.
#[derive(Debug, Default)]
pub struct Registry {
    samplers: DashMap<QueueId, Arc<Sampler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: QueueId, sampler: Sampler) {
        self.samplers.insert(id, Arc::new(sampler));
    }

    /// Removes an entry. Unknown ids are ignored.
    pub fn remove(&self, id: QueueId) -> bool {
        self.samplers.remove(&id).is_some()
    }

    /// Weakly consistent view of the current entries.
    ///
    /// Entries inserted or removed while this runs may or may not show up.
    /// Samplers are handed out as `Arc`s so callers read them after the shard
    /// locks are released.
    pub fn entries(&self) -> Vec<(QueueId, Arc<Sampler>)> {
        self.samplers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}
