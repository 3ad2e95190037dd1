//! Data types shared by the brim runtime and its facades.
//!
//! Everything here is plain data: nothing holds a reference to a tracked
//! queue. Types derive [`Facet`] so embedders can render snapshots with
//! whatever facet format crate they already use.

use std::fmt;

use facet::Facet;

/// Identifier assigned to a queue when it is registered.
///
/// Ids are handed out in increasing order starting at 1 and are never reused
/// by the tracker that issued them, even after the entry has been swept.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueId(u64);

impl QueueId {
    /// Wraps a raw id. Returns `None` for 0, which is never issued.
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// One successful read of a queue: how many items are buffered and how many
/// fit.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    /// Items currently buffered.
    pub len: usize,

    /// Maximum number of buffered items.
    pub capacity: usize,
}

impl Level {
    pub const fn new(len: usize, capacity: usize) -> Self {
        Self { len, capacity }
    }

    /// True when no more items fit without waiting.
    pub const fn is_full(self) -> bool {
        self.len >= self.capacity
    }
}

/// Point-in-time fill level of one tracked queue.
///
/// A report is produced only for queues that were still reachable when the
/// snapshot was taken, and it is never updated afterwards.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// Where the queue was constructed, as
    /// `"<function path> <file name>:<line>"`.
    pub call_site: String,

    /// Items buffered at sampling time.
    pub len: usize,

    /// Buffer size the queue was created with.
    pub capacity: usize,
}

impl Report {
    /// Builds a report from a call site and a successful read.
    pub fn new(call_site: impl Into<String>, level: Level) -> Self {
        Self {
            call_site: call_site.into(),
            len: level.len,
            capacity: level.capacity,
        }
    }

    pub fn level(&self) -> Level {
        Level::new(self.len, self.capacity)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}/{}]", self.call_site, self.len, self.capacity)
    }
}
