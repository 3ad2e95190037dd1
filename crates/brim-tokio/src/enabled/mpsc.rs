use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use brim_runtime::{Depth, Source, Tracker};
use tokio::sync::mpsc;
pub use tokio::sync::mpsc::error;

/// Fill level shared by both halves of one channel.
///
/// The tracker holds it weakly, so a channel stays visible while any sender
/// or its receiver is alive.
struct Shared {
    len: AtomicUsize,
    capacity: usize,
}

impl Shared {
    // Runs before the value becomes receivable, so the matching `pop` can
    // never get ahead of it.
    fn push(&self) {
        self.len.fetch_add(1, Ordering::AcqRel);
    }

    fn pop(&self, count: usize) {
        let _ = self
            .len
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| {
                Some(len.saturating_sub(count))
            });
    }
}

impl Depth for Shared {
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Tracked version of [`tokio::sync::mpsc::Sender`].
pub struct Sender<T> {
    inner: mpsc::Sender<T>,
    shared: Arc<Shared>,
}

/// Tracked version of [`tokio::sync::mpsc::Receiver`].
///
/// Holding only the receiver keeps the channel tracked, so a backlog left
/// behind by finished producers still shows up in snapshots.
pub struct Receiver<T> {
    inner: mpsc::Receiver<T>,
    shared: Arc<Shared>,
}

/// Tracked version of [`tokio::sync::mpsc::Permit`].
///
/// Reserved capacity is not counted as buffered until [`Permit::send`].
pub struct Permit<'a, T> {
    inner: mpsc::Permit<'a, T>,
    shared: &'a Shared,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("len", &self.shared.len())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("len", &self.shared.len())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

impl<T> Sender<T> {
    /// Sends a value and waits for a free slot, matching [`tokio::sync::mpsc::Sender::send`].
    pub async fn send(&self, value: T) -> Result<(), error::SendError<T>> {
        match self.reserve().await {
            Ok(permit) => {
                permit.send(value);
                Ok(())
            }
            Err(_) => Err(error::SendError(value)),
        }
    }

    /// Sends without waiting, matching [`tokio::sync::mpsc::Sender::try_send`].
    pub fn try_send(&self, value: T) -> Result<(), error::TrySendError<T>> {
        match self.try_reserve() {
            Ok(permit) => {
                permit.send(value);
                Ok(())
            }
            Err(error::TrySendError::Full(())) => Err(error::TrySendError::Full(value)),
            Err(error::TrySendError::Closed(())) => Err(error::TrySendError::Closed(value)),
        }
    }

    /// Waits for a free slot and reserves it, matching [`tokio::sync::mpsc::Sender::reserve`].
    pub async fn reserve(&self) -> Result<Permit<'_, T>, error::SendError<()>> {
        let inner = self.inner.reserve().await?;
        Ok(Permit {
            inner,
            shared: &self.shared,
        })
    }

    /// Reserves a slot without waiting, matching [`tokio::sync::mpsc::Sender::try_reserve`].
    pub fn try_reserve(&self) -> Result<Permit<'_, T>, error::TrySendError<()>> {
        let inner = self.inner.try_reserve()?;
        Ok(Permit {
            inner,
            shared: &self.shared,
        })
    }

    /// Completes once the receiver is gone.
    pub async fn closed(&self) {
        self.inner.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Free slots right now. Reserved permits count as taken.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.inner.max_capacity()
    }

    pub fn same_channel(&self, other: &Self) -> bool {
        self.inner.same_channel(&other.inner)
    }
}

impl<T> Permit<'_, T> {
    /// Sends into the reserved slot, matching [`tokio::sync::mpsc::Permit::send`].
    pub fn send(self, value: T) {
        self.shared.push();
        self.inner.send(value);
    }
}

impl<T> Receiver<T> {
    /// Receives the next value, matching [`tokio::sync::mpsc::Receiver::recv`].
    pub async fn recv(&mut self) -> Option<T> {
        let value = self.inner.recv().await;
        if value.is_some() {
            self.shared.pop(1);
        }
        value
    }

    /// Receives without waiting, matching [`tokio::sync::mpsc::Receiver::try_recv`].
    pub fn try_recv(&mut self) -> Result<T, error::TryRecvError> {
        let value = self.inner.try_recv()?;
        self.shared.pop(1);
        Ok(value)
    }

    /// Receives up to `limit` values into `buffer`, matching
    /// [`tokio::sync::mpsc::Receiver::recv_many`].
    pub async fn recv_many(&mut self, buffer: &mut Vec<T>, limit: usize) -> usize {
        let received = self.inner.recv_many(buffer, limit).await;
        self.shared.pop(received);
        received
    }

    /// Closes the channel for senders; buffered values can still be received.
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.inner.max_capacity()
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        // Tokio drops whatever is still buffered along with the receiver.
        self.shared.len.store(0, Ordering::Release);
    }
}

/// Builds a bounded channel, like [`tokio::sync::mpsc::channel`], and tracks
/// it under the caller's location.
///
/// A `capacity` of 0 is never tracked. Tokio has no unbuffered channel, so
/// that case gets an untracked channel with a single slot.
#[track_caller]
pub fn channel<T: Send + 'static>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    channel_in(Tracker::global(), capacity, Source::caller())
}

/// Same as [`channel`], attributed to an explicit [`Source`].
pub fn channel_with_source<T: Send + 'static>(
    capacity: usize,
    source: Source,
) -> (Sender<T>, Receiver<T>) {
    channel_in(Tracker::global(), capacity, source)
}

/// Same as [`channel_with_source`], registered with `tracker`.
pub fn channel_in<T: Send + 'static>(
    tracker: &Tracker,
    capacity: usize,
    source: Source,
) -> (Sender<T>, Receiver<T>) {
    if capacity == 0 {
        return untracked(1);
    }
    let (tx, rx) = untracked(capacity);
    tracker.track(Arc::downgrade(&tx.shared), source);
    (tx, rx)
}

fn untracked<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    let shared = Arc::new(Shared {
        len: AtomicUsize::new(0),
        capacity,
    });
    (
        Sender {
            inner: tx,
            shared: Arc::clone(&shared),
        },
        Receiver { inner: rx, shared },
    )
}
