use std::sync::Weak;

use brim_types::Level;

/// A reference to a tracked queue that does not keep it alive.
///
/// `level` returns `None` once the application has dropped its last strong
/// reference. It must not block, and it must not panic for a dead queue.
pub trait WeakHandle: Send + Sync + 'static {
    fn level(&self) -> Option<Level>;
}

/// Read access to the fill level of a bounded queue.
///
/// Implement this for application queues that are shared through an `Arc`
/// and register them with [`Tracker::track_arc`](crate::Tracker::track_arc).
/// Tracked channels implement it on the state their halves share.
pub trait Depth {
    /// Items currently buffered.
    fn len(&self) -> usize;

    /// Maximum number of buffered items.
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn level(&self) -> Level {
        Level::new(self.len(), self.capacity())
    }
}

impl<Q> WeakHandle for Weak<Q>
where
    Q: Depth + Send + Sync + 'static,
{
    fn level(&self) -> Option<Level> {
        let queue = self.upgrade()?;
        Some(queue.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    struct Ring {
        items: Mutex<VecDeque<u32>>,
        capacity: usize,
    }

    impl Depth for Ring {
        fn len(&self) -> usize {
            self.items.lock().len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }
    }

    #[test]
    fn weak_arc_reports_custom_depth() {
        let ring = Arc::new(Ring {
            items: Mutex::new(VecDeque::from([1, 2, 3])),
            capacity: 8,
        });
        let weak = Arc::downgrade(&ring);
        assert_eq!(WeakHandle::level(&weak), Some(Level::new(3, 8)));
        drop(ring);
        assert_eq!(WeakHandle::level(&weak), None);
    }
}
