use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use brim_types::{QueueId, Report};
use parking_lot::RwLock;

use crate::sweeper::Sweeper;
use crate::{Config, Depth, Registry, Sampler, Source, WeakHandle};

static GLOBAL: LazyLock<Tracker> = LazyLock::new(|| Tracker::with_config(Config::from_env()));

/// Tracking state: id counter, registry, and the sweeper that cleans it.
///
/// Cloning is cheap and every clone shares the same state. Most code uses
/// [`Tracker::global`]; tests and embedders that want isolation build their
/// own.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    config: Config,
    next_id: AtomicU64,
    // Swapped wholesale by `reset`; sweeps hold the generation they came from.
    registry: RwLock<Arc<Registry>>,
    sweeper: Sweeper,
}

impl Tracker {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let sweeper = Sweeper::new(config.sweeper_thread_name.clone());
        Self {
            inner: Arc::new(TrackerInner {
                config,
                next_id: AtomicU64::new(0),
                registry: RwLock::new(Arc::new(Registry::new())),
                sweeper,
            }),
        }
    }

    /// Process-wide tracker, configured from the environment on first use.
    pub fn global() -> &'static Tracker {
        &GLOBAL
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Starts tracking the queue behind `handle`.
    ///
    /// Renders `source` on the calling thread, so call this from the frame
    /// that constructed the queue. Returns `None` when tracking is disabled.
    pub fn track(&self, handle: impl WeakHandle, source: Source) -> Option<QueueId> {
        if !self.is_enabled() {
            return None;
        }
        let call_site = source.render();
        // An exhausted id space stops tracking rather than reusing ids.
        let last = self
            .inner
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .ok()?;
        let id = QueueId::new(last + 1)?;
        let capacity = handle.level().map_or(0, |level| level.capacity);
        tracing::debug!(%id, call_site = %call_site, capacity, "tracking queue");
        self.registry().insert(id, Sampler::new(call_site, handle));
        Some(id)
    }

    /// Tracks an application queue shared through an `Arc`.
    ///
    /// Queues without a buffer are not tracked.
    pub fn track_arc<Q>(&self, queue: &Arc<Q>, source: Source) -> Option<QueueId>
    where
        Q: Depth + Send + Sync + 'static,
    {
        if queue.capacity() == 0 {
            return None;
        }
        self.track(Arc::downgrade(queue), source)
    }

    /// Reads every tracked queue and returns the reports sorted by call site.
    ///
    /// Queues found dead produce no report; their entries are handed to the
    /// sweeper and removed in the background.
    pub fn sample(&self) -> Vec<Report> {
        let registry = self.registry();
        let mut reports = Vec::new();
        let mut garbage = Vec::new();
        for (id, sampler) in registry.entries() {
            match sampler.report() {
                Some(report) => reports.push(report),
                None => garbage.push(id),
            }
        }
        reports.sort_by(|a, b| a.call_site.cmp(&b.call_site));
        tracing::trace!(reports = reports.len(), garbage = garbage.len(), "sampled queues");

        if !garbage.is_empty() {
            self.inner.sweeper.submit(&registry, garbage);
        }
        reports
    }

    /// Registry entries, including dead ones that have not been swept yet.
    pub fn tracked(&self) -> usize {
        self.registry().len()
    }

    /// Sweep batches waiting for the background worker.
    pub fn pending_sweeps(&self) -> usize {
        self.inner.sweeper.pending()
    }

    /// Forgets every entry and restarts ids at 1.
    ///
    /// Meant for tests and teardown. Sweeps still queued for the previous
    /// registry never touch the new one.
    pub fn reset(&self) {
        let mut registry = self.inner.registry.write();
        *registry = Arc::new(Registry::new());
        self.inner.next_id.store(0, Ordering::Relaxed);
    }

    fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry.read())
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("enabled", &self.is_enabled())
            .field("tracked", &self.tracked())
            .field("pending_sweeps", &self.pending_sweeps())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brim_types::Level;
    use std::sync::atomic::AtomicBool;
    use std::sync::Barrier;
    use std::time::{Duration, Instant};

    struct Gauge {
        alive: Arc<AtomicBool>,
        level: Level,
    }

    impl WeakHandle for Gauge {
        fn level(&self) -> Option<Level> {
            self.alive.load(Ordering::Acquire).then_some(self.level)
        }
    }

    fn gauge(len: usize, capacity: usize) -> (Arc<AtomicBool>, Gauge) {
        let alive = Arc::new(AtomicBool::new(true));
        let gauge = Gauge {
            alive: Arc::clone(&alive),
            level: Level::new(len, capacity),
        };
        (alive, gauge)
    }

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn sample_is_sorted_by_call_site() {
        let tracker = Tracker::new();
        let mut keep = Vec::new();
        for (function, line) in [("app::zeta", 3), ("app::alpha", 9), ("app::mid", 1)] {
            let (alive, handle) = gauge(1, 4);
            keep.push(alive);
            tracker.track(handle, Source::new(function, "src/lib.rs", line));
        }
        let sites: Vec<String> = tracker.sample().into_iter().map(|r| r.call_site).collect();
        assert_eq!(
            sites,
            ["app::alpha lib.rs:9", "app::mid lib.rs:1", "app::zeta lib.rs:3"]
        );
    }

    #[test]
    fn dead_queue_produces_no_report_and_is_swept() {
        let tracker = Tracker::new();
        let (alive_a, a) = gauge(2, 10);
        let (_alive_b, b) = gauge(0, 5);
        tracker.track(a, Source::new("app::a", "a.rs", 1));
        tracker.track(b, Source::new("app::b", "b.rs", 1));
        assert_eq!(tracker.sample().len(), 2);

        alive_a.store(false, Ordering::Release);
        let reports = tracker.sample();
        assert_eq!(reports, vec![Report::new("app::b b.rs:1", Level::new(0, 5))]);

        wait_until(|| tracker.tracked() == 1);
        wait_until(|| tracker.pending_sweeps() == 0);
        assert_eq!(tracker.sample().len(), 1);
    }

    #[test]
    fn dead_entries_stay_until_sampled() {
        let tracker = Tracker::new();
        let (alive, handle) = gauge(0, 1);
        tracker.track(handle, Source::new("app::a", "a.rs", 1));
        alive.store(false, Ordering::Release);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(tracker.tracked(), 1);

        assert!(tracker.sample().is_empty());
        wait_until(|| tracker.tracked() == 0);
    }

    #[test]
    fn ids_are_never_reused() {
        let tracker = Tracker::new();
        let mut seen = Vec::new();
        for round in 0..5 {
            let (alive, handle) = gauge(0, 1);
            let id = tracker
                .track(handle, Source::new("app::loop", "a.rs", round + 1))
                .expect("tracking is enabled");
            seen.push(id);
            alive.store(false, Ordering::Release);
            tracker.sample();
            wait_until(|| tracker.tracked() == 0);
        }
        let raw: Vec<u64> = seen.iter().map(|id| id.get()).collect();
        assert_eq!(raw, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn exhausted_ids_stop_tracking() {
        let tracker = Tracker::new();
        tracker.inner.next_id.store(u64::MAX - 1, Ordering::Relaxed);

        let (_first_alive, first) = gauge(0, 1);
        let id = tracker.track(first, Source::new("app::a", "a.rs", 1));
        assert_eq!(id.map(QueueId::get), Some(u64::MAX));

        let (_second_alive, second) = gauge(0, 1);
        assert_eq!(tracker.track(second, Source::new("app::a", "a.rs", 2)), None);
        assert_eq!(tracker.tracked(), 1);
    }

    #[test]
    fn concurrent_registration_yields_distinct_ids() {
        const THREADS: usize = 16;
        let tracker = Tracker::new();
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|n| {
                let tracker = tracker.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let (alive, handle) = gauge(n, THREADS);
                    barrier.wait();
                    let source = Source::new("app::worker", "w.rs", n as u32 + 1);
                    let id = tracker.track(handle, source);
                    (id, alive)
                })
            })
            .collect();

        let mut alive = Vec::new();
        let mut ids = Vec::new();
        for handle in handles {
            let (id, flag) = handle.join().expect("worker thread panicked");
            ids.push(id.expect("tracking is enabled").get());
            alive.push(flag);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), THREADS);

        let reports = tracker.sample();
        assert_eq!(reports.len(), THREADS);
        for report in &reports {
            let line: usize = report
                .call_site
                .rsplit(':')
                .next()
                .and_then(|line| line.parse().ok())
                .expect("call site ends with a line number");
            assert_eq!(report.len, line - 1);
            assert_eq!(report.capacity, THREADS);
        }
    }

    #[test]
    fn sampling_while_registering_never_duplicates() {
        let tracker = Tracker::new();
        let writer = {
            let tracker = tracker.clone();
            std::thread::spawn(move || {
                let mut alive = Vec::new();
                for n in 0..500u32 {
                    let (flag, handle) = gauge(0, 1);
                    tracker.track(handle, Source::new("app::w", "w.rs", n + 1));
                    alive.push(flag);
                }
                alive
            })
        };
        for _ in 0..50 {
            let reports = tracker.sample();
            let mut sites: Vec<&str> = reports.iter().map(|r| r.call_site.as_str()).collect();
            let before = sites.len();
            sites.dedup();
            assert_eq!(sites.len(), before);
        }
        let _alive = writer.join().expect("writer thread panicked");
        assert_eq!(tracker.sample().len(), 500);
    }

    #[test]
    fn reset_retires_pending_sweeps() {
        let tracker = Tracker::new();
        let (alive, handle) = gauge(0, 1);
        tracker.track(handle, Source::new("app::old", "a.rs", 1));
        alive.store(false, Ordering::Release);
        tracker.sample();
        tracker.reset();

        let (_fresh_alive, fresh) = gauge(1, 2);
        let id = tracker.track(fresh, Source::new("app::new", "a.rs", 2));
        assert_eq!(id.map(QueueId::get), Some(1));

        wait_until(|| tracker.pending_sweeps() == 0);
        assert_eq!(tracker.tracked(), 1);
        assert_eq!(
            tracker.sample(),
            vec![Report::new("app::new a.rs:2", Level::new(1, 2))]
        );
    }

    #[test]
    fn disabled_tracker_ignores_registrations() {
        let tracker = Tracker::with_config(Config::disabled());
        let (_alive, handle) = gauge(1, 1);
        assert_eq!(tracker.track(handle, Source::new("app::a", "a.rs", 1)), None);
        assert_eq!(tracker.tracked(), 0);
        assert!(tracker.sample().is_empty());
    }

    #[test]
    fn track_arc_skips_unbuffered_queues() {
        struct Fixed(usize);
        impl Depth for Fixed {
            fn len(&self) -> usize {
                0
            }
            fn capacity(&self) -> usize {
                self.0
            }
        }

        let tracker = Tracker::new();
        let unbuffered = Arc::new(Fixed(0));
        let buffered = Arc::new(Fixed(3));
        assert_eq!(tracker.track_arc(&unbuffered, Source::new("app::a", "a.rs", 1)), None);
        assert!(tracker.track_arc(&buffered, Source::new("app::a", "a.rs", 2)).is_some());
        assert_eq!(
            tracker.sample(),
            vec![Report::new("app::a a.rs:2", Level::new(0, 3))]
        );

        drop(buffered);
        assert!(tracker.sample().is_empty());
    }
}
