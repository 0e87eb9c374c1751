//! Instrumentation hooks for the parallel passes.
//!
//! Counters are injected into each pass rather than kept in global state, so
//! concurrent runs never share tallies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Receives decomposition events from a running pass.
///
/// Implementations are called concurrently from worker threads.
pub trait SplitObserver: Sync {
    /// A range was split into two halves.
    fn on_split(&self);

    /// A range of `len` points was processed sequentially.
    fn on_leaf(&self, len: usize);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SplitObserver for NoopObserver {
    #[inline]
    fn on_split(&self) {}

    #[inline]
    fn on_leaf(&self, _len: usize) {}
}

/// Counts splits, leaves and points visited.
#[derive(Debug, Default)]
pub struct SplitCounter {
    splits: AtomicU64,
    leaves: AtomicU64,
    points: AtomicU64,
}

impl SplitCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of range splits (forked tasks).
    pub fn splits(&self) -> u64 {
        self.splits.load(Ordering::Relaxed)
    }

    /// Number of sequential leaf ranges.
    pub fn leaves(&self) -> u64 {
        self.leaves.load(Ordering::Relaxed)
    }

    /// Total points visited by leaves.
    pub fn points(&self) -> u64 {
        self.points.load(Ordering::Relaxed)
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.splits.store(0, Ordering::Relaxed);
        self.leaves.store(0, Ordering::Relaxed);
        self.points.store(0, Ordering::Relaxed);
    }
}

impl SplitObserver for SplitCounter {
    fn on_split(&self) {
        self.splits.fetch_add(1, Ordering::Relaxed);
    }

    fn on_leaf(&self, len: usize) {
        self.leaves.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(len as u64, Ordering::Relaxed);
    }
}

/// A profiling scope that measures elapsed wall-clock time.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Elapsed time since the scope was opened.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        tracing::trace!(scope = self.name, elapsed_ms = self.elapsed_ms(), "scope closed");
    }
}
