//! Lock wrapper with usage statistics.
//!
//! Counts how a lock is used without changing its behavior: every operation is
//! forwarded to the wrapped primitive.

use log::trace;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

use latch_core::{LockKind, RawLock};

/// Statistics about lock usage
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LockStats {
    /// Number of completed `acquire` calls
    pub acquisitions: usize,

    /// Number of `acquire` calls whose first attempt found the lock held
    pub contended_acquisitions: usize,

    /// Number of `try_lock` calls that acquired the lock
    pub try_lock_successes: usize,

    /// Number of `try_lock` calls that found the lock held
    pub try_lock_failures: usize,

    /// Number of `release` calls
    pub releases: usize,
}

impl LockStats {
    /// Fraction of `acquire` calls that had to wait, in `0.0..=1.0`.
    pub fn contention_ratio(&self) -> f64 {
        if self.acquisitions == 0 {
            return 0.0;
        }

        self.contended_acquisitions as f64 / self.acquisitions as f64
    }
}

/// Statistics counters for TrackedLock
#[derive(Debug, Default)]
struct TrackedLockStats {
    acquisitions: AtomicUsize,
    contended_acquisitions: AtomicUsize,
    try_lock_successes: AtomicUsize,
    try_lock_failures: AtomicUsize,
    releases: AtomicUsize,
}

/// A [`RawLock`] that records how it is used
#[derive(Debug)]
pub struct TrackedLock<L> {
    /// The underlying lock
    inner: L,

    /// Statistics about lock usage
    stats: TrackedLockStats,

    /// Name of this lock for debugging
    name: Option<String>,
}

impl<L: RawLock> TrackedLock<L> {
    /// Wrap a lock
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            stats: TrackedLockStats::default(),
            name: None,
        }
    }

    /// Wrap a lock with a name for debugging
    pub fn with_name(inner: L, name: impl Into<String>) -> Self {
        Self {
            inner,
            stats: TrackedLockStats::default(),
            name: Some(name.into()),
        }
    }

    /// Get the statistics for this lock
    pub fn stats(&self) -> LockStats {
        LockStats {
            acquisitions: self.stats.acquisitions.load(Ordering::Relaxed),
            contended_acquisitions: self.stats.contended_acquisitions.load(Ordering::Relaxed),
            try_lock_successes: self.stats.try_lock_successes.load(Ordering::Relaxed),
            try_lock_failures: self.stats.try_lock_failures.load(Ordering::Relaxed),
            releases: self.stats.releases.load(Ordering::Relaxed),
        }
    }

    /// Reset the statistics
    pub fn reset_stats(&self) {
        self.stats.acquisitions.store(0, Ordering::Relaxed);
        self.stats.contended_acquisitions.store(0, Ordering::Relaxed);
        self.stats.try_lock_successes.store(0, Ordering::Relaxed);
        self.stats.try_lock_failures.store(0, Ordering::Relaxed);
        self.stats.releases.store(0, Ordering::Relaxed);
    }

    /// Get the name of this lock
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The wrapped lock
    pub fn inner(&self) -> &L {
        &self.inner
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl<L: RawLock> RawLock for TrackedLock<L> {
    fn acquire(&self) {
        if !self.inner.try_lock() {
            self.stats
                .contended_acquisitions
                .fetch_add(1, Ordering::Relaxed);
            trace!("Lock contended: {} ({})", self.display_name(), self.kind());
            self.inner.acquire();
        }

        self.stats.acquisitions.fetch_add(1, Ordering::Relaxed);
        trace!("Lock acquired: {}", self.display_name());
    }

    unsafe fn release(&self) {
        self.stats.releases.fetch_add(1, Ordering::Relaxed);
        // SAFETY: forwarded contract; the caller holds the lock.
        unsafe { self.inner.release() };
        trace!("Lock released: {}", self.display_name());
    }

    fn try_lock(&self) -> bool {
        let acquired = self.inner.try_lock();

        if acquired {
            self.stats.try_lock_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.try_lock_failures.fetch_add(1, Ordering::Relaxed);
        }

        trace!(
            "Lock try_lock: {} (acquired: {})",
            self.display_name(),
            acquired
        );
        acquired
    }

    fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    fn kind(&self) -> LockKind {
        self.inner.kind()
    }
}
