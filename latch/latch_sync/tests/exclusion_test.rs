//! Integration tests for mutual exclusion.
//!
//! Every property is checked through a generic helper and then instantiated for
//! each primitive, so the two locks are held to exactly the same contract.

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::thread;

use latch_core::{LockKind, RawLock};
use latch_sync::{AnyLock, SpinLock, SpinMutex, TrackedLock, YieldLock, YieldMutex};

/// A counter whose increments are guarded only by a raw lock.
struct Guarded<L> {
    lock: L,
    count: UnsafeCell<u64>,
}

// SAFETY: `count` is only touched while `lock` is held.
unsafe impl<L: RawLock> Sync for Guarded<L> {}

impl<L: RawLock> Guarded<L> {
    fn new(lock: L) -> Self {
        Self {
            lock,
            count: UnsafeCell::new(0),
        }
    }

    fn increment(&self) {
        self.lock.acquire();
        // SAFETY: lock held.
        unsafe {
            let value = *self.count.get();
            // A separate read and write makes lost updates visible if exclusion fails.
            *self.count.get() = std::hint::black_box(value) + 1;
            self.lock.release();
        }
    }

    fn get(&self) -> u64 {
        self.lock.with_lock(|| unsafe { *self.count.get() })
    }
}

fn assert_counts_exactly<L: RawLock + 'static>(lock: L, threads: usize, ops: usize) {
    let guarded = Arc::new(Guarded::new(lock));
    let mut handles = Vec::with_capacity(threads);

    for _ in 0..threads {
        let guarded = Arc::clone(&guarded);
        handles.push(thread::spawn(move || {
            for _ in 0..ops {
                guarded.increment();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(guarded.get(), (threads * ops) as u64);
    assert!(!guarded.lock.is_locked());
}

fn assert_try_lock_exclusive_across_threads<L: RawLock + 'static>(lock: L) {
    let lock = Arc::new(lock);

    lock.acquire();
    let busy = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || lock.try_lock()).join().unwrap()
    };
    assert!(!busy, "try_lock succeeded while another thread held the lock");

    unsafe { lock.release() };
    let free = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            let acquired = lock.try_lock();
            if acquired {
                unsafe { lock.release() };
            }
            acquired
        })
        .join()
        .unwrap()
    };
    assert!(free, "try_lock failed after the holder released");
}

fn assert_no_spurious_unlock<L: RawLock>(lock: L) {
    assert!(lock.try_lock());
    for _ in 0..1000 {
        assert!(!lock.try_lock());
        assert!(lock.is_locked());
    }
    unsafe { lock.release() };
    assert!(!lock.is_locked());
}

#[test]
fn test_spin_lock_counts_exactly() {
    assert_counts_exactly(SpinLock::new(), 16, 500);
}

#[test]
fn test_yield_lock_counts_exactly() {
    assert_counts_exactly(YieldLock::new(), 16, 500);
}

#[test]
fn test_single_thread_single_op() {
    assert_counts_exactly(SpinLock::new(), 1, 1);
    assert_counts_exactly(YieldLock::new(), 1, 1);
}

#[test]
fn test_any_lock_counts_exactly() {
    for kind in LockKind::ALL {
        assert_counts_exactly(AnyLock::new(kind), 8, 250);
    }
}

#[test]
fn test_tracked_lock_counts_exactly() {
    assert_counts_exactly(TrackedLock::new(SpinLock::new()), 8, 250);
    assert_counts_exactly(TrackedLock::new(YieldLock::new()), 8, 250);
}

#[test]
fn test_try_lock_exclusive_across_threads() {
    assert_try_lock_exclusive_across_threads(SpinLock::new());
    assert_try_lock_exclusive_across_threads(YieldLock::new());
    assert_try_lock_exclusive_across_threads(TrackedLock::new(AnyLock::new(LockKind::Spin)));
}

#[test]
fn test_no_spurious_unlock() {
    assert_no_spurious_unlock(SpinLock::new());
    assert_no_spurious_unlock(YieldLock::new());
    assert_no_spurious_unlock(AnyLock::default());
}

#[test]
fn test_guarded_mutexes_count_exactly() {
    let spin = Arc::new(SpinMutex::new(0u64));
    let yielding = Arc::new(YieldMutex::new(0u64));
    let mut handles = vec![];

    for _ in 0..10 {
        let spin = Arc::clone(&spin);
        let yielding = Arc::clone(&yielding);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                *spin.lock() += 1;
                *yielding.lock() += 1;
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*spin.lock(), 1000);
    assert_eq!(*yielding.lock(), 1000);
}
