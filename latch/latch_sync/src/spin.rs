//! Busy-wait lock.
//!
//! The calling thread never leaves the processor while it waits: `acquire`
//! keeps retrying the atomic exchange until it wins. This keeps hand-off
//! latency minimal, at the cost of burning a core for as long as the lock
//! stays contended. There is no backoff and no fairness among waiters.

use std::hint;

use latch_core::{LockKind, RawLock};

use crate::flag::HeldFlag;

/// A lock-free busy-wait lock.
#[derive(Debug, Default)]
pub struct SpinLock {
    flag: HeldFlag,
}

impl SpinLock {
    /// Create a new, free spinlock.
    pub const fn new() -> Self {
        Self {
            flag: HeldFlag::new(),
        }
    }

    /// Spin until the lock is acquired.
    pub fn acquire(&self) {
        while !self.flag.try_acquire_weak() {
            // Wait on plain loads until the flag reads free, so contended
            // waiters do not keep stealing the cache line with failed exchanges.
            while self.flag.is_held() {
                hint::spin_loop();
            }
        }
    }

    /// Try to acquire the lock once.
    pub fn try_lock(&self) -> bool {
        self.flag.try_acquire()
    }

    /// Release the lock.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock.
    pub unsafe fn release(&self) {
        self.flag.release();
    }

    /// Whether the lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.flag.is_held()
    }
}

impl RawLock for SpinLock {
    fn acquire(&self) {
        SpinLock::acquire(self)
    }

    unsafe fn release(&self) {
        self.flag.release();
    }

    fn try_lock(&self) -> bool {
        self.flag.try_acquire()
    }

    fn is_locked(&self) -> bool {
        self.flag.is_held()
    }

    fn kind(&self) -> LockKind {
        LockKind::Spin
    }
}

// SAFETY: `HeldFlag` admits one holder at a time with acquire/release ordering.
unsafe impl lock_api::RawMutex for SpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = SpinLock::new();

    type GuardMarker = lock_api::GuardSend;

    fn lock(&self) {
        SpinLock::acquire(self)
    }

    fn try_lock(&self) -> bool {
        self.flag.try_acquire()
    }

    unsafe fn unlock(&self) {
        self.flag.release();
    }

    fn is_locked(&self) -> bool {
        self.flag.is_held()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpinMutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_spinlock_try_lock() {
        let lock = SpinLock::new();

        // First attempt should succeed
        assert!(lock.try_lock());
        assert!(lock.is_locked());

        // Second attempt should fail while held
        assert!(!lock.try_lock());

        unsafe { lock.release() };
        assert!(!lock.is_locked());

        // Free again
        assert!(lock.try_lock());
        unsafe { lock.release() };
    }

    #[test]
    fn test_spinlock_acquire_uncontended() {
        let lock = SpinLock::new();
        lock.acquire();
        assert!(lock.is_locked());
        unsafe { lock.release() };
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_spinlock_waits_for_release() {
        let lock = Arc::new(SpinLock::new());
        lock.acquire();

        let waiter = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.acquire();
                unsafe { lock.release() };
            })
        };

        // The waiter cannot finish while we hold the lock
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!waiter.is_finished());

        unsafe { lock.release() };
        waiter.join().unwrap();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_spin_mutex_guards_data() {
        let mutex = Arc::new(SpinMutex::new(0u64));
        let threads = 8;
        let iterations = 500;

        let mut handles = vec![];
        for _ in 0..threads {
            let mutex = Arc::clone(&mutex);
            handles.push(thread::spawn(move || {
                for _ in 0..iterations {
                    *mutex.lock() += 1;
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*mutex.lock(), threads * iterations);
        assert!(!mutex.is_locked());
    }
}
