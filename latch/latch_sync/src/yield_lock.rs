//! Yield-and-retry lock.
//!
//! Exclusion comes from the same atomic exchange as [`SpinLock`], but a
//! contended `acquire` hands the processor back to the scheduler after each
//! failed attempt instead of spinning on it. The thread is rescheduled like
//! any other runnable thread and retries then; there is no wait queue, so
//! waiters are not woken in any particular order.
//!
//! [`SpinLock`]: crate::SpinLock

use std::thread;

use latch_core::{LockKind, RawLock};

use crate::flag::HeldFlag;

/// A lock that yields the processor while contended.
#[derive(Debug, Default)]
pub struct YieldLock {
    flag: HeldFlag,
}

impl YieldLock {
    /// Create a new, free lock.
    pub const fn new() -> Self {
        Self {
            flag: HeldFlag::new(),
        }
    }

    /// Acquire the lock, yielding between attempts.
    pub fn acquire(&self) {
        while !self.flag.try_acquire_weak() {
            thread::yield_now();
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

impl RawLock for YieldLock {
    fn acquire(&self) {
        YieldLock::acquire(self)
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
        LockKind::Yield
    }
}

// SAFETY: `HeldFlag` admits one holder at a time with acquire/release ordering.
unsafe impl lock_api::RawMutex for YieldLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = YieldLock::new();

    type GuardMarker = lock_api::GuardSend;

    fn lock(&self) {
        YieldLock::acquire(self)
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
    use crate::YieldMutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_yield_lock_try_lock() {
        let lock = YieldLock::new();

        assert!(lock.try_lock());
        assert!(!lock.try_lock());

        unsafe { lock.release() };
        assert!(lock.try_lock());
        unsafe { lock.release() };
    }

    #[test]
    fn test_yield_lock_waiter_blocks_until_release() {
        let lock = Arc::new(YieldLock::new());
        lock.acquire();

        let waiter = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.acquire();
                let held = lock.is_locked();
                unsafe { lock.release() };
                held
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        unsafe { lock.release() };
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_yield_mutex_guards_data() {
        let mutex = Arc::new(YieldMutex::new(Vec::new()));
        let mut handles = vec![];

        for id in 0..4 {
            let mutex = Arc::clone(&mutex);
            handles.push(thread::spawn(move || {
                for n in 0..50 {
                    mutex.lock().push(id * 100 + n);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut values = mutex.lock().clone();
        values.sort_unstable();
        let expected: Vec<i32> = (0..4)
            .flat_map(|id| (0..50).map(move |n| id * 100 + n))
            .collect();
        assert_eq!(values, expected);
    }
}
