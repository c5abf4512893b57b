//! The raw lock contract.
//!
//! A raw lock protects no data of its own. It owns a single "held" state and
//! offers three operations on it: a blocking acquire, a non-blocking attempt,
//! and a release. Which thread holds the lock is not tracked, so releasing is
//! only sound when the caller is the current holder.

use crate::types::LockKind;

/// Core trait for mutual-exclusion primitives.
///
/// Implementations must guarantee that at most one caller at a time observes
/// a successful free-to-held transition, whether through [`acquire`] or
/// [`try_lock`]. Neither operation supports timeouts or cancellation.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use latch_core::{LockKind, RawLock};
///
/// struct FlagLock(AtomicBool);
///
/// impl RawLock for FlagLock {
///     fn acquire(&self) {
///         while !self.try_lock() {
///             std::hint::spin_loop();
///         }
///     }
///
///     unsafe fn release(&self) {
///         self.0.store(false, Ordering::Release);
///     }
///
///     fn try_lock(&self) -> bool {
///         self.0
///             .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
///             .is_ok()
///     }
///
///     fn is_locked(&self) -> bool {
///         self.0.load(Ordering::Relaxed)
///     }
///
///     fn kind(&self) -> LockKind {
///         LockKind::Spin
///     }
/// }
///
/// let lock = FlagLock(AtomicBool::new(false));
/// let answer = lock.with_lock(|| 42);
/// assert_eq!(answer, 42);
/// assert!(!lock.is_locked());
/// ```
///
/// [`acquire`]: RawLock::acquire
/// [`try_lock`]: RawLock::try_lock
pub trait RawLock: Send + Sync {
    /// Block until the lock transitions from free to held on behalf of the caller.
    fn acquire(&self);

    /// Transition the lock from held to free.
    ///
    /// # Safety
    ///
    /// The caller must currently hold the lock, either through [`acquire`] or a
    /// successful [`try_lock`]. Releasing from any other thread, or releasing
    /// twice, breaks mutual exclusion without any error being reported.
    ///
    /// [`acquire`]: RawLock::acquire
    /// [`try_lock`]: RawLock::try_lock
    unsafe fn release(&self);

    /// Attempt a single free-to-held transition.
    ///
    /// Returns `true` iff the caller now holds the lock. Never retries.
    fn try_lock(&self) -> bool;

    /// Whether the lock is currently held by anyone.
    ///
    /// The answer may be stale by the time the caller looks at it; it is only
    /// meant for diagnostics and tests.
    fn is_locked(&self) -> bool;

    /// Which primitive backs this lock.
    fn kind(&self) -> LockKind;

    /// Run `f` with the lock held, releasing it afterwards even if `f` panics.
    fn with_lock<R, F>(&self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        struct Release<'a, L: RawLock>(&'a L);

        impl<L: RawLock> Drop for Release<'_, L> {
            fn drop(&mut self) {
                // SAFETY: constructed only after `acquire` returned below.
                unsafe { self.0.release() }
            }
        }

        self.acquire();
        let _release = Release(self);
        f()
    }
}

impl<L: RawLock + ?Sized> RawLock for std::sync::Arc<L> {
    fn acquire(&self) {
        (**self).acquire()
    }

    unsafe fn release(&self) {
        // SAFETY: forwarded contract; the caller holds the inner lock.
        unsafe { (**self).release() }
    }

    fn try_lock(&self) -> bool {
        (**self).try_lock()
    }

    fn is_locked(&self) -> bool {
        (**self).is_locked()
    }

    fn kind(&self) -> LockKind {
        (**self).kind()
    }
}
