//! Run-time selection between the two primitives.

use latch_core::{LockKind, RawLock};

use crate::spin::SpinLock;
use crate::yield_lock::YieldLock;

/// Either lock primitive, chosen from a [`LockKind`].
#[derive(Debug)]
pub enum AnyLock {
    /// Busy-wait lock
    Spin(SpinLock),

    /// Yield-and-retry lock
    Yield(YieldLock),
}

impl AnyLock {
    /// Create a free lock of the given kind.
    pub fn new(kind: LockKind) -> Self {
        match kind {
            LockKind::Spin => Self::Spin(SpinLock::new()),
            LockKind::Yield => Self::Yield(YieldLock::new()),
        }
    }
}

impl Default for AnyLock {
    fn default() -> Self {
        Self::new(LockKind::default())
    }
}

impl From<SpinLock> for AnyLock {
    fn from(lock: SpinLock) -> Self {
        Self::Spin(lock)
    }
}

impl From<YieldLock> for AnyLock {
    fn from(lock: YieldLock) -> Self {
        Self::Yield(lock)
    }
}

impl RawLock for AnyLock {
    fn acquire(&self) {
        match self {
            Self::Spin(lock) => lock.acquire(),
            Self::Yield(lock) => lock.acquire(),
        }
    }

    unsafe fn release(&self) {
        // SAFETY: forwarded contract; the caller holds the lock.
        match self {
            Self::Spin(lock) => unsafe { lock.release() },
            Self::Yield(lock) => unsafe { lock.release() },
        }
    }

    fn try_lock(&self) -> bool {
        match self {
            Self::Spin(lock) => lock.try_lock(),
            Self::Yield(lock) => lock.try_lock(),
        }
    }

    fn is_locked(&self) -> bool {
        match self {
            Self::Spin(lock) => lock.is_locked(),
            Self::Yield(lock) => lock.is_locked(),
        }
    }

    fn kind(&self) -> LockKind {
        match self {
            Self::Spin(_) => LockKind::Spin,
            Self::Yield(_) => LockKind::Yield,
        }
    }
}
