//! The atomic "held" flag shared by every lock primitive.

use std::sync::atomic::{AtomicBool, Ordering};

/// A boolean that is either free (`false`) or held (`true`).
///
/// The free-to-held transition is a single compare-exchange, so two threads
/// can never both observe "free" and both proceed. A load followed by a store
/// would leave a window between the two in which another thread can slip in.
#[derive(Debug, Default)]
pub struct HeldFlag {
    held: AtomicBool,
}

impl HeldFlag {
    /// Create a flag in the free state.
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Transition free to held.
    ///
    /// Returns true iff this call performed the transition. Never fails
    /// spuriously: a `false` result means the flag was observed held.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Like [`try_acquire`](Self::try_acquire) but may fail spuriously.
    ///
    /// Only suitable inside a retry loop.
    #[inline]
    pub fn try_acquire_weak(&self) -> bool {
        self.held
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Transition held to free, publishing every write made while held.
    #[inline]
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// Current state, possibly stale.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_free() {
        let flag = HeldFlag::new();
        assert!(!flag.is_held());
    }

    #[test]
    fn test_try_acquire_is_exclusive() {
        let flag = HeldFlag::new();
        assert!(flag.try_acquire());
        assert!(flag.is_held());
        assert!(!flag.try_acquire());

        flag.release();
        assert!(!flag.is_held());
        assert!(flag.try_acquire());
    }

    #[test]
    fn test_weak_acquire_eventually_succeeds() {
        let flag = HeldFlag::new();
        while !flag.try_acquire_weak() {}
        assert!(flag.is_held());
        assert!(!flag.try_acquire_weak());
    }
}
