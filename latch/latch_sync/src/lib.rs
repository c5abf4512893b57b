#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Latch Sync
//!
//! Mutual-exclusion primitives built on a single atomic "held" flag.
//!
//! - [`SpinLock`]: busy-waits on an atomic compare-exchange, never suspends
//! - [`YieldLock`]: retries the same exchange but yields to the scheduler
//!   between attempts
//! - [`AnyLock`]: either of the above, chosen at run time from a
//!   [`LockKind`](latch_core::LockKind)
//! - [`TrackedLock`]: wraps any [`RawLock`](latch_core::RawLock) and counts
//!   acquisitions, contention and `try_lock` outcomes
//!
//! Both primitives also implement [`lock_api::RawMutex`], so they can guard
//! data directly through [`SpinMutex`] and [`YieldMutex`].

pub mod any;
pub mod flag;
pub mod spin;
pub mod tracked;
pub mod yield_lock;

pub use any::AnyLock;
pub use flag::HeldFlag;
pub use spin::SpinLock;
pub use tracked::{LockStats, TrackedLock};
pub use yield_lock::YieldLock;

/// A data-guarding mutex backed by [`SpinLock`].
pub type SpinMutex<T> = lock_api::Mutex<SpinLock, T>;

/// A data-guarding mutex backed by [`YieldLock`].
pub type YieldMutex<T> = lock_api::Mutex<YieldLock, T>;
