//! Data types shared across the Latch crates.

pub mod lock_kind;
pub mod probe;

pub use lock_kind::LockKind;
pub use probe::ProbeAttempt;
