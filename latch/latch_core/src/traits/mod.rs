//! Core trait definitions.
//!
//! - **lock**: The raw mutual-exclusion contract shared by every primitive

pub mod lock;

pub use lock::RawLock;
