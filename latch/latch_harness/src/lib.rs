#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Latch Harness
//!
//! Verification scenarios for Latch lock primitives.
//!
//! - [`stress`]: many threads hammering one lock-guarded counter, checked for
//!   lost updates
//! - [`handshake`]: a holder and a prober thread, sequenced through a
//!   [`phase::PhaseGate`], checking `try_lock` while the lock is held and again
//!   after it is released
//! - [`runner`]: drives both scenarios from a [`HarnessConfig`] against the
//!   configured primitive
//!
//! Every scenario reports wrong outcomes as [`HarnessError`](latch_core::HarnessError)
//! values instead of panicking, so a failed check ends the current run only.

pub mod config;
pub mod handshake;
pub mod phase;
pub mod runner;
pub mod stress;
mod threads;
pub mod workload;

pub use config::{ConfigOverrides, HarnessConfig};
pub use handshake::{run_handshake, HandshakeEvent, HandshakeReport};
pub use phase::{Phase, PhaseGate};
pub use runner::{Runner, StressRun, SuiteReport};
pub use stress::{run_stress, StressConfig, StressReport, TrialOutcome};
