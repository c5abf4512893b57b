//! Two-thread handshake that checks `try_lock` against a held lock.
//!
//! A holder thread and a prober thread share one lock and one
//! [`PhaseGate`]. The run imposes the total order
//!
//! 1. holder acquires the lock, then publishes [`Phase::LockAcquired`]
//! 2. prober calls `try_lock` (a correct lock refuses), then publishes
//!    [`Phase::ProbeAttempted`]
//! 3. holder runs the prime workload, releases, then publishes
//!    [`Phase::LockReleased`]
//! 4. prober calls `try_lock` again (a correct lock grants it) and releases
//!
//! The prober always publishes its transition, whatever the probe returned,
//! so a misbehaving lock produces a [`HarnessError::ProbeMismatch`] rather
//! than a hang.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use latch_core::{HarnessError, LockKind, ProbeAttempt, RawLock};

use crate::phase::{Phase, PhaseGate};
use crate::threads::{join, spawn_named};
use crate::workload::nth_prime;

/// Something observable one of the participants did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HandshakeEvent {
    /// The holder owns the lock
    HolderAcquired,

    /// The prober attempted a non-blocking acquisition
    Probe {
        /// Which of the two probes this was
        attempt: ProbeAttempt,

        /// What `try_lock` returned
        acquired: bool,
    },

    /// The holder released the lock
    HolderReleased,
}

impl fmt::Display for HandshakeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HolderAcquired => f.write_str("holder-acquired"),
            Self::Probe { attempt, acquired } => write!(f, "{attempt}-probe:{acquired}"),
            Self::HolderReleased => f.write_str("holder-released"),
        }
    }
}

/// State shared by the holder and the prober for one run.
struct HandshakeContext<L> {
    lock: L,
    gate: PhaseGate,
    prime_n: u64,
}

/// Moves the gate to its final phase if the owning participant unwinds, so
/// the other participant never waits for a transition that will not come.
struct UnblockOnPanic<'a>(&'a PhaseGate);

impl Drop for UnblockOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.release_all();
        }
    }
}

/// Outcome of one handshake run.
#[derive(Debug, Clone, Serialize)]
pub struct HandshakeReport {
    /// Primitive under test
    pub lock: LockKind,

    /// Result of the probe made while the holder owned the lock
    pub first_probe: bool,

    /// Result of the probe made after the holder released
    pub second_probe: bool,

    /// Workload knob used by the holder
    pub prime_n: u64,

    /// The holder's workload result
    pub nth_prime: u64,

    /// Events in the order they were recorded
    pub events: Vec<HandshakeEvent>,

    /// Wall time from spawning the participants to joining both
    pub elapsed: Duration,
}

impl HandshakeReport {
    /// The event log of a run against a correct lock.
    pub fn expected_events() -> [HandshakeEvent; 4] {
        [
            HandshakeEvent::HolderAcquired,
            HandshakeEvent::Probe {
                attempt: ProbeAttempt::First,
                acquired: ProbeAttempt::First.expected(),
            },
            HandshakeEvent::HolderReleased,
            HandshakeEvent::Probe {
                attempt: ProbeAttempt::Second,
                acquired: ProbeAttempt::Second.expected(),
            },
        ]
    }

    /// Check both probe results, then the event order.
    pub fn verify(&self) -> Result<(), HarnessError> {
        for (probe, observed) in [
            (ProbeAttempt::First, self.first_probe),
            (ProbeAttempt::Second, self.second_probe),
        ] {
            if observed != probe.expected() {
                return Err(HarnessError::ProbeMismatch {
                    probe,
                    expected: probe.expected(),
                    observed,
                });
            }
        }

        let expected = Self::expected_events();
        if self.events.as_slice() != expected.as_slice() {
            return Err(HarnessError::EventOrder {
                expected: join_events(&expected),
                observed: join_events(&self.events),
            });
        }
        Ok(())
    }
}

impl fmt::Display for HandshakeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "handshake ({} lock)", self.lock)?;
        writeln!(f, "  first probe:  try_lock() = {}", self.first_probe)?;
        writeln!(f, "  second probe: try_lock() = {}", self.second_probe)?;
        writeln!(f, "  prime #{} = {}", self.prime_n, self.nth_prime)?;
        writeln!(f, "  events: {}", join_events(&self.events))?;
        write!(f, "  elapsed: {:.3?}", self.elapsed)
    }
}

fn join_events(events: &[HandshakeEvent]) -> String {
    events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run one handshake against `lock` and verify the outcome.
///
/// `lock` must be free on entry. Pass an `Arc` to keep using the lock (or its
/// statistics) afterwards. A lock that never grants or never refuses yields
/// a [`HarnessError::ProbeMismatch`]. A participant that panics is reported as
/// [`HarnessError::ThreadPanicked`] once the other one has finished. A lock
/// whose `acquire` never returns hangs the run, since no wait has a timeout.
pub fn run_handshake<L>(lock: L, prime_n: u64) -> Result<HandshakeReport, HarnessError>
where
    L: RawLock + 'static,
{
    let kind = lock.kind();
    let ctx = Arc::new(HandshakeContext {
        lock,
        gate: PhaseGate::new(),
        prime_n,
    });
    let started = Instant::now();

    let prober = {
        let ctx = Arc::clone(&ctx);
        spawn_named("latch-prober".to_string(), move || probe(&ctx))?
    };

    let holder = {
        let ctx = Arc::clone(&ctx);
        spawn_named("latch-holder".to_string(), move || hold(&ctx))
    };
    let holder = match holder {
        Ok(handle) => handle,
        Err(e) => {
            // Let the prober run through its probes on the free lock and exit.
            ctx.gate.release_all();
            let _ = join(prober);
            return Err(e);
        }
    };

    let holder_result = join(holder);
    let prober_result = join(prober);
    let nth_prime = holder_result?;
    let (first_probe, second_probe) = prober_result?;

    let report = HandshakeReport {
        lock: kind,
        first_probe,
        second_probe,
        prime_n,
        nth_prime,
        events: ctx.gate.events(),
        elapsed: started.elapsed(),
    };

    if let Err(e) = report.verify() {
        warn!("Handshake on {} lock failed: {}", kind, e);
        return Err(e);
    }
    info!(
        "Handshake on {} lock passed in {:.3?} (prime #{} = {})",
        kind, report.elapsed, prime_n, report.nth_prime
    );
    Ok(report)
}

fn hold<L: RawLock>(ctx: &HandshakeContext<L>) -> u64 {
    let _unblock = UnblockOnPanic(&ctx.gate);
    ctx.lock.acquire();
    debug!("Holder acquired the lock");
    ctx.gate.advance(Phase::LockAcquired, HandshakeEvent::HolderAcquired);

    ctx.gate.wait_for(Phase::ProbeAttempted);
    let prime = nth_prime(ctx.prime_n);

    // SAFETY: acquired at the top of this function, on this thread.
    unsafe { ctx.lock.release() };
    debug!("Holder released the lock");
    ctx.gate.advance(Phase::LockReleased, HandshakeEvent::HolderReleased);
    prime
}

fn probe<L: RawLock>(ctx: &HandshakeContext<L>) -> (bool, bool) {
    let _unblock = UnblockOnPanic(&ctx.gate);
    ctx.gate.wait_for(Phase::LockAcquired);
    let first = ctx.lock.try_lock();
    debug!("First probe: try_lock() = {}", first);
    if first {
        warn!("First probe acquired a lock the holder owns; releasing it");
        // SAFETY: the successful try_lock above made this thread the holder.
        unsafe { ctx.lock.release() };
    }
    ctx.gate.advance(
        Phase::ProbeAttempted,
        HandshakeEvent::Probe {
            attempt: ProbeAttempt::First,
            acquired: first,
        },
    );

    ctx.gate.wait_for(Phase::LockReleased);
    let second = ctx.lock.try_lock();
    debug!("Second probe: try_lock() = {}", second);
    ctx.gate.record(HandshakeEvent::Probe {
        attempt: ProbeAttempt::Second,
        acquired: second,
    });
    if second {
        // SAFETY: the successful try_lock above made this thread the holder.
        unsafe { ctx.lock.release() };
    }
    (first, second)
}
