//! Phase sequencing for the handshake.
//!
//! One mutex protects the current [`Phase`] together with the event log, and
//! one condition variable is notified on every transition. A waiter locks the
//! mutex, checks the phase, and only then waits; `Condvar::wait` releases the
//! mutex and suspends the thread as a single step, and reacquires it before
//! returning. The phase is rechecked after every wakeup, so a notification
//! sent before the waiter arrived is never needed and a spurious wakeup never
//! lets a waiter through early.

use parking_lot::{Condvar, Mutex};
use std::fmt;

use crate::handshake::HandshakeEvent;

/// Handshake checkpoints, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Neither thread has done anything observable yet
    Start,

    /// The holder owns the lock
    LockAcquired,

    /// The prober made its first `try_lock` attempt
    ProbeAttempted,

    /// The holder released the lock
    LockReleased,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::LockAcquired => "lock-acquired",
            Self::ProbeAttempted => "probe-attempted",
            Self::LockReleased => "lock-released",
        };
        f.write_str(name)
    }
}

/// State protected by the gate mutex
#[derive(Debug)]
struct GateState {
    phase: Phase,
    events: Vec<HandshakeEvent>,
}

/// A phase variable with blocking waits.
#[derive(Debug)]
pub struct PhaseGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl PhaseGate {
    /// Create a gate at [`Phase::Start`] with an empty event log.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                phase: Phase::Start,
                events: Vec::new(),
            }),
            changed: Condvar::new(),
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Move to `next` and record `event`, then wake every waiter.
    ///
    /// Phases never move backwards; advancing to a phase at or before the
    /// current one only records the event.
    pub fn advance(&self, next: Phase, event: HandshakeEvent) {
        {
            let mut state = self.state.lock();
            if next > state.phase {
                state.phase = next;
            }
            state.events.push(event);
        }
        // Notify after unlocking so woken waiters do not immediately block on the mutex.
        self.changed.notify_all();
    }

    /// Record `event` without changing the phase.
    pub fn record(&self, event: HandshakeEvent) {
        self.state.lock().events.push(event);
    }

    /// Block until the phase is at least `target`.
    ///
    /// Returns immediately if it already is. Waits without a timeout.
    pub fn wait_for(&self, target: Phase) {
        let mut state = self.state.lock();
        while state.phase < target {
            self.changed.wait(&mut state);
        }
    }

    /// Jump straight to [`Phase::LockReleased`] without recording an event.
    ///
    /// Used when one participant could not be started or panicked, so that the
    /// other runs to completion instead of waiting forever.
    pub fn release_all(&self) {
        self.state.lock().phase = Phase::LockReleased;
        self.changed.notify_all();
    }

    /// A copy of the events recorded so far, in recording order.
    pub fn events(&self) -> Vec<HandshakeEvent> {
        self.state.lock().events.clone()
    }
}

impl Default for PhaseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Start < Phase::LockAcquired);
        assert!(Phase::LockAcquired < Phase::ProbeAttempted);
        assert!(Phase::ProbeAttempted < Phase::LockReleased);
    }

    #[test]
    fn test_wait_returns_when_already_reached() {
        // The notification fired before anyone waited; the phase alone lets us through.
        let gate = PhaseGate::new();
        gate.advance(Phase::LockAcquired, HandshakeEvent::HolderAcquired);
        gate.wait_for(Phase::LockAcquired);
        gate.wait_for(Phase::Start);
        assert_eq!(gate.phase(), Phase::LockAcquired);
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let gate = PhaseGate::new();
        gate.advance(Phase::LockReleased, HandshakeEvent::HolderReleased);
        gate.advance(Phase::LockAcquired, HandshakeEvent::HolderAcquired);
        assert_eq!(gate.phase(), Phase::LockReleased);
        assert_eq!(gate.events().len(), 2);
    }

    #[test]
    fn test_waiter_blocks_until_target() {
        let gate = Arc::new(PhaseGate::new());

        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.wait_for(Phase::ProbeAttempted);
                gate.phase()
            })
        };

        gate.advance(Phase::LockAcquired, HandshakeEvent::HolderAcquired);
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished(), "woke before its phase was reached");

        gate.record(HandshakeEvent::HolderReleased);
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished(), "passed on a recorded event");

        gate.advance(
            Phase::ProbeAttempted,
            HandshakeEvent::Probe {
                attempt: latch_core::ProbeAttempt::First,
                acquired: false,
            },
        );
        assert_eq!(waiter.join().unwrap(), Phase::ProbeAttempted);
    }

    #[test]
    fn test_wakeup_without_phase_change_keeps_waiting() {
        let gate = Arc::new(PhaseGate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait_for(Phase::ProbeAttempted))
        };

        // Wake the waiter repeatedly while the phase stays at Start.
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(10));
            gate.changed.notify_all();
        }
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished(), "woke without its phase being reached");
        assert_eq!(gate.phase(), Phase::Start);

        gate.advance(Phase::ProbeAttempted, HandshakeEvent::HolderAcquired);
        waiter.join().unwrap();
    }

    #[test]
    fn test_release_all_skips_to_final_phase() {
        let gate = Arc::new(PhaseGate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait_for(Phase::LockReleased))
        };

        gate.release_all();
        waiter.join().unwrap();
        assert_eq!(gate.phase(), Phase::LockReleased);
        assert!(gate.events().is_empty());
    }

    #[test]
    fn test_many_waiters_all_released() {
        let gate = Arc::new(PhaseGate::new());
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.wait_for(Phase::LockReleased))
            })
            .collect();

        gate.advance(Phase::LockReleased, HandshakeEvent::HolderReleased);
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }
}
