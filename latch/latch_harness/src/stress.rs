//! Contention scenario: many threads incrementing one lock-guarded counter.
//!
//! Each trial starts `threads` workers on a fresh counter. Every worker
//! performs `ops_per_thread` increments, each one a read-modify-write done
//! between `acquire` and `release`. A correct lock loses no update, so the
//! final count is exactly `threads * ops_per_thread`.

use std::cell::UnsafeCell;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use serde::Serialize;

use latch_core::{HarnessError, LockKind, RawLock};

use crate::threads::panic_message;

/// Parameters of a stress run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressConfig {
    /// Worker threads per trial
    pub threads: usize,

    /// Guarded increments per worker
    pub ops_per_thread: usize,

    /// Number of trials, each on a fresh counter
    pub trials: usize,

    /// Log every increment at `info`
    pub verbose: bool,
}

impl StressConfig {
    /// The count a correct lock produces in every trial.
    pub fn expected_count(&self) -> u64 {
        self.threads as u64 * self.ops_per_thread as u64
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 100,
            ops_per_thread: 100,
            trials: 10,
            verbose: false,
        }
    }
}

/// A counter whose every access happens while `lock` is held.
struct SharedCounter<'a, L> {
    lock: &'a L,
    value: UnsafeCell<u64>,
}

// SAFETY: `value` is only touched inside `increment`, between acquire and
// release of `lock`, or through `into_inner`, which consumes the counter.
unsafe impl<L: RawLock> Sync for SharedCounter<'_, L> {}

impl<'a, L: RawLock> SharedCounter<'a, L> {
    fn new(lock: &'a L) -> Self {
        Self {
            lock,
            value: UnsafeCell::new(0),
        }
    }

    /// Increment under the lock, returning the new value.
    fn increment(&self) -> u64 {
        self.lock.acquire();
        // SAFETY: the lock is held, so no other thread is reading or writing.
        let value = unsafe {
            let slot = self.value.get();
            *slot += 1;
            *slot
        };
        // SAFETY: acquired above on this thread.
        unsafe { self.lock.release() };
        value
    }

    fn into_inner(self) -> u64 {
        self.value.into_inner()
    }
}

/// Result of a single trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    /// Zero-based trial index
    pub trial: usize,

    /// Final counter value
    pub count: u64,

    /// Time from spawning the first worker to joining the last
    pub elapsed: Duration,
}

/// Result of a complete stress run.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    /// Primitive under test
    pub lock: LockKind,

    /// Worker threads per trial
    pub threads: usize,

    /// Guarded increments per worker
    pub ops_per_thread: usize,

    /// Count every trial must reach
    pub expected_per_trial: u64,

    /// Trials in the order they ran
    pub trials: Vec<TrialOutcome>,
}

impl StressReport {
    /// Sum of all trial durations.
    pub fn total_elapsed(&self) -> Duration {
        self.trials.iter().map(|outcome| outcome.elapsed).sum()
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "stress ({} lock): {} threads x {} ops, expected {} per trial",
            self.lock, self.threads, self.ops_per_thread, self.expected_per_trial
        )?;
        for outcome in &self.trials {
            writeln!(
                f,
                "  trial {}: count {} in {:.3?}",
                outcome.trial, outcome.count, outcome.elapsed
            )?;
        }
        write!(f, "  total: {:.3?}", self.total_elapsed())
    }
}

/// Run every trial of `config` against `lock`.
///
/// Stops at the first trial whose count is wrong, returning
/// [`HarnessError::CountMismatch`]. All workers of a trial are joined before
/// its result is checked, including when one of them fails.
pub fn run_stress<L: RawLock>(
    lock: &L,
    config: &StressConfig,
) -> Result<StressReport, HarnessError> {
    let expected = config.expected_count();
    let mut trials = Vec::with_capacity(config.trials);

    for trial in 0..config.trials {
        let counter = SharedCounter::new(lock);
        let started = Instant::now();
        run_trial(&counter, config)?;
        let elapsed = started.elapsed();
        let count = counter.into_inner();

        if count != expected {
            error!(
                "Trial {} on {} lock: expected count {}, observed {}",
                trial,
                lock.kind(),
                expected,
                count
            );
            return Err(HarnessError::CountMismatch {
                trial,
                expected,
                observed: count,
            });
        }
        debug!("Trial {}: count {} in {:.3?}", trial, count, elapsed);
        trials.push(TrialOutcome {
            trial,
            count,
            elapsed,
        });
    }

    info!(
        "Stress on {} lock passed: {} trials of {} threads x {} ops",
        lock.kind(),
        config.trials,
        config.threads,
        config.ops_per_thread
    );
    Ok(StressReport {
        lock: lock.kind(),
        threads: config.threads,
        ops_per_thread: config.ops_per_thread,
        expected_per_trial: expected,
        trials,
    })
}

fn run_trial<L: RawLock>(
    counter: &SharedCounter<'_, L>,
    config: &StressConfig,
) -> Result<(), HarnessError> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(config.threads);
        let mut first_error = None;

        for id in 0..config.threads {
            let spawned = thread::Builder::new()
                .name(format!("latch-worker-{id}"))
                .spawn_scoped(scope, move || work(counter, id, config));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    first_error = Some(HarnessError::ThreadSpawn(e));
                    break;
                }
            }
        }

        for handle in handles {
            if let Err(payload) = handle.join() {
                if first_error.is_none() {
                    first_error = Some(HarnessError::ThreadPanicked(panic_message(payload)));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

fn work<L: RawLock>(counter: &SharedCounter<'_, L>, id: usize, config: &StressConfig) {
    for _ in 0..config.ops_per_thread {
        let count = counter.increment();
        if config.verbose {
            info!("[Thread {}] {}", id, count);
        }
    }
}
