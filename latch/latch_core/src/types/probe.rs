//! Identification of the two non-blocking probes in a handshake.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the prober's two `try_lock()` attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeAttempt {
    /// Attempted while the holder owns the lock; a correct lock refuses it.
    First,

    /// Attempted after the holder released; a correct lock grants it.
    Second,
}

impl ProbeAttempt {
    /// The `try_lock()` result a correct lock produces for this probe.
    pub fn expected(&self) -> bool {
        match self {
            Self::First => false,
            Self::Second => true,
        }
    }
}

impl fmt::Display for ProbeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}
