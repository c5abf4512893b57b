//! Selection of the lock primitive backing a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The available lock primitives.
///
/// The default is decided at build time: `Spin` normally, `Yield` when the
/// `yield-lock` feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// Busy-wait lock that retries an atomic exchange without ever suspending.
    Spin,

    /// Lock that gives the processor back to the scheduler while contended.
    Yield,
}

impl LockKind {
    /// Every lock kind, in declaration order.
    pub const ALL: [LockKind; 2] = [LockKind::Spin, LockKind::Yield];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::Yield => "yield",
        }
    }
}

impl Default for LockKind {
    #[cfg(not(feature = "yield-lock"))]
    fn default() -> Self {
        Self::Spin
    }

    #[cfg(feature = "yield-lock")]
    fn default() -> Self {
        Self::Yield
    }
}

impl FromStr for LockKind {
    type Err = Error;

    /// Case-insensitive; accepts the canonical names and a few aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spin" | "spinlock" | "busy-wait" => Ok(Self::Spin),
            "yield" | "blocking" | "mutex" => Ok(Self::Yield),
            _ => Err(Error::UnknownLockKind(s.to_string())),
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
