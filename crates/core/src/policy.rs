//! Conversation-duration policy.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SOFT_CAP: Duration = Duration::from_secs(45);
pub const DEFAULT_HARD_CAP: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("soft cap ({soft:?}) must be shorter than hard cap ({hard:?})")]
    SoftCapNotBeforeHardCap { soft: Duration, hard: Duration },
}

/// Soft and hard limits on how long a caller stays on the automated line.
///
/// Past the soft cap the agent is asked once to wrap up. Past the hard cap
/// the call is dropped whatever the agent is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPolicy {
    soft_cap: Duration,
    hard_cap: Duration,
}

/// What the policy demands for a given elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub past_soft_cap: bool,
    pub past_hard_cap: bool,
}

impl DurationPolicy {
    pub fn new(soft_cap: Duration, hard_cap: Duration) -> Result<Self, PolicyError> {
        if soft_cap >= hard_cap {
            return Err(PolicyError::SoftCapNotBeforeHardCap {
                soft: soft_cap,
                hard: hard_cap,
            });
        }
        Ok(Self { soft_cap, hard_cap })
    }

    pub fn soft_cap(&self) -> Duration {
        self.soft_cap
    }

    pub fn hard_cap(&self) -> Duration {
        self.hard_cap
    }

    /// Thresholds are exclusive: exactly 45s is not yet past the soft cap.
    pub fn evaluate(&self, elapsed: Duration) -> Verdict {
        Verdict {
            past_soft_cap: elapsed > self.soft_cap,
            past_hard_cap: elapsed > self.hard_cap,
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            soft_cap: DEFAULT_SOFT_CAP,
            hard_cap: DEFAULT_HARD_CAP,
        }
    }
}
