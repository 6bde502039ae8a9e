//! Drift assessment between sound time and wall time.
//!
//! After every tick the scheduler compares how much audio it has produced
//! (`samples / sample_rate`) with how much real time has passed:
//!
//! ```text
//!   drift = sound_time - wall_elapsed
//!
//!   drift >  ahead_tolerance   → sleep drift / 2
//!   drift < -behind_limit      → desync (fatal)
//!   otherwise                  → continue
//! ```
//!
//! Sleeping half the lead converges instead of oscillating: the scheduler never
//! overshoots the next deadline, and the remaining lead keeps the device queue
//! fed. All arithmetic is in integer nanoseconds.

use std::time::Duration;

use crate::{Error, Result};

/// Default lead allowed before the scheduler sleeps.
pub const DEFAULT_AHEAD_TOLERANCE: Duration = Duration::from_millis(20);

/// Default lag tolerated before synthesis is declared desynchronized.
pub const DEFAULT_BEHIND_LIMIT: Duration = Duration::from_millis(250);

/// What the scheduler should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceAction {
    /// Keep ticking.
    Continue,
    /// Synthesis is ahead; sleep this long.
    Sleep(Duration),
    /// Synthesis trails real time by more than the limit.
    Desync {
        /// How far behind.
        behind: Duration,
    },
}

/// Pacing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    ahead_tolerance: Duration,
    behind_limit: Duration,
}

impl Pacing {
    /// Creates pacing thresholds. `ahead_tolerance` must be strictly smaller
    /// than `behind_limit`.
    pub fn new(ahead_tolerance: Duration, behind_limit: Duration) -> Result<Self> {
        if ahead_tolerance >= behind_limit {
            return Err(Error::InvalidPacing {
                ahead: ahead_tolerance,
                behind: behind_limit,
            });
        }
        Ok(Self {
            ahead_tolerance,
            behind_limit,
        })
    }

    /// Lead allowed before sleeping.
    pub fn ahead_tolerance(&self) -> Duration {
        self.ahead_tolerance
    }

    /// Lag allowed before desync.
    pub fn behind_limit(&self) -> Duration {
        self.behind_limit
    }

    /// Decides what to do after `samples` samples have been produced at
    /// `sample_rate` and `wall` has elapsed.
    pub fn assess(&self, samples: u64, sample_rate: u32, wall: Duration) -> PaceAction {
        let sound = sound_time(samples, sample_rate);
        if sound >= wall {
            let ahead = sound - wall;
            if ahead > self.ahead_tolerance {
                PaceAction::Sleep(ahead / 2)
            } else {
                PaceAction::Continue
            }
        } else {
            let behind = wall - sound;
            if behind > self.behind_limit {
                PaceAction::Desync { behind }
            } else {
                PaceAction::Continue
            }
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            ahead_tolerance: DEFAULT_AHEAD_TOLERANCE,
            behind_limit: DEFAULT_BEHIND_LIMIT,
        }
    }
}

/// Duration of `samples` samples at `sample_rate`, truncated to whole
/// nanoseconds.
pub fn sound_time(samples: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::MAX;
    }
    let nanos = u128::from(samples) * 1_000_000_000 / u128::from(sample_rate);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn sound_time_is_exact() {
        assert_eq!(sound_time(44100, 44100), Duration::from_secs(1));
        assert_eq!(sound_time(1, 1000), MS);
        assert_eq!(sound_time(1, 3), Duration::from_nanos(333_333_333));
    }

    #[test]
    fn continue_within_tolerances() {
        let p = Pacing::default();
        assert_eq!(p.assess(20, 1000, Duration::ZERO), PaceAction::Continue);
        assert_eq!(p.assess(100, 1000, 350 * MS), PaceAction::Continue);
    }

    #[test]
    fn sleeps_half_the_lead() {
        let p = Pacing::default();
        assert_eq!(p.assess(30, 1000, Duration::ZERO), PaceAction::Sleep(15 * MS));
        assert_eq!(p.assess(100, 1000, 60 * MS), PaceAction::Sleep(20 * MS));
    }

    #[test]
    fn desync_only_past_limit() {
        let p = Pacing::default();
        assert_eq!(p.assess(0, 1000, 250 * MS), PaceAction::Continue);
        assert_eq!(
            p.assess(0, 1000, 251 * MS),
            PaceAction::Desync { behind: 251 * MS }
        );
    }

    #[test]
    fn rejects_inverted_tolerances() {
        assert!(Pacing::new(250 * MS, 250 * MS).is_err());
        assert!(Pacing::new(300 * MS, 250 * MS).is_err());
        let p = Pacing::new(5 * MS, 50 * MS).unwrap();
        assert_eq!(p.ahead_tolerance(), 5 * MS);
        assert_eq!(p.behind_limit(), 50 * MS);
    }
}
