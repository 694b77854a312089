//! # Jitter policy for waiter heartbeats.
//!
//! [`JitterPolicy`] randomizes the delay between two "waiting to proceed" checks so that
//! many parked waiters submitted together do not wake in lockstep.
//!
//! - [`JitterPolicy::None`] — no randomization, every heartbeat uses the exact interval
//! - [`JitterPolicy::Full`] — random delay in [0, interval]
//! - [`JitterPolicy::Equal`] — delay = interval/2 + random[0, interval/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of heartbeat delays.
///
/// ## Trade-offs
/// - **None**: Predictable, every waiter polls on the same beat
/// - **Full**: Maximum spreading, some heartbeats come almost immediately
/// - **Equal**: Keeps at least half of the interval between checks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact interval.
    ///
    /// Use when:
    /// - Deterministic diagnostics are needed (tests, demos)
    /// - Few items are outstanding at once
    #[default]
    None,

    /// Full jitter: random delay in [0, interval].
    Full,

    /// Equal jitter: delay = interval/2 + random[0, interval/2].
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => full_jitter(delay),
            JitterPolicy::Equal => equal_jitter(delay),
        }
    }
}

/// Full jitter: random[0, delay]
fn full_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

/// Equal jitter: delay/2 + random[0, delay/2]
fn equal_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}
