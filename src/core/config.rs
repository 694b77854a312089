//! # Service configuration.
//!
//! Provides [`ServiceConfig`] centralized settings for a
//! [`DeferredKeyedService`](crate::DeferredKeyedService).
//!
//! ## Sentinel values
//! - `poll_interval = 0s` → no heartbeat; waiters wake only on the gate's release notification
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

use crate::policies::JitterPolicy;

/// Configuration for the deferred keyed service.
///
/// ## Field semantics
/// - `poll_interval`: Delay between two gate checks of a parked waiter (`0s` = notification only)
/// - `jitter`: Randomization applied to each heartbeat delay
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// Waiters are always woken by the gate's release notification; the heartbeat only bounds
/// how long a waiter stays silent and backs up the notification path.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Heartbeat between gate checks while an item is waiting.
    ///
    /// Each heartbeat emits a "waiting to proceed" diagnostic and an `ItemWaiting` event.
    pub poll_interval: Duration,

    /// Jitter applied to every heartbeat delay.
    pub jitter: JitterPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,
}

impl ServiceConfig {
    /// Returns the heartbeat interval as an `Option`.
    ///
    /// - `None` → no periodic checks, wait for the release notification only
    /// - `Some(d)` → re-check the gate at least every `d` (before jitter)
    #[inline]
    pub fn heartbeat(&self) -> Option<Duration> {
        if self.poll_interval == Duration::ZERO {
            None
        } else {
            Some(self.poll_interval)
        }
    }

    /// Returns the next heartbeat delay with jitter applied, if heartbeats are enabled.
    #[inline]
    pub fn next_heartbeat_delay(&self) -> Option<Duration> {
        self.heartbeat().map(|d| self.jitter.apply(d))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ServiceConfig {
    /// Default configuration:
    ///
    /// - `poll_interval = 1s`
    /// - `jitter = JitterPolicy::None`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            jitter: JitterPolicy::None,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_polls_every_second() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.heartbeat(), Some(Duration::from_secs(1)));
        assert_eq!(cfg.next_heartbeat_delay(), Some(Duration::from_secs(1)));
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn zero_interval_disables_heartbeat() {
        let cfg = ServiceConfig {
            poll_interval: Duration::ZERO,
            jitter: JitterPolicy::Full,
            bus_capacity: 0,
        };
        assert_eq!(cfg.heartbeat(), None);
        assert_eq!(cfg.next_heartbeat_delay(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
