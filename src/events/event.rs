//! # Lifecycle events emitted for every work item.
//!
//! The [`EventKind`] enum follows one item through its state machine:
//! ```text
//! ItemSubmitted ─► ItemWaiting* ─► ItemReleased ─► ItemFulfilled
//!       │                │                    └──► ItemFailed
//!       │                └──► ItemCancelled
//!       └─► (duplicate key) ItemRejected
//! ```
//! `ItemWaiting` repeats once per heartbeat while the gate stays closed; an item submitted
//! behind an open gate goes straight from `ItemSubmitted` to `ItemReleased`.
//!
//! ## Ordering
//! `seq` is process-wide and strictly increasing, so events from several services sharing
//! one bus can be merged back into publication order.
//!
//! ## Example
//! ```rust
//! use deferred_gate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ItemWaiting)
//!     .with_key("1")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::ItemWaiting);
//! assert_eq!(ev.key.as_deref(), Some("1"));
//! assert_eq!(ev.attempt, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of item lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Listener registered and waiter spawned.
    ///
    /// Sets: `key`
    ItemSubmitted,

    /// Submission refused because the key is still outstanding.
    ///
    /// Sets: `key`, `reason`
    ItemRejected,

    /// Waiter checked the gate and found it closed.
    ///
    /// Sets: `key`, `attempt` (1-based check count), `delay_ms` (next heartbeat, if any)
    ItemWaiting,

    /// Waiter observed the gate open and is about to transform the payload.
    ///
    /// Sets: `key`, `attempt` (number of closed checks before release)
    ItemReleased,

    /// Listener invoked with the transformed result.
    ///
    /// Sets: `key`
    ItemFulfilled,

    /// Waiter exited on cancellation; the listener was dropped without being invoked.
    ///
    /// Sets: `key`
    ItemCancelled,

    /// Waiter could not deliver (missing listener, panicking transform or listener).
    ///
    /// Sets: `key`, `reason` (error label)
    ItemFailed,
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide publication order.
    pub seq: u64,
    /// When the event was created.
    pub at: SystemTime,
    /// What happened to the item.
    pub kind: EventKind,
    /// `Debug` rendering of the item key.
    pub key: Option<Arc<str>>,
    /// Gate check count.
    pub attempt: Option<u32>,
    /// Delay until the next heartbeat in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (error labels, rejection details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Stamps a new event with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            key: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches an item key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a gate check count.
    #[inline]
    pub fn with_attempt(mut self, checks: u32) -> Self {
        self.attempt = Some(checks);
        self
    }

    /// Attaches the next heartbeat delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for events that end an item's lifecycle.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ItemFulfilled
                | EventKind::ItemCancelled
                | EventKind::ItemFailed
                | EventKind::ItemRejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::ItemSubmitted);
        let b = Event::new(EventKind::ItemSubmitted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_is_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::ItemWaiting).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn terminal_kinds() {
        assert!(Event::new(EventKind::ItemFulfilled).is_terminal());
        assert!(Event::new(EventKind::ItemRejected).is_terminal());
        assert!(!Event::new(EventKind::ItemWaiting).is_terminal());
        assert!(!Event::new(EventKind::ItemReleased).is_terminal());
    }
}
