//! # Release gate: one shared on/off latch.
//!
//! [`ReleaseGate`] holds a single boolean that any caller may read or overwrite without
//! blocking. Work parked behind the gate proceeds once it reads `true`.
//!
//! ## Architecture
//! ```text
//!   set_released(true) ──► AtomicBool = true ──► Notify::notify_waiters()
//!                                                     │
//!            ┌────────────────────┬───────────────────┘
//!            ▼                    ▼
//!     waiter #1 wakes      waiter #N wakes      (each re-reads the flag)
//! ```
//!
//! ## Rules
//! - **Last writer wins**: `set_released` is an unconditional store, no transition table.
//! - **No history**: only the current value is observable; re-arming (`false`) is allowed
//!   and does not affect work that already went through.
//! - **No lost wake-ups**: a waiter arms its notification *before* reading the flag.
//! - **Shared by cloning**: clones observe and mutate the same latch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time;

struct GateInner {
    released: AtomicBool,
    notify: Notify,
}

/// Shared, cloneable release latch.
///
/// ## Example
/// ```rust
/// use deferred_gate::ReleaseGate;
///
/// let gate = ReleaseGate::closed();
/// let seen_by_service = gate.clone();
///
/// assert!(!seen_by_service.is_released());
/// gate.release();
/// assert!(seen_by_service.is_released());
/// ```
#[derive(Clone)]
pub struct ReleaseGate {
    inner: Arc<GateInner>,
}

impl ReleaseGate {
    /// Creates a gate with the given initial state.
    pub fn new(released: bool) -> Self {
        Self {
            inner: Arc::new(GateInner {
                released: AtomicBool::new(released),
                notify: Notify::new(),
            }),
        }
    }

    /// Creates a gate that holds work until released.
    pub fn closed() -> Self {
        Self::new(false)
    }

    /// Creates a gate that lets work through immediately.
    pub fn open() -> Self {
        Self::new(true)
    }

    /// Overwrites the gate state.
    ///
    /// Storing `true` wakes every waiter currently parked in [`wait_released_for`](Self::wait_released_for).
    /// Storing `false` wakes nobody.
    pub fn set_released(&self, value: bool) {
        self.inner.released.store(value, Ordering::Release);
        if value {
            self.inner.notify.notify_waiters();
        }
    }

    /// Shorthand for `set_released(true)`.
    #[inline]
    pub fn release(&self) {
        self.set_released(true);
    }

    /// Shorthand for `set_released(false)`.
    #[inline]
    pub fn rearm(&self) {
        self.set_released(false);
    }

    /// Returns the current gate state.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Waits until the gate reads `true` or `limit` elapses.
    ///
    /// Returns `true` if the gate was observed released, `false` if the limit elapsed
    /// (or the gate was re-armed right after a release notification).
    /// `limit = None` waits for the next release notification without a deadline.
    ///
    /// Cancel-safe: dropping the future leaves the gate untouched.
    pub async fn wait_released_for(&self, limit: Option<Duration>) -> bool {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_released() {
            return true;
        }

        match limit {
            Some(d) => {
                let _ = time::timeout(d, notified).await;
            }
            None => notified.await,
        }
        self.is_released()
    }

    /// Waits until the gate reads `true`, however long it takes.
    pub async fn wait_released(&self) {
        while !self.wait_released_for(None).await {}
    }
}

impl Default for ReleaseGate {
    /// A closed gate.
    fn default() -> Self {
        Self::closed()
    }
}

impl std::fmt::Debug for ReleaseGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGate")
            .field("released", &self.is_released())
            .finish()
    }
}
