//! Waiting policies.
//!
//! This module groups the knobs that control **how often** a parked waiter wakes up
//! to re-check the gate and report that it is still waiting.
//!
//! ## Contents
//! - [`JitterPolicy`] randomization strategy applied to each heartbeat delay
//!
//! ## Quick wiring
//! ```text
//! ServiceConfig { poll_interval, jitter }
//!      └─► service::waiter uses:
//!           - poll_interval as the heartbeat between gate checks
//!           - jitter.apply(poll_interval) for each individual sleep
//! ```
//!
//! ## Defaults
//! - `JitterPolicy::None` (deterministic heartbeat); consider `Equal` when thousands of
//!   items are parked at once.

mod jitter;

pub use jitter::JitterPolicy;
