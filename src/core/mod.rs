//! Core: the gate and the service built on it.
//!
//! The public API from this module is [`ReleaseGate`], [`DeferredKeyedService`] (with its
//! [`ServiceBuilder`]) and [`ServiceConfig`].
//!
//! Internal modules:
//! - [`gate`]: the shared release latch (leaf, no dependencies);
//! - [`service`]: accepts items, registers listeners, spawns waiters;
//! - [`registry`]: pending listeners by key, removed on every terminal path;
//! - [`waiter`]: parks one item until release, then transforms and delivers;
//! - [`builder`]: optional wiring (shared transform, external bus);
//! - [`config`]: heartbeat, jitter and bus sizing.

mod builder;
mod config;
mod gate;
mod registry;
mod service;
mod waiter;

pub use builder::ServiceBuilder;
pub use config::ServiceConfig;
pub use gate::ReleaseGate;
pub use service::DeferredKeyedService;
