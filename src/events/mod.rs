//! Item lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the service and its waiters.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `DeferredKeyedService::submit*` (submitted/rejected) and
//!   `service::waiter` (waiting/released/fulfilled/cancelled/failed).
//! - **Consumers**: anything holding a receiver from [`Bus::subscribe`]; tests use it to
//!   observe that every waiter was parked before the gate opened.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
