//! # deferred-gate
//!
//! **deferred-gate** is a small coordination primitive for Tokio: a shared release gate and
//! a keyed service that parks submitted work behind it.
//!
//! Each submitted item returns a pending handle immediately. Its waiter stays parked until
//! someone opens the gate, then transforms the payload once and delivers the result to the
//! listener registered for the item's key. The crate exists to make one hazard observable:
//! an ordered merge that subscribes to its sources **lazily** deadlocks when an earlier
//! source depends on a gate release performed by a later one.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ WorkItem #1  │   │ WorkItem #2  │   │ WorkItem #N  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  DeferredKeyedService::submit (never blocks)                      │
//! │  - ListenerRegistry (key → listener + cancellation token)         │
//! │  - Bus (lifecycle events)                                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Waiter     │   │   Waiter     │   │   Waiter     │ ◄── ReleaseGate
//!     │ (parked)     │   │ (parked)     │   │ (parked)     │     set_released(true)
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘     wakes all
//!            ▼                  ▼                  ▼
//!      transform(p1)      transform(p2)      transform(pN)
//!            ▼                  ▼                  ▼
//!      listener(k1)       listener(k2)       listener(kN)  ──► PendingHandle resolves
//! ```
//!
//! ### Item lifecycle
//! ```text
//! SUBMITTED ──► WAITING (gate closed, heartbeat every poll_interval)
//!                  ├─► RELEASED ──► FULFILLED          (listener invoked once)
//!                  │            └─► FAILED             (transform/listener panic)
//!                  └─► CANCELLED                       (handle.cancel / shutdown)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types                                  |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Gate**          | Shared boolean latch, last writer wins, wakes parked waiters. | [`ReleaseGate`]                            |
//! | **Service**       | Keyed submission, one waiter and one delivery per item.       | [`DeferredKeyedService`], [`PendingHandle`]|
//! | **Callbacks**     | Per-key listeners and payload transforms.                     | [`Listener`], [`Transform`]                |
//! | **Composition**   | Eager vs lazy ordered merge of handles.                       | [`merge::merge_sequential`]                |
//! | **Events**        | Broadcast lifecycle events for observability and tests.       | [`Event`], [`EventKind`], [`Bus`]          |
//! | **Errors**        | Typed, per-item errors.                                       | [`ServiceError`]                           |
//! | **Configuration** | Heartbeat interval, jitter, bus sizing.                       | [`ServiceConfig`], [`JitterPolicy`]        |
//!
//! ## Logging
//! Diagnostics go through `tracing` (target `deferred_gate`); the library never installs a
//! subscriber.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use deferred_gate::{DeferredKeyedService, ReleaseGate, ServiceConfig, WorkItem, uppercase};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), deferred_gate::ServiceError> {
//!     let gate = ReleaseGate::closed();
//!     let mut cfg = ServiceConfig::default();
//!     cfg.poll_interval = Duration::from_millis(10);
//!
//!     let service = DeferredKeyedService::new(gate.clone(), uppercase, cfg);
//!     let first = service.submit(WorkItem::new(1, "first".to_string()))?;
//!     let second = service.submit(WorkItem::new(2, "second".to_string()))?;
//!
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         gate.release();
//!     });
//!
//!     assert_eq!(first.await?.value, "FIRST");
//!     assert_eq!(second.await?.value, "SECOND");
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod items;
mod policies;

pub mod merge;

// ---- Public re-exports ----

pub use core::{DeferredKeyedService, ReleaseGate, ServiceBuilder, ServiceConfig};
pub use error::ServiceError;
pub use events::{Bus, Event, EventKind};
pub use items::{
    Key, Listener, ListenerRef, PendingHandle, Transform, TransformRef, WorkItem, WorkResult,
    uppercase,
};
pub use policies::JitterPolicy;
