//! # Waiter: parks one work item until the gate opens.
//!
//! One waiter is spawned per submitted item. It parks on the [`ReleaseGate`], applies
//! the transform exactly once after release and hands the result to the listener
//! registered for the item's key.
//!
//! ## Event flow
//! ```text
//! ItemWaiting (per closed check) → ItemReleased → ItemFulfilled
//!                                              → ItemFailed (transform/listener panic,
//!                                                            missing listener)
//! cancellation while parked → ItemCancelled
//! ```
//!
//! ## Architecture
//! ```text
//! loop {
//!   ├─► token cancelled?      ─► yes: take entry, on_failure(Cancelled), exit
//!   ├─► gate open?            ─► yes: break
//!   ├─► publish ItemWaiting, log "waiting to proceed"
//!   └─► select! {
//!         token.cancelled()                 → next iteration exits
//!         gate.wait_released_for(heartbeat) → next iteration re-checks
//!       }
//! }
//! transform(payload)  (panic caught → on_failure(Interrupted))
//! registry.take(key)  (missing → Protocol)
//! listener.on_result(WorkResult)  (panic caught → ItemFailed)
//! ```
//!
//! ## Rules
//! - The transform runs **at most once**, and only after the gate was observed open.
//! - A token cancelled before the gate is observed open always wins, even behind an open gate.
//! - Every exit path removes the item's registry entry.
//! - Failures stay local to this item.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    core::{config::ServiceConfig, gate::ReleaseGate, registry::ListenerRegistry},
    error::ServiceError,
    events::{Bus, Event, EventKind},
    items::{Key, TransformRef, WorkItem, WorkResult},
};

/// Background unit of execution bound to one work item.
pub(crate) struct Waiter<K, P> {
    pub(crate) item: WorkItem<K, P>,
    pub(crate) ctx: WaiterCtx<K, P>,
}

/// Everything a waiter shares with the service; borrowed across awaits, so it stays `Sync`.
pub(crate) struct WaiterCtx<K, P> {
    pub(crate) label: Arc<str>,
    pub(crate) gate: ReleaseGate,
    pub(crate) registry: Arc<ListenerRegistry<K, P>>,
    pub(crate) transform: TransformRef<P>,
    pub(crate) config: ServiceConfig,
    pub(crate) bus: Bus,
    pub(crate) token: CancellationToken,
}

impl<K, P> Waiter<K, P>
where
    K: Key,
    P: Send + 'static,
{
    /// Runs the waiter to a terminal state.
    ///
    /// Returns `Ok(())` once the listener was invoked with the transformed payload.
    pub(crate) async fn run(self) -> Result<(), ServiceError> {
        let Waiter { item, ctx } = self;
        let WorkItem { key, payload } = item;

        let Some(checks) = ctx.park().await else {
            return Err(ctx.abandon(&key));
        };
        ctx.bus.publish(
            Event::new(EventKind::ItemReleased)
                .with_key(ctx.label.clone())
                .with_attempt(checks),
        );

        let transform = &ctx.transform;
        let value = match catch_unwind(AssertUnwindSafe(|| transform.apply(payload))) {
            Ok(value) => value,
            Err(_panic) => {
                let err = ctx.interrupted("transform panicked");
                if let Some(entry) = ctx.registry.take(&key) {
                    entry.listener.on_failure(err.clone());
                }
                return Err(err);
            }
        };

        let Some(entry) = ctx.registry.take(&key) else {
            let err = ServiceError::Protocol {
                key: ctx.label.to_string(),
            };
            error!(key = %ctx.label, "no listener registered at fulfillment");
            ctx.bus.publish(failed(&ctx.label, &err));
            return Err(err);
        };

        debug!(key = %ctx.label, "producing output");
        let delivered = catch_unwind(AssertUnwindSafe(move || {
            entry.listener.on_result(WorkResult { key, value })
        }));
        if delivered.is_err() {
            return Err(ctx.interrupted("listener panicked"));
        }

        ctx.bus
            .publish(Event::new(EventKind::ItemFulfilled).with_key(ctx.label.clone()));
        Ok(())
    }
}

impl<K, P> WaiterCtx<K, P>
where
    K: Key,
    P: Send + 'static,
{
    /// Waits until the gate reads open.
    ///
    /// Returns the number of closed checks, or `None` if the item was cancelled first.
    async fn park(&self) -> Option<u32> {
        let mut checks: u32 = 0;

        loop {
            if self.token.is_cancelled() {
                return None;
            }
            if self.gate.is_released() {
                return Some(checks);
            }

            checks = checks.saturating_add(1);
            let delay = self.config.next_heartbeat_delay();
            debug!(key = %self.label, attempt = checks, "waiting to proceed");

            let mut ev = Event::new(EventKind::ItemWaiting)
                .with_key(self.label.clone())
                .with_attempt(checks);
            if let Some(d) = delay {
                ev = ev.with_delay(d);
            }
            self.bus.publish(ev);

            select! {
                biased;
                _ = self.token.cancelled() => {}
                _ = self.gate.wait_released_for(delay) => {}
            }
        }
    }

    /// Drops the registration of a cancelled item and reports it.
    fn abandon(&self, key: &K) -> ServiceError {
        let err = ServiceError::Cancelled {
            key: self.label.to_string(),
        };
        warn!(key = %self.label, "cancelled before release");
        if let Some(entry) = self.registry.take(key) {
            entry.listener.on_failure(err.clone());
        }
        self.bus
            .publish(Event::new(EventKind::ItemCancelled).with_key(self.label.clone()));
        err
    }

    /// Logs and publishes a caught panic; returns the error for the item.
    fn interrupted(&self, reason: &str) -> ServiceError {
        let err = ServiceError::Interrupted {
            key: self.label.to_string(),
            reason: reason.to_string(),
        };
        error!(key = %self.label, reason, "waiter interrupted");
        self.bus.publish(failed(&self.label, &err));
        err
    }
}

fn failed(label: &Arc<str>, err: &ServiceError) -> Event {
    Event::new(EventKind::ItemFailed)
        .with_key(label.clone())
        .with_reason(err.as_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{HandleListener, PendingHandle, uppercase};
    use std::time::Duration;

    fn waiter(
        key: u32,
        payload: &str,
        gate: &ReleaseGate,
        registry: &Arc<ListenerRegistry<u32, String>>,
        bus: &Bus,
    ) -> (Waiter<u32, String>, CancellationToken) {
        let token = CancellationToken::new();
        let w = Waiter {
            item: WorkItem::new(key, payload.to_string()),
            ctx: WaiterCtx {
                label: format!("{key:?}").into(),
                gate: gate.clone(),
                registry: Arc::clone(registry),
                transform: Arc::new(uppercase),
                config: ServiceConfig::default(),
                bus: bus.clone(),
                token: token.clone(),
            },
        };
        (w, token)
    }

    fn register(
        registry: &ListenerRegistry<u32, String>,
        key: u32,
        token: &CancellationToken,
    ) -> PendingHandle<u32, String> {
        let (handle, listener): (_, HandleListener<u32, String>) =
            PendingHandle::channel(key, token.clone());
        registry
            .register(key, Box::new(listener), token.clone())
            .expect("register");
        handle
    }

    #[tokio::test(start_paused = true)]
    async fn missing_listener_is_a_protocol_error() {
        let gate = ReleaseGate::open();
        let registry = Arc::new(ListenerRegistry::new());
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let (w, _token) = waiter(9, "orphan", &gate, &registry, &bus);
        assert_eq!(
            w.run().await,
            Err(ServiceError::Protocol { key: "9".into() })
        );

        let released = rx.recv().await.expect("released");
        assert_eq!(released.kind, EventKind::ItemReleased);
        assert_eq!(released.attempt, Some(0));
        let failed = rx.recv().await.expect("failed");
        assert_eq!(failed.kind, EventKind::ItemFailed);
        assert_eq!(failed.reason.as_deref(), Some("protocol_violation"));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeats_until_release_then_delivers() {
        let gate = ReleaseGate::closed();
        let registry = Arc::new(ListenerRegistry::new());
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();

        let (w, token) = waiter(1, "first", &gate, &registry, &bus);
        let handle = register(&registry, 1, &token);
        let task = tokio::spawn(w.run());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        gate.release();
        task.await.expect("join").expect("delivered");

        let res = handle.await.expect("result");
        assert_eq!(res.value, "FIRST");
        assert_eq!(registry.len(), 0);

        let mut waiting = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ItemWaiting {
                waiting += 1;
                assert_eq!(ev.delay_ms, Some(1_000));
            }
        }
        assert_eq!(waiting, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_drops_entry_without_result() {
        let gate = ReleaseGate::closed();
        let registry = Arc::new(ListenerRegistry::new());
        let bus = Bus::new(16);

        let (w, token) = waiter(2, "second", &gate, &registry, &bus);
        let handle = register(&registry, 2, &token);
        let task = tokio::spawn(w.run());

        token.cancel();
        assert_eq!(
            task.await.expect("join"),
            Err(ServiceError::Cancelled { key: "2".into() })
        );
        assert_eq!(handle.await, Err(ServiceError::Cancelled { key: "2".into() }));
        assert_eq!(registry.len(), 0);

        gate.release();
    }
}
