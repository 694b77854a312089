//! # DeferredKeyedService: park keyed work behind a release gate.
//!
//! The service accepts [`WorkItem`]s, registers a per-key listener, spawns one waiter per
//! item and returns immediately. Once the shared [`ReleaseGate`] reads open, each waiter
//! transforms its payload and delivers the result to the listener for its key.
//!
//! ## Architecture
//! ```text
//!   submit(item) ─┬─► Handle::current()                               (0) panics first
//!                 ├─► registry.register(key, listener, child_token)   (1) synchronous
//!                 ├─► publish ItemSubmitted
//!                 ├─► runtime.spawn(Waiter::run)                      (2) detached
//!                 └─► return PendingHandle                             (3) never blocks
//!
//!   Waiter ── park on gate ──► transform(payload) ──► registry.take(key) ──► listener
//! ```
//!
//! ## Rules
//! - **Registration precedes release observation**: the listener is installed before the
//!   waiter exists, so no release can race ahead of registration for that key.
//! - **At most once**: the registry entry is removed by whoever takes it first.
//! - **No ordering across items**: listeners fire in scheduler order once released;
//!   callers needing submission order compose the handles themselves (see [`crate::merge`]).
//! - **Local failures**: a cancelled, panicking or orphaned item never affects the others.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    core::{
        builder::ServiceBuilder,
        config::ServiceConfig,
        gate::ReleaseGate,
        registry::ListenerRegistry,
        waiter::{Waiter, WaiterCtx},
    },
    error::ServiceError,
    events::{Bus, Event, EventKind},
    items::{Key, Listener, PendingHandle, Transform, TransformRef, WorkItem, key_label},
};

/// Accepts keyed work, holds it until the gate opens, then delivers one result per key.
///
/// ## Example
/// ```rust
/// use deferred_gate::{DeferredKeyedService, ReleaseGate, ServiceConfig, WorkItem, uppercase};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), deferred_gate::ServiceError> {
/// let gate = ReleaseGate::closed();
/// let service = DeferredKeyedService::new(gate.clone(), uppercase, ServiceConfig::default());
///
/// let first = service.submit(WorkItem::new(1, "first".to_string()))?;
/// assert!(service.is_pending(&1));
///
/// gate.release();
/// assert_eq!(first.await?.value, "FIRST");
/// assert_eq!(service.pending_len(), 0);
/// # Ok(())
/// # }
/// ```
pub struct DeferredKeyedService<K, P> {
    gate: ReleaseGate,
    registry: Arc<ListenerRegistry<K, P>>,
    transform: TransformRef<P>,
    config: ServiceConfig,
    bus: Bus,
    root: CancellationToken,
}

impl<K, P> DeferredKeyedService<K, P>
where
    K: Key,
    P: Send + 'static,
{
    /// Creates a service bound to `gate`, applying `transform` to every released payload.
    ///
    /// Construction does not need a runtime; submission does.
    pub fn new(gate: ReleaseGate, transform: impl Transform<P>, config: ServiceConfig) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        Self::from_parts(gate, Arc::new(transform), config, bus)
    }

    /// Returns a builder for wiring a shared transform or an external bus.
    pub fn builder(gate: ReleaseGate, transform: impl Transform<P>) -> ServiceBuilder<K, P> {
        ServiceBuilder::new(gate, Arc::new(transform))
    }

    pub(crate) fn from_parts(
        gate: ReleaseGate,
        transform: TransformRef<P>,
        config: ServiceConfig,
        bus: Bus,
    ) -> Self {
        Self {
            gate,
            registry: Arc::new(ListenerRegistry::new()),
            transform,
            config,
            bus,
            root: CancellationToken::new(),
        }
    }

    /// Submits an item and returns a handle that resolves with its transformed payload.
    ///
    /// Never blocks on the gate. Fails fast with [`ServiceError::DuplicateKey`] if the key is
    /// still outstanding.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the waiter is spawned onto it). Nothing
    /// is registered when it panics, so the key stays free.
    pub fn submit(&self, item: WorkItem<K, P>) -> Result<PendingHandle<K, P>, ServiceError> {
        let token = self.root.child_token();
        let (handle, listener) = PendingHandle::channel(item.key.clone(), token.clone());
        self.enqueue(item, Box::new(listener), token)?;
        Ok(handle)
    }

    /// Submits an item whose result goes to a caller-supplied listener.
    ///
    /// Returns the item's cancellation token. The listener is invoked at most once, from the
    /// waiter's task.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the waiter is spawned onto it). Nothing
    /// is registered when it panics, so the key stays free.
    pub fn submit_with(
        &self,
        item: WorkItem<K, P>,
        listener: impl Listener<K, P>,
    ) -> Result<CancellationToken, ServiceError> {
        let token = self.root.child_token();
        self.enqueue(item, Box::new(listener), token.clone())?;
        Ok(token)
    }

    fn enqueue(
        &self,
        item: WorkItem<K, P>,
        listener: Box<dyn Listener<K, P>>,
        token: CancellationToken,
    ) -> Result<(), ServiceError> {
        let label = key_label(&item.key);
        // resolve the runtime before registering, so a missing runtime leaves no entry behind
        let runtime = Handle::current();

        if let Err(err) = self
            .registry
            .register(item.key.clone(), listener, token.clone())
        {
            debug!(key = %label, "rejected: key already pending");
            self.bus.publish(
                Event::new(EventKind::ItemRejected)
                    .with_key(label)
                    .with_reason(err.as_label()),
            );
            return Err(err);
        }

        self.bus
            .publish(Event::new(EventKind::ItemSubmitted).with_key(label.clone()));
        debug!(key = %label, "submitted");

        let waiter = Waiter {
            item,
            ctx: WaiterCtx {
                label,
                gate: self.gate.clone(),
                registry: Arc::clone(&self.registry),
                transform: Arc::clone(&self.transform),
                config: self.config.clone(),
                bus: self.bus.clone(),
                token,
            },
        };
        runtime.spawn(waiter.run());
        Ok(())
    }

    /// Signals cancellation for an outstanding key. Returns `false` if the key is not pending.
    pub fn cancel(&self, key: &K) -> bool {
        self.registry.cancel(key)
    }

    /// True if an item with `key` is waiting or being fulfilled.
    pub fn is_pending(&self, key: &K) -> bool {
        self.registry.contains(key)
    }

    /// Number of outstanding items.
    pub fn pending_len(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of outstanding keys (unordered).
    pub fn pending_keys(&self) -> Vec<K> {
        self.registry.keys()
    }

    /// Cancels every outstanding waiter. Items already delivered are unaffected.
    ///
    /// Items submitted afterwards are cancelled immediately.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// The gate this service waits on.
    pub fn gate(&self) -> &ReleaseGate {
        &self.gate
    }

    /// The lifecycle event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
