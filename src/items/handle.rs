//! # Pending handle returned at submission.
//!
//! [`PendingHandle`] is a single-fulfillment future: it resolves exactly once, with the
//! transformed result or with the reason the item was abandoned.
//!
//! ## Resolution
//! ```text
//! waiter delivers result          ──► Ok(WorkResult)
//! cancel() / service.shutdown()   ──► Err(ServiceError::Cancelled)
//! transform or waiter failure     ──► Err(ServiceError::Interrupted)
//! ```
//!
//! Dropping the handle does **not** stop the waiter: the item is still fulfilled (into a
//! closed channel) once the gate opens. Call [`PendingHandle::cancel`] to abandon it.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::items::item::{WorkResult, key_label};
use crate::items::listener::Listener;

type Outcome<K, P> = Result<WorkResult<K, P>, ServiceError>;

/// Listener behind every [`PendingHandle`]: forwards the outcome into the handle's channel.
pub(crate) struct HandleListener<K, P> {
    tx: oneshot::Sender<Outcome<K, P>>,
}

impl<K, P> Listener<K, P> for HandleListener<K, P>
where
    K: Send + 'static,
    P: Send + 'static,
{
    fn on_result(self: Box<Self>, result: WorkResult<K, P>) {
        // receiver gone means the caller dropped the handle
        let _ = self.tx.send(Ok(result));
    }

    fn on_failure(self: Box<Self>, error: ServiceError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Single-fulfillment future for one submitted item.
///
/// Resolves to `Ok(WorkResult)` once the gate has opened and the waiter delivered the
/// transformed payload. Polling again after it resolved is a contract violation.
pub struct PendingHandle<K, P> {
    key: K,
    rx: oneshot::Receiver<Outcome<K, P>>,
    cancel: CancellationToken,
}

// `key` is never pinned; only `rx` is polled, and it is `Unpin`.
impl<K, P> Unpin for PendingHandle<K, P> {}

impl<K, P> PendingHandle<K, P>
where
    K: Send + 'static,
    P: Send + 'static,
{
    /// Creates a handle and the listener that fulfills it.
    pub(crate) fn channel(key: K, cancel: CancellationToken) -> (Self, HandleListener<K, P>) {
        let (tx, rx) = oneshot::channel();
        (Self { key, rx, cancel }, HandleListener { tx })
    }
}

impl<K, P> PendingHandle<K, P> {
    /// Key of the submitted item.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Signals the waiter to stop without invoking the listener.
    ///
    /// Has no effect if the result was already delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once [`cancel`](Self::cancel) was called or the service shut down.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The item's cancellation token (a child of the service's root token).
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl<K, P> Future for PendingHandle<K, P>
where
    K: std::fmt::Debug,
{
    type Output = Outcome<K, P>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_closed)) => {
                let key = key_label(&this.key);
                Poll::Ready(Err(if this.cancel.is_cancelled() {
                    ServiceError::Cancelled {
                        key: key.to_string(),
                    }
                } else {
                    ServiceError::Interrupted {
                        key: key.to_string(),
                        reason: "waiter dropped without delivering".to_string(),
                    }
                }))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<K: std::fmt::Debug, P> std::fmt::Debug for PendingHandle<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingHandle")
            .field("key", &self.key)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
