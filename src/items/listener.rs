//! # Per-key completion listener.
//!
//! A [`Listener`] is registered for a key at submission time and invoked **at most once**,
//! from the waiter's task (not the submitter's). Any `FnOnce(WorkResult<K, P>)` closure is a
//! listener that ignores failures; implement the trait directly to observe them too.
//!
//! ## Example
//! ```rust
//! use deferred_gate::{Listener, ServiceError, WorkResult};
//!
//! struct Print;
//!
//! impl Listener<u32, String> for Print {
//!     fn on_result(self: Box<Self>, result: WorkResult<u32, String>) {
//!         println!("{} -> {}", result.key, result.value);
//!     }
//!
//!     fn on_failure(self: Box<Self>, error: ServiceError) {
//!         eprintln!("{}", error.as_message());
//!     }
//! }
//! ```

use crate::error::ServiceError;
use crate::items::item::WorkResult;

/// Completion callback for one submitted key.
///
/// Exactly one of [`on_result`](Listener::on_result) / [`on_failure`](Listener::on_failure)
/// is called for a delivered or abandoned item; neither is called twice.
pub trait Listener<K, P>: Send + 'static {
    /// Receives the transformed result.
    fn on_result(self: Box<Self>, result: WorkResult<K, P>);

    /// Receives the reason the item will never produce a result.
    ///
    /// Default: ignored.
    fn on_failure(self: Box<Self>, error: ServiceError) {
        let _ = error;
    }
}

impl<K, P, F> Listener<K, P> for F
where
    F: FnOnce(WorkResult<K, P>) + Send + 'static,
{
    fn on_result(self: Box<Self>, result: WorkResult<K, P>) {
        (*self)(result)
    }
}

/// Owned, type-erased listener as stored in the registry.
pub type ListenerRef<K, P> = Box<dyn Listener<K, P>>;
