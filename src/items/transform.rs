//! # Payload transform applied after release.
//!
//! [`Transform`] is the business logic a waiter runs exactly once per item, after the
//! gate opens. Any `Fn(P) -> P` closure is a transform; [`TransformRef`] is the shared
//! handle the service hands to every waiter.
//!
//! ## Example
//! ```rust
//! use deferred_gate::{Transform, TransformRef, uppercase};
//! use std::sync::Arc;
//!
//! let t: TransformRef<String> = Arc::new(uppercase);
//! assert_eq!(t.apply("first".to_string()), "FIRST");
//!
//! let double: TransformRef<u64> = Arc::new(|n: u64| n * 2);
//! assert_eq!(double.apply(21), 42);
//! ```

use std::sync::Arc;

/// Pure payload-to-payload function run inside the waiter.
///
/// Implementations must not block for long: they run on the async worker that owned the
/// waiter. A panic is caught and fails only the item being transformed.
pub trait Transform<P>: Send + Sync + 'static {
    /// Produces the result value for one payload.
    fn apply(&self, payload: P) -> P;
}

impl<P, F> Transform<P> for F
where
    F: Fn(P) -> P + Send + Sync + 'static,
{
    fn apply(&self, payload: P) -> P {
        (self)(payload)
    }
}

/// Shared handle to a transform (`Arc<dyn Transform<P>>`).
pub type TransformRef<P> = Arc<dyn Transform<P>>;

/// Case conversion used by the demonstration service.
pub fn uppercase(payload: String) -> String {
    payload.to_uppercase()
}
