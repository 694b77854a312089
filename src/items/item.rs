use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Bounds required of a work item key.
///
/// Keys identify outstanding items in the listener registry, are cloned into events and
/// handles, and cross task boundaries.
pub trait Key: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> Key for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Renders a key for logs, events and errors.
pub(crate) fn key_label<K: Debug>(key: &K) -> Arc<str> {
    format!("{key:?}").into()
}

/// A keyed payload submitted to the service. Consumed once by its waiter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem<K, P> {
    /// Caller-supplied identifier, unique among outstanding items.
    pub key: K,
    /// Opaque value handed to the transform after release.
    pub payload: P,
}

impl<K, P> WorkItem<K, P> {
    /// Creates a new work item.
    pub fn new(key: K, payload: P) -> Self {
        Self { key, payload }
    }
}

/// The transformed payload delivered to the listener registered for `key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkResult<K, P> {
    /// Key of the submitted item.
    pub key: K,
    /// `transform(payload)`.
    pub value: P,
}

impl<K, P> WorkResult<K, P> {
    /// Splits the result into key and value.
    pub fn into_parts(self) -> (K, P) {
        (self.key, self.value)
    }
}
