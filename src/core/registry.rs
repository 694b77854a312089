//! # Listener registry - pending listeners by key.
//!
//! The registry maps each outstanding key to its listener and cancellation token:
//! - `submit` → `register(key, listener, token)` **before** the waiter is spawned
//! - waiter fulfills → `take(key)` → invoke listener
//! - waiter cancelled / failed → `take(key)` → `listener.on_failure(..)`
//!
//! ## Architecture
//! ```text
//! submit() ──► register(key) ──► HashMap<K, Entry { listener, cancel }>
//!                                          ▲
//! Waiter(key) ── take(key) ────────────────┘   (removes: at most one taker)
//! cancel(key) ── entry.cancel.cancel() ──► Waiter exits and takes the entry
//! ```
//!
//! ## Rules
//! - An entry lives exactly as long as its item is pending; `take` removes it.
//! - Whoever takes an entry owns its listener, so a listener runs at most once.
//! - Duplicate in-flight keys are refused under the same lock that inserts.
//! - The lock is never held across an `.await` or while a listener runs.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::items::{Key, ListenerRef, key_label};

/// Registered state of one outstanding item.
pub(crate) struct Entry<K, P> {
    /// Completion callback for the key.
    pub(crate) listener: ListenerRef<K, P>,
    /// Item cancellation token (child of the service root token).
    pub(crate) cancel: CancellationToken,
}

/// Thread-safe registry of pending listeners.
pub(crate) struct ListenerRegistry<K, P> {
    entries: Mutex<HashMap<K, Entry<K, P>>>,
}

impl<K: Key, P> ListenerRegistry<K, P> {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Installs the listener for `key`.
    ///
    /// Fails with [`ServiceError::DuplicateKey`] if `key` is still pending; the
    /// existing registration is left untouched.
    pub(crate) fn register(
        &self,
        key: K,
        listener: ListenerRef<K, P>,
        cancel: CancellationToken,
    ) -> Result<(), ServiceError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&key) {
            return Err(ServiceError::DuplicateKey {
                key: key_label(&key).to_string(),
            });
        }
        entries.insert(key, Entry { listener, cancel });
        Ok(())
    }

    /// Atomically removes and returns the entry for `key`.
    pub(crate) fn take(&self, key: &K) -> Option<Entry<K, P>> {
        self.entries.lock().remove(key)
    }

    /// Signals cancellation for `key`. Returns `false` if the key is not pending.
    ///
    /// The entry stays in place; the waiter removes it when it observes the token.
    pub(crate) fn cancel(&self, key: &K) -> bool {
        match self.entries.lock().get(key) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// True if `key` is pending.
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Number of pending keys.
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Snapshot of pending keys (unordered).
    pub(crate) fn keys(&self) -> Vec<K> {
        self.entries.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::WorkResult;

    fn noop() -> ListenerRef<u32, String> {
        Box::new(|_: WorkResult<u32, String>| {})
    }

    #[test]
    fn duplicate_pending_key_is_rejected() {
        let reg = ListenerRegistry::new();
        reg.register(1, noop(), CancellationToken::new()).expect("first");

        let err = reg
            .register(1, noop(), CancellationToken::new())
            .expect_err("duplicate");
        assert_eq!(err, ServiceError::DuplicateKey { key: "1".into() });
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn take_removes_entry_once() {
        let reg = ListenerRegistry::new();
        reg.register(7, noop(), CancellationToken::new()).expect("register");

        assert!(reg.contains(&7));
        assert!(reg.take(&7).is_some());
        assert!(reg.take(&7).is_none());
        assert!(!reg.contains(&7));

        reg.register(7, noop(), CancellationToken::new())
            .expect("key reusable after take");
    }

    #[test]
    fn cancel_marks_token_and_keeps_entry() {
        let reg = ListenerRegistry::new();
        let token = CancellationToken::new();
        reg.register(3, noop(), token.clone()).expect("register");

        assert!(reg.cancel(&3));
        assert!(token.is_cancelled());
        assert!(reg.contains(&3));
        assert!(!reg.cancel(&4));
    }

    #[test]
    fn keys_snapshot() {
        let reg = ListenerRegistry::new();
        for k in [3, 1, 2] {
            reg.register(k, noop(), CancellationToken::new()).expect("register");
        }
        let mut keys = reg.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
    }
}
