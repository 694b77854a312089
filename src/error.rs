//! Error types raised by the deferred service.
//!
//! Every failure is **local to one work item**: the gate and the listener registry
//! stay valid for all other outstanding items.
//!
//! [`ServiceError`] provides helper methods (`as_label`, `as_message`) for
//! logging/metrics and [`ServiceError::is_fatal`] to separate caller mistakes from
//! broken invariants.

use thiserror::Error;

/// # Errors produced while submitting or fulfilling a work item.
///
/// Keys are carried in their `Debug` rendering so the error type stays independent
/// of the service's key type.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A key was submitted while an item with the same key is still outstanding.
    ///
    /// Recoverable: nothing was registered or spawned for the rejected item.
    #[error("key {key} is already pending")]
    DuplicateKey {
        /// Rendered key of the rejected item.
        key: String,
    },

    /// No listener was registered for a key at fulfillment time.
    ///
    /// Registration always precedes the waiter, so this means an internal invariant broke.
    #[error("no listener registered for key {key} at fulfillment")]
    Protocol {
        /// Rendered key of the orphaned result.
        key: String,
    },

    /// The item was cancelled before its result was delivered.
    #[error("item {key} cancelled before release")]
    Cancelled {
        /// Rendered key of the cancelled item.
        key: String,
    },

    /// The waiter ended without delivering (panicking transform or listener, runtime shutdown).
    #[error("waiter for {key} interrupted: {reason}")]
    Interrupted {
        /// Rendered key of the interrupted item.
        key: String,
        /// Human-readable cause.
        reason: String,
    },
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use deferred_gate::ServiceError;
    ///
    /// let err = ServiceError::DuplicateKey { key: "7".into() };
    /// assert_eq!(err.as_label(), "duplicate_key");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::DuplicateKey { .. } => "duplicate_key",
            ServiceError::Protocol { .. } => "protocol_violation",
            ServiceError::Cancelled { .. } => "item_cancelled",
            ServiceError::Interrupted { .. } => "waiter_interrupted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::DuplicateKey { key } => format!("duplicate: key={key}"),
            ServiceError::Protocol { key } => format!("listener missing: key={key}"),
            ServiceError::Cancelled { key } => format!("cancelled: key={key}"),
            ServiceError::Interrupted { key, reason } => {
                format!("interrupted: key={key} reason={reason}")
            }
        }
    }

    /// Returns the rendered key the error refers to.
    pub fn key(&self) -> &str {
        match self {
            ServiceError::DuplicateKey { key }
            | ServiceError::Protocol { key }
            | ServiceError::Cancelled { key }
            | ServiceError::Interrupted { key, .. } => key,
        }
    }

    /// Indicates whether the error reports a broken item rather than a caller decision.
    ///
    /// Returns `true` for [`ServiceError::Protocol`] and [`ServiceError::Interrupted`].
    ///
    /// # Example
    /// ```
    /// use deferred_gate::ServiceError;
    ///
    /// assert!(!ServiceError::Cancelled { key: "1".into() }.is_fatal());
    /// assert!(ServiceError::Protocol { key: "1".into() }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ServiceError::Protocol { .. } | ServiceError::Interrupted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let cases = [
            (ServiceError::DuplicateKey { key: "1".into() }, "duplicate_key"),
            (ServiceError::Protocol { key: "1".into() }, "protocol_violation"),
            (ServiceError::Cancelled { key: "1".into() }, "item_cancelled"),
            (
                ServiceError::Interrupted {
                    key: "1".into(),
                    reason: "boom".into(),
                },
                "waiter_interrupted",
            ),
        ];
        for (err, label) in cases {
            assert_eq!(err.as_label(), label);
            assert_eq!(err.key(), "1");
        }
    }

    #[test]
    fn display_includes_key_and_reason() {
        let err = ServiceError::Interrupted {
            key: "\"first\"".into(),
            reason: "transform panicked".into(),
        };
        assert_eq!(
            err.to_string(),
            "waiter for \"first\" interrupted: transform panicked"
        );
        assert_eq!(
            err.as_message(),
            "interrupted: key=\"first\" reason=transform panicked"
        );
    }

    #[test]
    fn duplicate_and_cancel_are_recoverable() {
        assert!(!ServiceError::DuplicateKey { key: "k".into() }.is_fatal());
        assert!(!ServiceError::Cancelled { key: "k".into() }.is_fatal());
        assert!(
            ServiceError::Interrupted {
                key: "k".into(),
                reason: "r".into()
            }
            .is_fatal()
        );
    }
}
