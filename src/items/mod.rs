//! # Work items and the caller-facing pieces around them.
//!
//! This module provides the item-related types:
//! - [`WorkItem`] / [`WorkResult`] - keyed payload in, keyed transformed payload out
//! - [`Key`] - bounds every item key satisfies
//! - [`Transform`] / [`TransformRef`] - business logic applied once per item after release
//! - [`Listener`] / [`ListenerRef`] - per-key completion callback
//! - [`PendingHandle`] - single-fulfillment future returned by `submit`

mod handle;
mod item;
mod listener;
mod transform;

pub use handle::PendingHandle;
pub use item::{Key, WorkItem, WorkResult};
pub use listener::{Listener, ListenerRef};
pub use transform::{Transform, TransformRef, uppercase};

#[cfg(test)]
pub(crate) use handle::HandleListener;
pub(crate) use item::key_label;
