//! Resource subscription bookkeeping.
//!
//! The dispatcher records which resource URIs the session has subscribed
//! to and hands [`ResourceUpdated`] events to a watcher channel. Draining
//! that channel and delivering notifications to the remote peer is the
//! transport layer's job; this core only does the observer registration.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc;

/// A resource-change event for a subscribed URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUpdated {
    /// URI of the resource that changed.
    pub uri: String,
}

/// The set of URIs one session is subscribed to, plus the watcher that
/// receives change events for them.
#[derive(Default)]
pub struct SubscriptionSet {
    subscribed: RwLock<HashSet<String>>,
    watcher: RwLock<Option<mpsc::UnboundedSender<ResourceUpdated>>>,
}

impl SubscriptionSet {
    /// Empty subscription set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription. Returns `false` if it was already present.
    pub fn subscribe(&self, uri: impl Into<String>) -> bool {
        self.subscribed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.into())
    }

    /// Remove a subscription. Removing an absent URI is an accepted no-op;
    /// returns `false` in that case.
    pub fn unsubscribe(&self, uri: &str) -> bool {
        self.subscribed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)
    }

    /// Whether the session is subscribed to `uri`.
    #[must_use]
    pub fn is_subscribed(&self, uri: &str) -> bool {
        self.subscribed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uri)
    }

    /// Install a watcher and return the receiving end.
    ///
    /// Replaces any previous watcher; events delivered after replacement
    /// go to the new receiver only.
    pub fn watch(&self) -> mpsc::UnboundedReceiver<ResourceUpdated> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self
            .watcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Deliver a change event if `uri` is subscribed and a watcher is
    /// installed. Returns whether the event was delivered.
    pub fn notify(&self, uri: &str) -> bool {
        if !self.is_subscribed(uri) {
            return false;
        }
        let watcher = self.watcher.read().unwrap_or_else(PoisonError::into_inner);
        match watcher.as_ref() {
            Some(tx) => tx
                .send(ResourceUpdated {
                    uri: uri.to_string(),
                })
                .is_ok(),
            None => false,
        }
    }
}
