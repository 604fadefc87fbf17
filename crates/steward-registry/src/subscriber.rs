//! Synchronous audit subscribers.
//!
//! Subscribers are notified, in registration order, after a record has been
//! committed to the journal. They observe; they cannot veto or roll back.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace, warn};

use crate::event::{AuditEventKind, AuditRecord};

/// Trait for synchronous audit subscribers.
///
/// `on_record` runs inline with the mutating call, so it should return
/// quickly. Heavy consumers should use [`AuditJournal::subscribe`] instead.
///
/// [`AuditJournal::subscribe`]: crate::AuditJournal::subscribe
pub trait AuditSubscriber: Send + Sync {
    /// Called once for every committed record.
    fn on_record(&self, record: &AuditRecord);

    /// Return `false` to skip a record. Accepts everything by default.
    fn accepts(&self, record: &AuditRecord) -> bool {
        let _ = record;
        true
    }

    /// Name used in log lines.
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Registration handle for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Registry of synchronous subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: RwLock<BTreeMap<SubscriberId, Arc<dyn AuditSubscriber>>>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscriber_count", &self.len())
            .finish()
    }
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    ///
    /// Returns a handle that can be used to unregister it.
    pub fn register(&self, subscriber: Arc<dyn AuditSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let name = subscriber.name().to_string();

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, subscriber);

        debug!(subscriber_name = %name, "audit subscriber registered");
        id
    }

    /// Unregister a subscriber.
    ///
    /// Returns `true` if the subscriber was found and removed.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();

        if removed {
            debug!(?id, "audit subscriber unregistered");
        }
        removed
    }

    /// Notify every accepting subscriber of a committed record.
    ///
    /// A panicking subscriber is logged and skipped; the remaining
    /// subscribers are still notified.
    pub fn notify(&self, record: &AuditRecord) {
        let subs = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        for (id, subscriber) in subs.iter() {
            if !subscriber.accepts(record) {
                continue;
            }

            trace!(
                subscriber_name = %subscriber.name(),
                sequence = record.sequence,
                "notifying audit subscriber"
            );

            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                subscriber.on_record(record);
            }));

            if let Err(e) = result {
                warn!(
                    subscriber_id = ?id,
                    subscriber_name = %subscriber.name(),
                    error = ?e,
                    "audit subscriber panicked"
                );
            }
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers
            .read()
            .map(|s| s.len())
            .unwrap_or_default()
    }

    /// Whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Closure-backed subscriber with an optional kind filter.
pub struct FnSubscriber<F>
where
    F: Fn(&AuditRecord) + Send + Sync,
{
    name: String,
    kind: Option<AuditEventKind>,
    handler: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&AuditRecord) + Send + Sync,
{
    /// Create a subscriber that receives every record.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            kind: None,
            handler,
        }
    }

    /// Only receive records of the given kind.
    #[must_use]
    pub fn only(mut self, kind: AuditEventKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl<F> AuditSubscriber for FnSubscriber<F>
where
    F: Fn(&AuditRecord) + Send + Sync,
{
    fn on_record(&self, record: &AuditRecord) {
        (self.handler)(record);
    }

    fn accepts(&self, record: &AuditRecord) -> bool {
        self.kind.is_none_or(|kind| record.event.kind == kind)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
