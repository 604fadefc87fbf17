//! Append-only audit journal.
//!
//! The journal owns every committed [`AuditRecord`] and fans each one out to
//! an optional durable [`AuditSink`], synchronous [`AuditSubscriber`]s and
//! async receivers. Records are only ever appended.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::error::RegistryResult;
use crate::event::{AuditEvent, AuditRecord};
use crate::sink::AuditSink;
use crate::subscriber::{AuditSubscriber, SubscriberId, SubscriberRegistry};

/// Default broadcast capacity for async receivers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// The append-only audit log of a registry.
pub struct AuditJournal {
    records: Vec<AuditRecord>,
    sink: Option<Arc<dyn AuditSink>>,
    subscribers: SubscriberRegistry,
    sender: broadcast::Sender<Arc<AuditRecord>>,
}

impl AuditJournal {
    /// Create an in-memory journal with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an in-memory journal whose async channel holds `capacity`
    /// records. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            records: Vec::new(),
            sink: None,
            subscribers: SubscriberRegistry::new(),
            sender,
        }
    }

    /// Attach a durable sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Whether a durable sink is attached.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.sink.is_some()
    }

    /// Build the record that the next commit would append.
    pub(crate) fn stage(&self, event: AuditEvent) -> AuditRecord {
        AuditRecord {
            sequence: u64::try_from(self.records.len()).unwrap_or(u64::MAX),
            recorded_at: Utc::now(),
            event,
        }
    }

    /// Write a staged record to the durable sink, if any.
    pub(crate) fn persist(&self, record: &AuditRecord) -> RegistryResult<()> {
        match &self.sink {
            Some(sink) => sink.persist(record),
            None => Ok(()),
        }
    }

    /// Append a record and notify observers.
    pub(crate) fn commit(&mut self, record: AuditRecord) {
        trace!(sequence = record.sequence, "committing audit record");

        let shared = Arc::new(record.clone());
        self.records.push(record);

        self.subscribers.notify(&shared);
        if self.sender.send(shared).is_err() {
            trace!("no async audit receivers");
        }
    }

    /// All committed records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[AuditRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    /// Committed events without journal metadata.
    pub fn events(&self) -> impl Iterator<Item = &AuditEvent> {
        self.records.iter().map(|r| &r.event)
    }

    /// The most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    /// Number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register a synchronous subscriber for future records.
    pub fn register(&self, subscriber: Arc<dyn AuditSubscriber>) -> SubscriberId {
        self.subscribers.register(subscriber)
    }

    /// Remove a previously registered subscriber.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        self.subscribers.unregister(id)
    }

    /// Subscribe to future records asynchronously.
    #[must_use]
    pub fn subscribe(&self) -> AuditReceiver {
        AuditReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for AuditJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuditJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditJournal")
            .field("records", &self.records.len())
            .field("durable", &self.is_durable())
            .field("subscribers", &self.subscribers.len())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

/// Async receiver of committed audit records.
pub struct AuditReceiver {
    receiver: broadcast::Receiver<Arc<AuditRecord>>,
}

impl AuditReceiver {
    /// Receive the next record.
    ///
    /// Returns `None` once the journal has been dropped. If the receiver fell
    /// behind, the skipped records are logged and reception continues.
    pub async fn recv(&mut self) -> Option<Arc<AuditRecord>> {
        loop {
            match self.receiver.recv().await {
                Ok(record) => return Some(record),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "audit receiver lagged, records dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive the next record without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<AuditRecord>> {
        loop {
            match self.receiver.try_recv() {
                Ok(record) => return Some(record),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(skipped = count, "audit receiver lagged, records dropped");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}

impl std::fmt::Debug for AuditReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditReceiver").finish_non_exhaustive()
    }
}
