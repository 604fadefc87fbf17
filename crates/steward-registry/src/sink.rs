//! Durable audit sinks.
//!
//! A sink persists each record before the registry applies the change it
//! describes. If the sink fails the mutation is abandoned, so the durable log
//! never lags behind the in-memory state.

use std::sync::Arc;

use steward_storage::{KvStore, validate_namespace};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::event::AuditRecord;

/// Default namespace for journal records in a [`KvStore`].
pub const DEFAULT_JOURNAL_NAMESPACE: &str = "steward:audit";

/// Storage backend for audit records.
pub trait AuditSink: Send + Sync {
    /// Persist a record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Journal`] if the record cannot be stored.
    fn persist(&self, record: &AuditRecord) -> RegistryResult<()>;
}

/// Drives the async [`KvStore`] from synchronous sink calls.
///
/// Inside a tokio runtime a scoped thread runs the future on the caller's
/// runtime so that `block_on` is never called from a runtime worker. Outside
/// one, a single current-thread runtime owned by the sink is reused for every
/// call.
struct Bridge {
    runtime: Option<tokio::runtime::Runtime>,
}

impl Bridge {
    fn new() -> RegistryResult<Self> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(_) => None,
            Err(_) => Some(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(journal_err)?,
            ),
        };
        Ok(Self { runtime })
    }

    fn owns_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    fn block_on<F>(&self, f: F) -> RegistryResult<F::Output>
    where
        F: std::future::Future + Send,
        F::Output: Send,
    {
        match (tokio::runtime::Handle::try_current(), &self.runtime) {
            (Ok(handle), _) => std::thread::scope(|s| {
                s.spawn(|| handle.block_on(f))
                    .join()
                    .map_err(|_| RegistryError::Journal("sink thread panicked".to_string()))
            }),
            (Err(_), Some(runtime)) => Ok(runtime.block_on(f)),
            // Built inside a runtime that is gone now.
            (Err(_), None) => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(journal_err)?;
                Ok(runtime.block_on(f))
            },
        }
    }
}

fn journal_err(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Journal(e.to_string())
}

/// Sink writing JSON records into a [`KvStore`] namespace.
///
/// Keys are zero-padded sequence numbers so that lexical order equals
/// journal order. Existing keys are never overwritten.
pub struct KvAuditSink {
    store: Arc<dyn KvStore>,
    namespace: String,
    bridge: Bridge,
}

impl KvAuditSink {
    /// Create a sink over `store` using `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Journal`] if the namespace is invalid or,
    /// outside a tokio runtime, if the sink's own runtime cannot be built.
    pub fn new(store: Arc<dyn KvStore>, namespace: impl Into<String>) -> RegistryResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace).map_err(journal_err)?;
        Ok(Self {
            store,
            namespace,
            bridge: Bridge::new()?,
        })
    }

    /// Create a sink using [`DEFAULT_JOURNAL_NAMESPACE`].
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_default_namespace(store: Arc<dyn KvStore>) -> RegistryResult<Self> {
        Self::new(store, DEFAULT_JOURNAL_NAMESPACE)
    }

    /// The namespace records are written to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(sequence: u64) -> String {
        format!("{sequence:020}")
    }

    /// Load every persisted record in sequence order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Journal`] if reading or decoding fails.
    pub fn load(&self) -> RegistryResult<Vec<AuditRecord>> {
        let mut keys = self
            .bridge
            .block_on(self.store.list_keys(&self.namespace))?
            .map_err(journal_err)?;
        keys.sort();

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(bytes) = self
                .bridge
                .block_on(self.store.get(&self.namespace, &key))?
                .map_err(journal_err)?
            else {
                continue;
            };
            let record: AuditRecord = serde_json::from_slice(&bytes).map_err(journal_err)?;
            records.push(record);
        }
        Ok(records)
    }
}

impl AuditSink for KvAuditSink {
    fn persist(&self, record: &AuditRecord) -> RegistryResult<()> {
        let key = Self::key(record.sequence);

        let exists = self
            .bridge
            .block_on(self.store.exists(&self.namespace, &key))?
            .map_err(journal_err)?;
        if exists {
            return Err(RegistryError::Journal(format!(
                "record {} already persisted in {}",
                record.sequence, self.namespace
            )));
        }

        let bytes = serde_json::to_vec(record).map_err(journal_err)?;
        self.bridge
            .block_on(self.store.set(&self.namespace, &key, bytes))?
            .map_err(journal_err)?;

        debug!(
            namespace = %self.namespace,
            sequence = record.sequence,
            "audit record persisted"
        );
        Ok(())
    }
}

impl std::fmt::Debug for KvAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvAuditSink")
            .field("namespace", &self.namespace)
            .field("owns_runtime", &self.bridge.owns_runtime())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AuditEvent;
    use chrono::Utc;
    use steward_core::Principal;
    use steward_storage::MemoryKvStore;

    fn record(sequence: u64) -> AuditRecord {
        let p = Principal::derive("root");
        AuditRecord {
            sequence,
            recorded_at: Utc::now(),
            event: AuditEvent::granted(p, p),
        }
    }

    #[test]
    fn test_persist_and_load_in_order() {
        let sink = KvAuditSink::with_default_namespace(Arc::new(MemoryKvStore::new())).unwrap();
        for seq in [0, 1, 2, 10, 11] {
            sink.persist(&record(seq)).unwrap();
        }

        let loaded: Vec<u64> = sink.load().unwrap().iter().map(|r| r.sequence).collect();
        assert_eq!(loaded, vec![0, 1, 2, 10, 11]);
    }

    #[test]
    fn test_persist_refuses_overwrite() {
        let sink = KvAuditSink::with_default_namespace(Arc::new(MemoryKvStore::new())).unwrap();
        sink.persist(&record(0)).unwrap();
        assert!(matches!(
            sink.persist(&record(0)),
            Err(RegistryError::Journal(_))
        ));
    }

    #[test]
    fn test_invalid_namespace() {
        let result = KvAuditSink::new(Arc::new(MemoryKvStore::new()), "");
        assert!(matches!(result, Err(RegistryError::Journal(_))));
    }

    #[test]
    fn test_sink_outside_runtime_reuses_one_runtime() {
        let sink = KvAuditSink::with_default_namespace(Arc::new(MemoryKvStore::new())).unwrap();
        assert!(sink.bridge.owns_runtime());

        for seq in 0..3 {
            sink.persist(&record(seq)).unwrap();
        }
        assert_eq!(sink.load().unwrap().len(), 3);
        assert!(format!("{sink:?}").contains("owns_runtime: true"));
    }

    #[tokio::test]
    async fn test_sink_inside_runtime_borrows_caller_runtime() {
        let sink = KvAuditSink::with_default_namespace(Arc::new(MemoryKvStore::new())).unwrap();
        assert!(!sink.bridge.owns_runtime());
    }

    #[tokio::test]
    async fn test_persist_inside_runtime() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let sink = KvAuditSink::new(Arc::clone(&store), "test:audit").unwrap();
        sink.persist(&record(0)).unwrap();

        assert!(store.exists("test:audit", &KvAuditSink::key(0)).await.unwrap());
    }
}
