//! The authority registry.
//!
//! Two structures are kept in sync by [`AuthorityRegistry::grant`] and
//! [`AuthorityRegistry::revoke`]:
//!
//! - a flag map giving O(1) membership checks, and
//! - the touched history, an insertion-ordered list of every successful grant.
//!
//! The history is never deduplicated or pruned. A principal that is granted,
//! revoked and granted again appears twice, and [`AuthorityRegistry::list_authorized`]
//! reports it twice.
//!
//! # Lockout
//!
//! Nothing stops an authorized principal from revoking itself or the last
//! other authorized principal. Once no principal is authorized, every later
//! `grant` or `revoke` fails with [`RegistryError::NotAuthorized`] and there is
//! no recovery path. [`AuthorityRegistry::is_locked_out`] reports this state.

use std::collections::HashMap;
use std::sync::Arc;

use steward_core::Principal;
use tracing::{debug, info, trace, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::event::{AuditEvent, AuditEventKind, AuditRecord};
use crate::journal::{AuditJournal, DEFAULT_CHANNEL_CAPACITY};
use crate::sink::AuditSink;
use crate::subscriber::AuditSubscriber;

/// Result of a mutating call that passed the authorization guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The authorized set changed and this record was committed.
    Applied(AuditRecord),
    /// The subject was already in the requested state; nothing was recorded.
    Unchanged,
}

impl Outcome {
    /// Whether the call changed the authorized set.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The committed record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&AuditRecord> {
        match self {
            Self::Applied(record) => Some(record),
            Self::Unchanged => None,
        }
    }
}

/// Registry of authorized principals.
///
/// Mutations take `&mut self`, so the borrow checker enforces the single
/// writer the registry assumes. Hosts sharing a registry across threads wrap
/// it in their own lock.
///
/// # Example
///
/// ```
/// use steward_core::Principal;
/// use steward_registry::AuthorityRegistry;
///
/// let root = Principal::derive("root");
/// let ops = Principal::derive("ops");
///
/// let mut registry = AuthorityRegistry::initialize(root);
/// registry.grant(root, ops).unwrap();
///
/// assert!(registry.is_authorized(ops));
/// assert_eq!(registry.list_authorized(), vec![root, ops]);
/// ```
pub struct AuthorityRegistry {
    authorized: HashMap<Principal, bool>,
    history: Vec<Principal>,
    journal: AuditJournal,
}

impl AuthorityRegistry {
    /// Create a registry in which only `creator` is authorized.
    ///
    /// The creator is recorded in the touched history and the journal opens
    /// with `Granted { actor: creator, subject: creator }`.
    #[must_use]
    pub fn initialize(creator: Principal) -> Self {
        let mut registry = Self::empty(AuditJournal::new());
        // An in-memory journal has no sink, so there is nothing to persist.
        let record = registry.journal.stage(AuditEvent::granted(creator, creator));
        registry.commit(record);
        info!(creator = %creator.short(), "authority registry initialized");
        registry
    }

    /// Start building a registry with a durable sink or subscribers.
    #[must_use]
    pub fn builder(creator: Principal) -> RegistryBuilder {
        RegistryBuilder::new(creator)
    }

    fn empty(journal: AuditJournal) -> Self {
        Self {
            authorized: HashMap::new(),
            history: Vec::new(),
            journal,
        }
    }

    /// Guard for privileged calls.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAuthorized`] unless `caller` is currently
    /// authorized.
    pub fn require(&self, caller: Principal) -> RegistryResult<()> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            warn!(caller = %caller.short(), "privileged call denied");
            Err(RegistryError::NotAuthorized { caller })
        }
    }

    /// Authorize `subject`.
    ///
    /// Granting an already-authorized subject returns [`Outcome::Unchanged`]
    /// without touching the history or the journal.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAuthorized`] if `caller` is not authorized,
    /// or [`RegistryError::Journal`] if the durable sink rejects the record.
    /// Either way nothing changes.
    pub fn grant(&mut self, caller: Principal, subject: Principal) -> RegistryResult<Outcome> {
        self.require(caller)?;

        if self.is_authorized(subject) {
            trace!(subject = %subject.short(), "grant is a no-op");
            return Ok(Outcome::Unchanged);
        }

        let record = self.apply(AuditEvent::granted(caller, subject))?;
        debug!(
            actor = %caller.short(),
            subject = %subject.short(),
            sequence = record.sequence,
            "principal granted"
        );
        Ok(Outcome::Applied(record))
    }

    /// De-authorize `subject`.
    ///
    /// Revoking a subject that is not authorized returns
    /// [`Outcome::Unchanged`]. The touched history is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAuthorized`] if `caller` is not authorized,
    /// or [`RegistryError::Journal`] if the durable sink rejects the record.
    /// Either way nothing changes.
    pub fn revoke(&mut self, caller: Principal, subject: Principal) -> RegistryResult<Outcome> {
        self.require(caller)?;

        if !self.is_authorized(subject) {
            trace!(subject = %subject.short(), "revoke is a no-op");
            return Ok(Outcome::Unchanged);
        }

        let record = self.apply(AuditEvent::revoked(caller, subject))?;
        debug!(
            actor = %caller.short(),
            subject = %subject.short(),
            sequence = record.sequence,
            "principal revoked"
        );

        if self.is_locked_out() {
            warn!(
                actor = %caller.short(),
                "last authorized principal revoked; registry is permanently locked"
            );
        }
        Ok(Outcome::Applied(record))
    }

    /// Whether `principal` is currently authorized.
    #[must_use]
    pub fn is_authorized(&self, principal: Principal) -> bool {
        self.authorized.get(&principal).copied().unwrap_or(false)
    }

    /// Currently authorized principals in touched-history order.
    ///
    /// A principal that was revoked and granted again appears once per
    /// grant. Callers needing a set must deduplicate.
    #[must_use]
    pub fn list_authorized(&self) -> Vec<Principal> {
        self.history
            .iter()
            .copied()
            .filter(|p| self.is_authorized(*p))
            .collect()
    }

    /// `1` if `principal` is authorized, else `0`.
    #[deprecated(note = "use `is_authorized`")]
    #[must_use]
    pub fn legacy_status(&self, principal: Principal) -> u8 {
        u8::from(self.is_authorized(principal))
    }

    /// Every principal ever granted, in grant order, duplicates included.
    #[must_use]
    pub fn touched_history(&self) -> &[Principal] {
        &self.history
    }

    /// Number of distinct principals currently authorized.
    #[must_use]
    pub fn authorized_count(&self) -> usize {
        self.authorized.values().filter(|v| **v).count()
    }

    /// Whether no principal is authorized. This state is permanent.
    #[must_use]
    pub fn is_locked_out(&self) -> bool {
        self.authorized_count() == 0
    }

    /// The audit journal.
    #[must_use]
    pub fn journal(&self) -> &AuditJournal {
        &self.journal
    }

    /// Persist, then apply and commit. A sink failure leaves no trace.
    fn apply(&mut self, event: AuditEvent) -> RegistryResult<AuditRecord> {
        let record = self.journal.stage(event);
        self.journal.persist(&record)?;
        Ok(self.commit(record))
    }

    fn commit(&mut self, record: AuditRecord) -> AuditRecord {
        let subject = record.event.subject;
        match record.event.kind {
            AuditEventKind::Granted => {
                self.authorized.insert(subject, true);
                self.history.push(subject);
            },
            AuditEventKind::Revoked => {
                self.authorized.insert(subject, false);
            },
        }
        self.journal.commit(record.clone());
        record
    }
}

impl std::fmt::Debug for AuthorityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityRegistry")
            .field("authorized", &self.authorized_count())
            .field("history", &self.history.len())
            .field("journal", &self.journal)
            .finish()
    }
}

/// Builder for registries with a durable sink or pre-registered subscribers.
///
/// Subscribers registered here observe the bootstrap record.
pub struct RegistryBuilder {
    creator: Principal,
    sink: Option<Arc<dyn AuditSink>>,
    subscribers: Vec<Arc<dyn AuditSubscriber>>,
    channel_capacity: usize,
}

impl RegistryBuilder {
    /// Create a builder for a registry bootstrapped by `creator`.
    #[must_use]
    pub fn new(creator: Principal) -> Self {
        Self {
            creator,
            sink: None,
            subscribers: Vec::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Persist every record to `sink` before it is applied.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Register a synchronous subscriber.
    #[must_use]
    pub fn subscriber(mut self, subscriber: Arc<dyn AuditSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Capacity of the async broadcast channel.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Build the registry and commit the bootstrap grant.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Journal`] if the sink rejects the bootstrap
    /// record.
    pub fn build(self) -> RegistryResult<AuthorityRegistry> {
        let mut journal = AuditJournal::with_capacity(self.channel_capacity);
        if let Some(sink) = self.sink {
            journal = journal.with_sink(sink);
        }
        for subscriber in self.subscribers {
            journal.register(subscriber);
        }

        let mut registry = AuthorityRegistry::empty(journal);
        registry.apply(AuditEvent::granted(self.creator, self.creator))?;
        info!(
            creator = %self.creator.short(),
            durable = registry.journal.is_durable(),
            "authority registry initialized"
        );
        Ok(registry)
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("creator", &self.creator)
            .field("durable", &self.sink.is_some())
            .field("subscribers", &self.subscribers.len())
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use steward_test::{principal, principals};

    /// Sink that fails while its switch is on.
    struct SwitchableSink {
        failing: AtomicBool,
    }

    impl AuditSink for SwitchableSink {
        fn persist(&self, _record: &AuditRecord) -> RegistryResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(RegistryError::Journal("unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn kinds(registry: &AuthorityRegistry) -> Vec<AuditEventKind> {
        registry.journal().events().map(|e| e.kind).collect()
    }

    #[test]
    fn test_bootstrap() {
        let [c, x] = principals(["creator", "outsider"]);
        let registry = AuthorityRegistry::initialize(c);

        assert!(registry.is_authorized(c));
        assert!(!registry.is_authorized(x));
        assert_eq!(registry.list_authorized(), vec![c]);
        assert_eq!(registry.touched_history(), &[c]);
        assert_eq!(
            registry.journal().records()[0].event,
            AuditEvent::granted(c, c)
        );
    }

    #[test]
    fn test_grant_appends_history_and_event() {
        let [c, a] = principals(["creator", "a"]);
        let mut registry = AuthorityRegistry::initialize(c);

        let outcome = registry.grant(c, a).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(outcome.record().unwrap().event, AuditEvent::granted(c, a));
        assert_eq!(registry.list_authorized(), vec![c, a]);
    }

    #[test]
    fn test_grant_is_idempotent() {
        let [c, x] = principals(["creator", "x"]);
        let mut registry = AuthorityRegistry::initialize(c);

        assert!(registry.grant(c, x).unwrap().is_applied());
        assert_eq!(registry.grant(c, x).unwrap(), Outcome::Unchanged);

        assert_eq!(registry.journal().len(), 2);
        assert_eq!(registry.touched_history(), &[c, x]);
        assert_eq!(registry.list_authorized(), vec![c, x]);
    }

    #[test]
    fn test_revoke_unauthorized_subject_is_noop() {
        let [c, x] = principals(["creator", "x"]);
        let mut registry = AuthorityRegistry::initialize(c);

        assert_eq!(registry.revoke(c, x).unwrap(), Outcome::Unchanged);
        assert_eq!(registry.journal().len(), 1);
        assert!(!registry.is_authorized(x));
    }

    #[test]
    fn test_revoke_keeps_history() {
        let [c, x] = principals(["creator", "x"]);
        let mut registry = AuthorityRegistry::initialize(c);
        registry.grant(c, x).unwrap();

        let outcome = registry.revoke(c, x).unwrap();
        assert_eq!(outcome.record().unwrap().event, AuditEvent::revoked(c, x));
        assert!(!registry.is_authorized(x));
        assert_eq!(registry.touched_history(), &[c, x]);
        assert_eq!(registry.list_authorized(), vec![c]);
    }

    #[test]
    fn test_unauthorized_caller_is_rejected() {
        let [c, z, y] = principals(["creator", "z", "y"]);
        let mut registry = AuthorityRegistry::initialize(c);

        assert_eq!(
            registry.grant(z, y),
            Err(RegistryError::NotAuthorized { caller: z })
        );
        assert_eq!(
            registry.revoke(z, c),
            Err(RegistryError::NotAuthorized { caller: z })
        );

        assert!(!registry.is_authorized(y));
        assert!(registry.is_authorized(c));
        assert_eq!(registry.journal().len(), 1);
        assert_eq!(registry.touched_history(), &[c]);
    }

    #[test]
    fn test_regrant_duplicates_in_listing() {
        let [c, x] = principals(["creator", "x"]);
        let mut registry = AuthorityRegistry::initialize(c);

        registry.grant(c, x).unwrap();
        registry.revoke(c, x).unwrap();
        registry.grant(c, x).unwrap();

        let listed = registry.list_authorized();
        assert_eq!(listed.iter().filter(|p| **p == x).count(), 2);
        assert_eq!(listed, vec![c, x, x]);
        assert_eq!(registry.authorized_count(), 2);
        assert_eq!(
            kinds(&registry),
            vec![
                AuditEventKind::Granted,
                AuditEventKind::Granted,
                AuditEventKind::Revoked,
                AuditEventKind::Granted,
            ]
        );
    }

    #[test]
    fn test_self_revoke_locks_out() {
        let c = principal("creator");
        let other = principal("other");
        let mut registry = AuthorityRegistry::initialize(c);

        assert!(registry.revoke(c, c).unwrap().is_applied());
        assert!(registry.is_locked_out());
        assert!(registry.list_authorized().is_empty());

        for caller in [c, other] {
            assert!(registry.grant(caller, c).is_err());
            assert!(registry.revoke(caller, other).is_err());
        }
        assert_eq!(registry.journal().len(), 2);
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_status() {
        let [c, x] = principals(["creator", "x"]);
        let registry = AuthorityRegistry::initialize(c);

        assert_eq!(registry.legacy_status(c), 1);
        assert_eq!(registry.legacy_status(x), 0);
    }

    #[test]
    fn test_sink_failure_is_atomic() {
        let [c, x] = principals(["creator", "x"]);
        let sink = Arc::new(SwitchableSink {
            failing: AtomicBool::new(false),
        });
        let mut registry = AuthorityRegistry::builder(c)
            .sink(Arc::clone(&sink) as Arc<dyn AuditSink>)
            .build()
            .unwrap();

        sink.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            registry.grant(c, x),
            Err(RegistryError::Journal(_))
        ));
        assert!(!registry.is_authorized(x));
        assert_eq!(registry.touched_history(), &[c]);
        assert_eq!(registry.journal().len(), 1);

        sink.failing.store(false, Ordering::SeqCst);
        let outcome = registry.grant(c, x).unwrap();
        assert_eq!(outcome.record().unwrap().sequence, 1);
    }

    #[test]
    fn test_builder_fails_when_bootstrap_cannot_persist() {
        let sink = Arc::new(SwitchableSink {
            failing: AtomicBool::new(true),
        });
        let result = AuthorityRegistry::builder(principal("creator"))
            .sink(sink)
            .build();
        assert!(matches!(result, Err(RegistryError::Journal(_))));
    }
}
