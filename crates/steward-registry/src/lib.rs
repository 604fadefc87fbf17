//! Steward Registry - authorized principals with an append-only audit trail.
//!
//! This crate provides:
//! - [`AuthorityRegistry`], a binary "is this caller allowed?" registry
//! - An append-only [`AuditJournal`] of grant/revoke records
//! - Durable sinks, synchronous subscribers and async receivers for the journal
//! - A [`Gate`] that guards collaborator operations with the same check
//!
//! # Model
//!
//! The registry is created with a single authorized principal. Only
//! authorized principals may grant or revoke, both operations are idempotent,
//! and a failed call has no observable effect. Enumeration follows grant
//! order and keeps duplicates produced by revoke/re-grant cycles.
//!
//! Revoking the last authorized principal is allowed and irreversible.
//!
//! # Example
//!
//! ```
//! use steward_core::Principal;
//! use steward_registry::{AuditEventKind, AuthorityRegistry, RegistryError};
//!
//! let root = Principal::derive("root");
//! let ops = Principal::derive("ops");
//! let mallory = Principal::derive("mallory");
//!
//! let mut registry = AuthorityRegistry::initialize(root);
//! registry.grant(root, ops).unwrap();
//!
//! assert_eq!(
//!     registry.grant(mallory, mallory),
//!     Err(RegistryError::NotAuthorized { caller: mallory })
//! );
//!
//! let kinds: Vec<_> = registry.journal().events().map(|e| e.kind).collect();
//! assert_eq!(kinds, vec![AuditEventKind::Granted, AuditEventKind::Granted]);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod event;
mod gate;
mod journal;
mod registry;
mod sink;
mod subscriber;

pub use error::{RegistryError, RegistryResult};
pub use event::{AuditEvent, AuditEventKind, AuditRecord};
pub use gate::{Gate, GateError};
pub use journal::{AuditJournal, AuditReceiver, DEFAULT_CHANNEL_CAPACITY};
pub use registry::{AuthorityRegistry, Outcome, RegistryBuilder};
pub use sink::{AuditSink, DEFAULT_JOURNAL_NAMESPACE, KvAuditSink};
pub use subscriber::{AuditSubscriber, FnSubscriber, SubscriberId, SubscriberRegistry};

// Re-export the identity type for convenience
pub use steward_core::Principal;
