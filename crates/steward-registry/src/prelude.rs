//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_registry::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use steward_registry::prelude::*;
//!
//! let root = Principal::derive("root");
//! let registry = AuthorityRegistry::initialize(root);
//! assert!(registry.is_authorized(root));
//! ```

// Errors
pub use crate::{GateError, RegistryError, RegistryResult};

// Registry
pub use crate::{AuthorityRegistry, Gate, Outcome, Principal, RegistryBuilder};

// Journal
pub use crate::{AuditEvent, AuditEventKind, AuditJournal, AuditReceiver, AuditRecord};

// Sinks and subscribers
pub use crate::{AuditSink, AuditSubscriber, FnSubscriber, KvAuditSink, SubscriberId};
