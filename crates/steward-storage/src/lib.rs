//! Steward Storage - namespaced key-value persistence.
//!
//! The [`KvStore`] trait provides byte-level `get`/`set`/`exists`/`list_keys`
//! with namespaced keys. The audit journal uses it as its durable sink so that
//! external indexers can replay grant/revoke records in order.
//!
//! [`MemoryKvStore`] is always available and backs tests and ephemeral hosts.
//! `SurrealKvStore` (feature `kv`) keeps the journal on disk. Hosts with their
//! own database implement [`KvStore`] over it.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore, validate_key, validate_namespace};
#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
