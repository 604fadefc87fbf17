//! Registry error types.

use steward_core::Principal;
use thiserror::Error;

/// Errors that can occur when operating the authority registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The caller attempted a privileged mutation without being authorized.
    #[error("principal {caller} is not authorized")]
    NotAuthorized {
        /// The principal that issued the call.
        caller: Principal,
    },

    /// The durable audit sink rejected a record; nothing was applied.
    #[error("audit journal error: {0}")]
    Journal(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
