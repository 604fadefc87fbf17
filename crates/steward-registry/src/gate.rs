//! Gating collaborator operations on the registry.
//!
//! Embedding components use a [`Gate`] to run their own privileged
//! operations behind the same "caller must be authorized" check that guards
//! `grant` and `revoke`.

use steward_core::{Filed, KeyedConfig, KeyedConfigError, Principal};
use thiserror::Error;
use tracing::debug;

use crate::error::RegistryError;
use crate::registry::AuthorityRegistry;

/// Why a gated call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The caller is not authorized; the collaborator was not called.
    #[error(transparent)]
    Denied(#[from] RegistryError),

    /// The collaborator rejected the call.
    #[error(transparent)]
    Collaborator(#[from] KeyedConfigError),
}

/// Read-only view of a registry used to guard collaborator calls.
#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    registry: &'a AuthorityRegistry,
}

impl<'a> Gate<'a> {
    /// Gate calls on `registry`.
    #[must_use]
    pub fn new(registry: &'a AuthorityRegistry) -> Self {
        Self { registry }
    }

    /// Check the caller, then forward a keyed write to `collaborator`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Denied`] if `caller` is not authorized, or
    /// [`GateError::Collaborator`] if the collaborator rejects the key or value.
    pub fn set_value<C>(
        &self,
        caller: Principal,
        collaborator: &mut C,
        key: &str,
        value: &str,
    ) -> Result<Filed, GateError>
    where
        C: KeyedConfig + ?Sized,
    {
        self.registry.require(caller)?;
        let filed = collaborator.set_value(key, value)?;
        debug!(caller = %caller.short(), key = %filed.key, "gated value filed");
        Ok(filed)
    }
}
