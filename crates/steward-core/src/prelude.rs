//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{PrincipalError, PrincipalResult};

// Identity
pub use crate::{PRINCIPAL_LEN, Principal};

// Collaborator contract
pub use crate::{Filed, KeyedConfig, KeyedConfigError};
