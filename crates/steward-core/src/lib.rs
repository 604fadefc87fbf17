//! Steward Core - identity and contract types for the Steward authority registry.
//!
//! This crate provides:
//! - [`Principal`], the opaque fixed-width identity the registry authorizes
//! - The [`KeyedConfig`] collaborator contract used by gated components
//! - Shared error types
//!
//! # Example
//!
//! ```
//! use steward_core::Principal;
//!
//! let alice = Principal::derive("alice");
//! let parsed: Principal = alice.to_hex().parse().unwrap();
//! assert_eq!(alice, parsed);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod collaborator;
pub mod error;
pub mod principal;

pub use collaborator::{Filed, KeyedConfig, KeyedConfigError};
pub use error::{PrincipalError, PrincipalResult};
pub use principal::{PRINCIPAL_LEN, Principal};
