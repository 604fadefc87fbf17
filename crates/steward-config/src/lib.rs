#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for the `steward` tools.
//!
//! # Usage
//!
//! ```rust,no_run
//! use steward_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("journal namespace: {}", resolved.config.journal.namespace);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. The config file (`--config <PATH>`, or `./steward.toml` if present)
//! 2. Environment variables (`STEWARD_*`), for fields the file leaves unset
//! 3. Embedded defaults (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other steward crates. Conversion to
//! logging and registry types happens in the CLI.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use show::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a config file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(path)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
