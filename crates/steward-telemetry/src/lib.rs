//! Steward Telemetry - logging setup for the authority registry tools.
//!
//! Wraps `tracing-subscriber` with a serializable [`LogConfig`] so that the
//! CLI and embedding hosts can pick a level, output format and target from
//! configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use steward_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), steward_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("steward_registry=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
