//! Convenient re-exports for logging setup.
//!
//! ```rust,no_run
//! use steward_telemetry::prelude::*;
//! ```

pub use crate::{LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult, setup_logging};
