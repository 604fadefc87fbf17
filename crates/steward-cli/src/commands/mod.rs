//! CLI command implementations.

pub(crate) mod config;
pub(crate) mod principal;
pub(crate) mod run;
