//! Post-merge configuration validation.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Largest accepted `journal.channel_capacity`.
const MAX_CHANNEL_CAPACITY: usize = 1_048_576;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_journal(config)?;
    validate_registry(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    if config.logging.directives.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            "directives must not be empty strings".to_owned(),
        ));
    }

    let valid_targets = ["stderr", "stdout", "file"];
    if !valid_targets.contains(&config.logging.target.as_str()) {
        return Err(invalid(
            "logging.target",
            format!(
                "unsupported log target '{}'; expected one of: {}",
                config.logging.target,
                valid_targets.join(", ")
            ),
        ));
    }

    let valid_rotations = ["daily", "hourly", "never"];
    if !valid_rotations.contains(&config.logging.rotation.as_str()) {
        return Err(invalid(
            "logging.rotation",
            format!(
                "unsupported rotation '{}'; expected one of: {}",
                config.logging.rotation,
                valid_rotations.join(", ")
            ),
        ));
    }

    if config.logging.target == "file" && !has_path(config.logging.directory.as_deref()) {
        return Err(invalid(
            "logging.directory",
            "a directory is required when target = \"file\"".to_owned(),
        ));
    }

    Ok(())
}

fn validate_journal(config: &Config) -> ConfigResult<()> {
    let j = &config.journal;

    if j.namespace.is_empty() || j.namespace.contains('\0') {
        return Err(invalid(
            "journal.namespace",
            "namespace must be non-empty and must not contain null bytes".to_owned(),
        ));
    }

    if j.channel_capacity == 0 || j.channel_capacity > MAX_CHANNEL_CAPACITY {
        return Err(invalid(
            "journal.channel_capacity",
            format!(
                "capacity {} is out of range; must be between 1 and {MAX_CHANNEL_CAPACITY}",
                j.channel_capacity
            ),
        ));
    }

    if j.persist && !has_path(j.path.as_deref()) {
        return Err(invalid(
            "journal.path",
            "a store path is required when persist = true".to_owned(),
        ));
    }

    Ok(())
}

fn has_path(path: Option<&Path>) -> bool {
    path.is_some_and(|p| !p.as_os_str().is_empty())
}

fn validate_registry(config: &Config) -> ConfigResult<()> {
    if config
        .registry
        .creator
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        return Err(invalid(
            "registry.creator",
            "creator must not be blank".to_owned(),
        ));
    }
    Ok(())
}
