//! Config file discovery and layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Apply `STEWARD_*` environment fallbacks
//! 3. Merge the config file (explicit path, or `./steward.toml` if present)
//! 4. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "steward.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration from the process environment and an optional file.
///
/// An explicit `path` must exist. Without one, `./steward.toml` is used
/// when present and skipped otherwise.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file cannot be read or parsed, or the
/// result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(path, &collect_env_vars())
}

/// Like [`load`], with an explicit set of environment variables.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let env_count = apply_env_fallbacks(&mut merged, env);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let (overlay, file) = match path {
        Some(p) => (Some(read_file(p)?), Some(p.to_path_buf())),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            match try_load_file(&p)? {
                Some(overlay) => (Some(overlay), Some(p)),
                None => (None, None),
            }
        },
    };

    if let (Some(overlay), Some(p)) = (&overlay, &file) {
        deep_merge(&mut merged, overlay);
        info!(path = %p.display(), "loaded config file");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_file: file,
    })
}

/// Load a config from a single file, without defaults layering or env.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_file(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

fn read_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    }
}

fn too_large(path: &Path, len: u64) -> ConfigError {
    ConfigError::ValidationError {
        field: path.display().to_string(),
        message: format!(
            "config file is {len} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
        ),
    }
}

/// Reject a file by its metadata before reading any of it.
fn check_size(path: &Path, metadata: &std::fs::Metadata) -> ConfigResult<()> {
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(too_large(path, metadata.len()));
    }
    Ok(())
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
    check_size(path, &metadata)?;
    let content = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    parse_content(path, &content)
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => return Err(read_error(path, e)),
    };
    check_size(path, &metadata)?;
    let content = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    parse_content(path, &content).map(Some)
}

fn parse_content(path: &Path, content: &str) -> ConfigResult<toml::Value> {
    // The file may have grown between the metadata check and the read.
    let len = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(too_large(path, len));
    }

    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Merge `overlay` into `base`. Tables merge key by key; anything else
/// replaces the base value.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    },
                }
            }
        },
        (base, overlay) => *base = overlay.clone(),
    }
}
