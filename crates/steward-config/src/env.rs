//! Environment variable fallbacks.
//!
//! Variables fill in fields that no config file sets. They never override
//! a value written in a file.

use std::collections::HashMap;

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "STEWARD_";

/// Variable name → dotted config path.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("STEWARD_LOG_LEVEL", "logging.level"),
    ("STEWARD_LOG_FORMAT", "logging.format"),
    ("STEWARD_JOURNAL_NAMESPACE", "journal.namespace"),
    ("STEWARD_JOURNAL_PATH", "journal.path"),
    ("STEWARD_LOG_DIR", "logging.directory"),
    ("STEWARD_CREATOR", "registry.creator"),
];

/// Snapshot the `STEWARD_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Write env values into `tree`, returning how many were applied.
///
/// Empty values are ignored.
pub fn apply_env_fallbacks(tree: &mut toml::Value, env: &HashMap<String, String>) -> usize {
    let mut applied = 0usize;
    for (var, path) in ENV_FALLBACKS {
        let Some(value) = env.get(*var).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        if set_path(tree, path, toml::Value::String(value.to_owned())) {
            tracing::debug!(var, path, "applied environment fallback");
            applied = applied.saturating_add(1);
        }
    }
    applied
}

fn set_path(tree: &mut toml::Value, path: &str, value: toml::Value) -> bool {
    let Some((section, key)) = path.split_once('.') else {
        return false;
    };
    let Some(root) = tree.as_table_mut() else {
        return false;
    };
    let table = root
        .entry(section)
        .or_insert(toml::Value::Table(toml::map::Map::new()));
    match table.as_table_mut() {
        Some(t) => {
            t.insert(key.to_owned(), value);
            true
        },
        None => false,
    }
}
