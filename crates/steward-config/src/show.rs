//! Resolved configuration display.

use std::path::PathBuf;

use crate::error::ConfigResult;
use crate::types::Config;

/// A loaded configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// The config file that was merged, if any.
    pub loaded_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Render the configuration as TOML, headed by a comment naming its
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`](crate::ConfigError::SerializeError)
    /// if serialization fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        let body = toml::to_string_pretty(&self.config)?;
        let source = match &self.loaded_file {
            Some(path) => format!("# source: defaults + {}\n", path.display()),
            None => "# source: defaults\n".to_owned(),
        };
        Ok(format!("{source}{body}"))
    }
}
