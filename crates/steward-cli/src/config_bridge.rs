//! Bridge from `steward_config::Config` to runtime types.

use steward_config::Config;
use steward_telemetry::{FileRotation, LogConfig, LogFormat, LogTarget};

/// File name prefix for rolling log files.
const LOG_FILE_PREFIX: &str = "steward";

/// Build the logging setup from configuration.
///
/// `verbose` raises the base level to `debug`. Unparseable values fall back
/// to their defaults; validation has already rejected those. A `"file"`
/// target without a directory logs to stderr.
pub(crate) fn to_log_config(config: &Config, verbose: bool) -> LogConfig {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();

    let mut log = LogConfig::new(level).with_format(format);
    log = match (config.logging.target.as_str(), &config.logging.directory) {
        ("stdout", _) => log.with_target(LogTarget::Stdout),
        ("file", Some(dir)) => {
            let rotation = config
                .logging
                .rotation
                .parse::<FileRotation>()
                .unwrap_or_default();
            log.with_file_logging(dir, LOG_FILE_PREFIX, rotation)
        },
        _ => log.with_target(LogTarget::Stderr),
    };
    for directive in &config.logging.directives {
        log = log.with_directive(directive.clone());
    }
    log
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_maps_logging_section() {
        let mut config = Config::default();
        config.logging.format = "json".to_owned();
        config.logging.directives = vec!["steward_registry=trace".to_owned()];

        let log = to_log_config(&config, false);
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["steward_registry=trace"]);
    }

    #[test]
    fn test_default_target_is_stderr() {
        assert_eq!(to_log_config(&Config::default(), false).target, LogTarget::Stderr);
    }

    #[test]
    fn test_maps_stdout_target() {
        let mut config = Config::default();
        config.logging.target = "stdout".to_owned();
        assert_eq!(to_log_config(&config, false).target, LogTarget::Stdout);
    }

    #[test]
    fn test_maps_file_target_with_rotation() {
        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        config.logging.directory = Some(PathBuf::from("/var/log/steward"));
        config.logging.rotation = "hourly".to_owned();

        let log = to_log_config(&config, false);
        assert_eq!(log.target, LogTarget::File(PathBuf::from("/var/log/steward")));
        assert_eq!(log.rotation, FileRotation::Hourly);
        assert_eq!(log.file_prefix, "steward");
        assert!(!log.ansi);
    }

    #[test]
    fn test_verbose_raises_level() {
        assert_eq!(to_log_config(&Config::default(), true).level, "debug");
    }
}
