//! Config command - show the resolved configuration.

use steward_config::ResolvedConfig;

/// Print the resolved configuration as TOML.
pub(crate) fn show_config(resolved: &ResolvedConfig) -> anyhow::Result<()> {
    print!("{}", resolved.to_toml()?);
    Ok(())
}
