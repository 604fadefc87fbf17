//! Principal command - derive a principal from a label.

use steward_core::Principal;

/// Print the principal derived from `label`.
pub(crate) fn show_principal(label: &str) -> anyhow::Result<()> {
    let label = label.trim();
    anyhow::ensure!(!label.is_empty(), "label must not be empty");
    println!("{}", Principal::derive(label));
    Ok(())
}
