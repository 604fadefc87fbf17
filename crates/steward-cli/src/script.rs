//! Operation scripts replayed by `steward run`.
//!
//! ```toml
//! creator = "alice"
//!
//! [[step]]
//! op = "grant"
//! caller = "alice"
//! subject = "bob"
//!
//! [[step]]
//! op = "check"
//! principal = "bob"
//! ```
//!
//! Principals are either 64-character hex strings or free-form labels,
//! which are mapped to principals with [`Principal::derive`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use steward_core::{PRINCIPAL_LEN, Principal};

/// A parsed script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    /// Bootstrap principal. Falls back to `registry.creator` from config.
    #[serde(default)]
    pub(crate) creator: Option<String>,
    #[serde(default, rename = "step")]
    pub(crate) steps: Vec<Step>,
}

/// One registry call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub(crate) enum Step {
    Grant { caller: String, subject: String },
    Revoke { caller: String, subject: String },
    Check { principal: String },
    List,
}

impl Script {
    /// Parse a script from TOML text.
    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid script")
    }

    /// Read and parse a script file.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }
}

/// Resolves names to principals and remembers labels for display.
#[derive(Debug, Default)]
pub(crate) struct AddressBook {
    labels: HashMap<Principal, String>,
}

impl AddressBook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve a hex string or label.
    pub(crate) fn resolve(&mut self, name: &str) -> anyhow::Result<Principal> {
        let name = name.trim();
        anyhow::ensure!(!name.is_empty(), "principal name must not be empty");

        let principal = if looks_like_hex(name) {
            Principal::from_hex(name)?
        } else {
            let p = Principal::derive(name);
            self.labels.entry(p).or_insert_with(|| name.to_owned());
            p
        };
        Ok(principal)
    }

    /// Display name: the label if one was seen, otherwise the short hex.
    pub(crate) fn name(&self, principal: Principal) -> String {
        self.labels
            .get(&principal)
            .cloned()
            .unwrap_or_else(|| principal.short())
    }
}

fn looks_like_hex(s: &str) -> bool {
    s.len() == PRINCIPAL_LEN.saturating_mul(2) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_ops() {
        let script = Script::parse(
            r#"
            creator = "alice"

            [[step]]
            op = "grant"
            caller = "alice"
            subject = "bob"

            [[step]]
            op = "revoke"
            caller = "bob"
            subject = "alice"

            [[step]]
            op = "check"
            principal = "alice"

            [[step]]
            op = "list"
            "#,
        )
        .unwrap();

        assert_eq!(script.creator.as_deref(), Some("alice"));
        assert_eq!(
            script.steps,
            vec![
                Step::Grant {
                    caller: "alice".into(),
                    subject: "bob".into()
                },
                Step::Revoke {
                    caller: "bob".into(),
                    subject: "alice".into()
                },
                Step::Check {
                    principal: "alice".into()
                },
                Step::List,
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_op() {
        assert!(Script::parse("[[step]]\nop = \"delegate\"\n").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        assert!(Script::parse("[[step]]\nop = \"grant\"\ncaller = \"a\"\n").is_err());
    }

    #[test]
    fn test_empty_script() {
        let script = Script::parse("").unwrap();
        assert!(script.creator.is_none());
        assert!(script.steps.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let file = steward_test::test_file_with_extension("creator = \"root\"\n", "toml");
        let script = Script::load(file.path()).unwrap();
        assert_eq!(script.creator.as_deref(), Some("root"));
    }

    #[test]
    fn test_address_book_labels_and_hex() {
        let mut book = AddressBook::new();
        let alice = book.resolve(" alice ").unwrap();
        assert_eq!(alice, Principal::derive("alice"));
        assert_eq!(book.name(alice), "alice");

        let hex = Principal::derive("carol").to_hex();
        let carol = book.resolve(&hex).unwrap();
        assert_eq!(carol, Principal::derive("carol"));
        assert_eq!(book.name(carol), carol.short());

        assert!(book.resolve("  ").is_err());
    }
}
