//! End-to-end tests of the `steward` binary.

use std::process::Command;

use steward_core::Principal;
use steward_test::test_file_with_extension;

fn steward(args: &[&str]) -> std::process::Output {
    steward_with_config("[logging]\nlevel = \"warn\"\n", args)
}

fn steward_with_config(config: &str, args: &[&str]) -> std::process::Output {
    let config = test_file_with_extension(config, "toml");
    Command::new(env!("CARGO_BIN_EXE_steward"))
        .arg("--config")
        .arg(config.path())
        .args(args)
        .env_remove("STEWARD_CREATOR")
        .env_remove("STEWARD_JOURNAL_PATH")
        .output()
        .unwrap()
}

#[test]
fn principal_prints_derived_hex() {
    let output = steward(&["principal", "alice"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        Principal::derive("alice").to_hex()
    );
}

#[test]
fn run_json_emits_one_record_per_line() {
    let script = test_file_with_extension(
        r#"
        creator = "c"

        [[step]]
        op = "grant"
        caller = "c"
        subject = "a"

        [[step]]
        op = "grant"
        caller = "z"
        subject = "y"

        [[step]]
        op = "revoke"
        caller = "c"
        subject = "a"
        "#,
        "toml",
    );
    let output = steward(&["run", script.path().to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["event"]["kind"], "granted");
    assert_eq!(records[2]["event"]["kind"], "revoked");
    assert_eq!(records[2]["sequence"], 2);
    assert_eq!(
        records[1]["event"]["subject"],
        Principal::derive("a").to_hex()
    );
}

#[test]
fn persisted_journal_outlives_the_process() {
    let dir = steward_test::test_dir();
    let store = dir.path().join("journal");
    let config = format!(
        "[logging]\nlevel = \"warn\"\n\n[journal]\npersist = true\npath = {:?}\n",
        store.display().to_string()
    );
    let script_file = test_file_with_extension(
        "creator = \"c\"\n\n[[step]]\nop = \"grant\"\ncaller = \"c\"\nsubject = \"a\"\n",
        "toml",
    );
    let script = script_file.path().to_str().unwrap();

    let first = steward_with_config(&config, &["run", script]);
    assert!(first.status.success());
    assert!(String::from_utf8(first.stdout).unwrap().contains("2 records persisted"));
    assert!(store.exists());

    let second = steward_with_config(&config, &["run", script]);
    assert!(!second.status.success());
    assert!(
        String::from_utf8(second.stderr)
            .unwrap()
            .contains("already holds 2 records")
    );
}

#[test]
fn config_show_prints_toml() {
    let output = steward(&["config", "show"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[journal]"));
    assert!(stdout.contains("level = \"warn\""));
}

#[test]
fn missing_script_fails() {
    let output = steward(&["run", "/nonexistent/script.toml"]);
    assert!(!output.status.success());
}
