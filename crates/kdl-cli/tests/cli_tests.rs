//! Integration tests for the `kdl-cat` binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the cat, print,
//! and events subcommands through the actual binary, including stdin/stdout
//! piping, file I/O, error reporting, and the events round trip.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

macro_rules! fixture {
    ($name:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/", $name)
    };
}

fn hosts_events() -> String {
    std::fs::read_to_string(fixture!("hosts.json")).expect("hosts.json fixture must exist")
}

fn kdl_cat() -> Command {
    Command::cargo_bin("kdl-cat").unwrap()
}

const HOSTS_KDL: &str = "\
(server)host example1 enabled=#true zone=eu-west {
    user root
    port (u16)22
}
host example2 {
    weight 0.25
}
";

// ─────────────────────────────────────────────────────────────────────────────
// cat
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cat_stdin_to_stdout() {
    kdl_cat()
        .arg("cat")
        .write_stdin(hosts_events())
        .assert()
        .success()
        .stdout(HOSTS_KDL);
}

#[test]
fn cat_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("hosts.kdl");

    kdl_cat()
        .args(["cat", "-i", fixture!("hosts.json"), "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    assert_eq!(std::fs::read_to_string(&out).unwrap(), HOSTS_KDL);
}

#[test]
fn cat_v1_syntax() {
    kdl_cat()
        .args(["cat", "--v1", "-i", fixture!("hosts.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "(server)host \"example1\" enabled=true zone=\"eu-west\" {\n    user \"root\"\n",
        ));
}

#[test]
fn cat_empty_stream() {
    kdl_cat()
        .arg("cat")
        .write_stdin("[]")
        .assert()
        .success()
        .stdout("");
}

// ─────────────────────────────────────────────────────────────────────────────
// print
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn print_diagnostic_form() {
    kdl_cat()
        .args(["print", "-i", fixture!("hosts.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("(document\n  (node \"host\"\n    (type \"server\")"))
        .stdout(predicate::str::contains("(property \"zone\" (string \"eu-west\"))"))
        .stdout(predicate::str::contains("(argument (float 0.250000))"));
}

#[test]
fn print_keeps_insertion_order() {
    let output = kdl_cat()
        .args(["print", "-i", fixture!("hosts.json")])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    // The stream lists zone before enabled; print does not sort.
    assert!(stdout.find("\"zone\"").unwrap() < stdout.find("\"enabled\"").unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// events
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn events_are_canonical() {
    let output = kdl_cat()
        .args(["events", "-i", fixture!("hosts.json")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 18);
    // Properties come out sorted.
    assert_eq!(events[2]["name"], "enabled");
    assert_eq!(events[3]["name"], "zone");
    assert_eq!(events.last().unwrap()["kind"], "eof");
}

#[test]
fn events_output_rebuilds_to_the_same_text() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().join("canonical.json");

    kdl_cat()
        .args(["events", "-i", fixture!("hosts.json"), "-o"])
        .arg(&canonical)
        .assert()
        .success();

    kdl_cat()
        .arg("cat")
        .arg("-i")
        .arg(&canonical)
        .assert()
        .success()
        .stdout(HOSTS_KDL);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors and flags
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unterminated_node_fails() {
    kdl_cat()
        .args(["cat", "-i", fixture!("unterminated.json")])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Failed to build document"))
        .stderr(predicate::str::contains("expected end_node, got eof"));
}

#[test]
fn malformed_value_fails() {
    kdl_cat()
        .args(["print", "-i", fixture!("bad_value.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse event stream"))
        .stderr(predicate::str::contains("boolean value must be a boolean"));
}

#[test]
fn invalid_json_fails() {
    kdl_cat()
        .arg("cat")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse event stream from stdin"));
}

#[test]
fn missing_input_file_fails() {
    kdl_cat()
        .args(["cat", "-i", "/nonexistent/events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file: /nonexistent/events.json"));
}

#[test]
fn debug_flag_traces_to_stderr() {
    kdl_cat()
        .args(["-d", "cat", "-i", fixture!("hosts.json")])
        .assert()
        .success()
        .stdout(HOSTS_KDL)
        .stderr(predicate::str::contains("parsed document"));
}

#[test]
fn quiet_without_debug_flag() {
    kdl_cat()
        .args(["cat", "-i", fixture!("hosts.json")])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr("");
}

#[test]
fn help_flag_shows_usage() {
    kdl_cat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cat"))
        .stdout(predicate::str::contains("print"))
        .stdout(predicate::str::contains("events"));
}

#[test]
fn no_subcommand_shows_help() {
    kdl_cat()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommand_fails() {
    kdl_cat()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("unrecognized")));
}
