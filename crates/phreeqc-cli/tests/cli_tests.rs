//! Integration tests for the `phreeqc` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the shape,
//! select, headings, components and run subcommands through the actual
//! binary, including stdin piping, file I/O and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

/// Helper: path to the example 11 selected-output fixture.
fn example11_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/example11.json")
}

/// Helper: path to the heading-only fixture (bare array form).
fn headings_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/headings.json")
}

/// Helper: run `select` against example 11 and parse stdout as JSON.
fn select(index: &str) -> Value {
    let output = Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["select", index, "-i", example11_path()])
        .output()
        .expect("phreeqc must run");
    assert!(output.status.success(), "select {} failed", index);
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// shape
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn shape_from_file() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["shape", "-i", example11_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows:     3"))
        .stdout(predicate::str::contains("Columns:  8"));
}

#[test]
fn shape_from_stdin() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .arg("shape")
        .write_stdin(r#"[["a","b"],[1,2],[3,4],[5,6]]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows:     4"))
        .stdout(predicate::str::contains("Columns:  2"));
}

// ─────────────────────────────────────────────────────────────────────────────
// select
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn select_scalar() {
    assert_eq!(select("0,0"), json!("cb"));
}

#[test]
fn select_column_slices() {
    assert_eq!(select("0,1:4"), json!(["H", "O", "Ca"]));
    assert_eq!(select("0,5:"), json!(["K", "N", "Na"]));
}

#[test]
fn select_single_key_is_full_row() {
    let row = select("2");
    assert_eq!(row, select("2,:"));
    assert_eq!(row.as_array().map(Vec::len), Some(8));
}

#[test]
fn select_table() {
    assert_eq!(
        select("::2,0:2"),
        json!([["cb", "H"], [-3.395954270633993e-16, 111.01243360154359]])
    );
}

#[test]
fn select_negative_row_passes_through() {
    assert_eq!(select("-1,0"), json!("VR_INVALIDROW"));
}

#[test]
fn select_compact_to_file() {
    let output_path = "/tmp/phreeqc-test-select-output.json";
    let _ = std::fs::remove_file(output_path);

    Command::cargo_bin("phreeqc")
        .unwrap()
        .args([
            "select",
            "0,5:",
            "--compact",
            "-i",
            example11_path(),
            "-o",
            output_path,
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(output_path).expect("output file must exist");
    assert_eq!(content, r#"["K","N","Na"]"#);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn select_rejects_text_key() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["select", "0,Ca", "-i", example11_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column index must be int or slice"));
}

#[test]
fn select_rejects_zero_step() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["select", "0,::0", "-i", example11_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Slice step cannot be zero"));
}

#[test]
fn select_rejects_bool_cells() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["select", "0"])
        .write_stdin("[[true, 1]]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported value type"));
}

#[test]
fn select_missing_file_fails() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["select", "0", "-i", "/nonexistent/table.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// headings / components
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn headings_from_bare_array() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["headings", "-i", headings_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"["cb","H","O","Ca","Cl","K","N","Na"]"#,
        ));
}

#[test]
fn components_one_per_line() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["components", "-i", example11_path()])
        .assert()
        .success()
        .stdout("Ca\nCl\nK\nN\nNa\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// run
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "iphreeqc"))]
#[test]
fn run_without_iphreeqc_explains() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["run", "--database-dir", "/tmp"])
        .write_stdin("SOLUTION 1\nEND\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("iphreeqc"));
}

#[test]
fn run_rejects_bad_select_before_running() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .args(["run", "--select", "x"])
        .write_stdin("END\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Row index must be int or slice"));
}

// ─────────────────────────────────────────────────────────────────────────────
// General
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shape"))
        .stdout(predicate::str::contains("select"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn version_flag() {
    Command::cargo_bin("phreeqc")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("phreeqc"));
}
