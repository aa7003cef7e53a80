//! End-to-end tests for the `tn` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tn() -> Command {
    let mut cmd = Command::cargo_bin("tn").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_prints_alternating_columns() {
    tn().args(["run", "AB", "xy"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("A x\nB y\n"))
        .stdout(predicate::str::contains("4 symbols written (A: 2, B: 2)"));
}

#[test]
fn test_run_unequal_lengths_terminates() {
    tn().args(["run", "A", "pqr", "--timeout-ms", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("A p\nq\nr\n"));
}

#[test]
fn test_letters_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("output.txt");

    tn().args(["letters", "--no-console", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Written AaBbCc...Zz pattern to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "AaBbCcDdEeFfGgHhIiJjKkLlMmNnOoPpQqRrSsTtUuVvWwXxYyZz");
}

#[test]
fn test_odd_even_labels() {
    tn().args(["odd-even", "--max", "4"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Odd Thread: 1\nEven Thread: 2\nOdd Thread: 3\nEven Thread: 4\n",
        ))
        .stdout(predicate::str::contains("Both threads finished printing up to 4."));
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("turnstile.yml");
    let output = temp.path().join("numbers.txt");
    std::fs::write(
        &config,
        format!("console: false\nodd_even_max: 6\noutput_path: {}\n", output.display()),
    )
    .unwrap();

    tn().args(["odd-even", "--config"]).arg(&config).assert().success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "1\n2\n3\n4\n5\n6\n");
}

#[test]
fn test_unopenable_output_fails_before_running() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("missing-dir").join("output.txt");

    tn().args(["letters", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to open output file"));
}

#[test]
fn test_reversed_range_is_rejected() {
    tn().args(["run", "Z-A", "ab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reversed"));
}
