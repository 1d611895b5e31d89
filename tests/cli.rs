//! End-to-end tests for the `starch` binary.
//!
//! Tests cover:
//! 1. File and stdin input
//! 2. Missing input and malformed records
//! 3. --stats, --verify, --note and --reject-unsorted

use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

/// Helper to create a temporary BED file.
fn create_bed_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn run_starch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_starch"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run starch")
}

fn run_starch_with_stdin(args: &[&str], stdin_content: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_starch"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn starch");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin_content.as_bytes())
        .unwrap();
    child.wait_with_output().expect("Failed to wait for starch")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Input sources
// =============================================================================

#[test]
fn test_file_input() {
    let file = create_bed_file("chr1\t100\t200\tA\nchr1\t200\t300\tB\n");
    let output = run_starch(&[file.path().to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "p100\n100\tA\n0\tB\n");
}

#[test]
fn test_stdin_dash() {
    let output = run_starch_with_stdin(&["-"], "chr1\t10\t20\nchr2\t5\t15\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "p10\n10\np10\n5\n");
}

#[test]
fn test_stdin_implicit() {
    let output = run_starch_with_stdin(&[], "chr1\t0\t50\tx\nchr1\t60\t100\ty\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "p50\n0\tx\np40\n10\ty\n");
}

#[test]
fn test_empty_input_exits_cleanly() {
    let output = run_starch_with_stdin(&[], "");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_small_block_size_same_output() {
    let content = "chr1\t100\t200\tfeature_one\nchr1\t300\t400\tfeature_two\nchr2\t0\t5\n";
    let file = create_bed_file(content);

    let default_run = run_starch(&[file.path().to_str().unwrap()]);
    let small_run = run_starch(&["--block-size", "8", file.path().to_str().unwrap()]);

    assert!(small_run.status.success(), "stderr: {}", stderr(&small_run));
    assert_eq!(default_run.stdout, small_run.stdout);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_file_fails() {
    let output = run_starch(&["/nonexistent/input.bed"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Input file does not exist"));
}

#[test]
fn test_malformed_record_fails() {
    let output = run_starch_with_stdin(&[], "chr1\t100\t200\nchr1\tabc\t300\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("line 2"), "stderr: {}", stderr(&output));
}

#[test]
fn test_non_contiguous_chromosome_fails() {
    let output = run_starch_with_stdin(&[], "chr1\t1\t2\nchr2\t1\t2\nchr1\t3\t4\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("chr1"), "stderr: {}", stderr(&output));
}

// =============================================================================
// Flags
// =============================================================================

#[test]
fn test_unsorted_encoded_by_default() {
    let output = run_starch_with_stdin(&[], "chr1\t100\t200\nchr1\t150\t160\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "p100\n100\np10\n-50\n");
}

#[test]
fn test_reject_unsorted_flag() {
    let output = run_starch_with_stdin(
        &["--reject-unsorted"],
        "chr1\t100\t200\nchr1\t150\t160\n",
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error:"));
}

#[test]
fn test_stats_flag() {
    let file = create_bed_file("chr1\t100\t200\nchr1\t200\t300\nchr2\t0\t10\n");
    let output = run_starch(&["--stats", file.path().to_str().unwrap()]);

    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Encode stats:"), "stderr: {}", err);
    assert!(err.contains("Records: 3"), "stderr: {}", err);
    assert!(err.contains("chr1: 2 records"), "stderr: {}", err);
    assert!(err.contains("chr2: 1 records"), "stderr: {}", err);
}

#[test]
fn test_note_reported_with_stats() {
    let output = run_starch_with_stdin(
        &["--stats", "--note", "peaks from run 7"],
        "chr1\t1\t2\n",
    );

    assert!(output.status.success());
    assert!(stderr(&output).contains("Note: peaks from run 7"));
}

#[test]
fn test_verify_flag() {
    let content = "#header\nchr1\t100\t200\tA\tB\nchr1\t150\t180\nchr2\t5\t15\tC\n";
    let file = create_bed_file(content);

    let verified = run_starch(&["--verify", file.path().to_str().unwrap()]);
    let plain = run_starch(&[file.path().to_str().unwrap()]);

    assert!(verified.status.success(), "stderr: {}", stderr(&verified));
    assert_eq!(verified.stdout, plain.stdout);
}

#[test]
fn test_verify_from_stdin() {
    let output = run_starch_with_stdin(&["--verify"], "chr1\t10\t20\nchr2\t5\t15\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "p10\n10\np10\n5\n");
}
