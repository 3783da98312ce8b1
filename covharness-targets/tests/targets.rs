use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use covharness::record::InputLog;
use itertools::Itertools;

fn run(bin: &str, args: &[&str], dir: &Path, stdin: &[u8]) -> Output {
    let mut child = Command::new(bin)
        .args(args)
        .env("COVHARNESS_INPUT_LOG", dir.join("input.txt"))
        .env("COVHARNESS_COVERAGE_FILE", dir.join("c2rust_cov.txt"))
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn bubble_sort(dir: &Path, stdin: &[u8]) -> Output {
    run(env!("CARGO_BIN_EXE_bubble_sort"), &[], dir, stdin)
}

fn reverse_string(dir: &Path, stdin: &[u8]) -> Output {
    run(env!("CARGO_BIN_EXE_reverse_string"), &[], dir, stdin)
}

#[test]
fn test_bubble_sort_accepts_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let numbers: Vec<i32> = (0..97).map(|i| (i * 37) % 101 - 50).collect();
    let input = numbers.iter().join("\t \n");

    let output = bubble_sort(dir.path(), input.as_bytes());
    assert_eq!(output.status.code(), Some(0));

    let mut sorted = numbers.clone();
    sorted.sort_unstable();
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("{} \n", sorted.iter().join(" "))
    );

    let records = InputLog::new(dir.path().join("input.txt"))
        .read_records()
        .unwrap();
    assert_eq!(records, vec![numbers.iter().join(" ").into_bytes()]);
}

#[test]
fn test_bubble_sort_rejects_wrong_count() {
    let dir = tempfile::tempdir().unwrap();

    let output = bubble_sort(dir.path(), b"5 -3 10");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        String::from_utf8(output.stderr).unwrap(),
        "Error: Expected 97 arguments, but got 3.\n"
    );
    assert!(!dir.path().join("input.txt").exists());
}

#[test]
fn test_bubble_sort_rejects_divergent_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec!["1"; 96];
    args.push("12abc");

    let output = bubble_sort(dir.path(), args.join(" ").as_bytes());
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(output.stderr).unwrap(),
        "Input validation failed!\n"
    );
    assert!(!dir.path().join("input.txt").exists());
}

#[test]
fn test_reverse_string() {
    let dir = tempfile::tempdir().unwrap();
    let chars: Vec<u8> = (0..306).map(|i| b'a' + (i % 26) as u8).collect();
    let input = chars.iter().map(|&byte| byte as char).join(" ");

    let output = reverse_string(dir.path(), input.as_bytes());
    assert_eq!(output.status.code(), Some(0));

    // an even number of reversals restores the input
    assert_eq!(String::from_utf8(output.stdout).unwrap(), format!("{} \n", input));
    assert_eq!(
        InputLog::new(dir.path().join("input.txt"))
            .read_records()
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_reverse_string_rejects_words() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec!["x"; 305];
    args.push("xy");

    let output = reverse_string(dir.path(), args.join(" ").as_bytes());
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(
        String::from_utf8(output.stderr).unwrap(),
        "Error: Argument 306 is not a single character.\n"
    );
    assert!(!dir.path().join("input.txt").exists());
}

fn coverage_exit(dir: &Path, mode: &str) -> Output {
    run(env!("CARGO_BIN_EXE_coverage_exit"), &[mode], dir, b"")
}

fn persisted_coverage(dir: &Path) -> String {
    fs::read_to_string(dir.join("c2rust_cov.txt")).unwrap()
}

#[test]
fn test_coverage_reported_on_return() {
    let dir = tempfile::tempdir().unwrap();

    let output = coverage_exit(dir.path(), "return");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(persisted_coverage(dir.path()), "25.00\n");
}

#[test]
fn test_coverage_reported_on_process_exit() {
    let dir = tempfile::tempdir().unwrap();

    let output = coverage_exit(dir.path(), "exit");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(persisted_coverage(dir.path()), "25.00\n");
}

#[test]
fn test_coverage_reported_on_panic() {
    let dir = tempfile::tempdir().unwrap();

    let output = coverage_exit(dir.path(), "panic");
    assert!(!output.status.success());
    // the default hook still runs before coverage is written
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("target crashed"));
    assert_eq!(persisted_coverage(dir.path()), "25.00\n");
}
