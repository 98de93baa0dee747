use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf.toml")
        .env("NO_COLOR", "1")
        .env_remove("BF_MEMORY")
        .env_remove("BF_DUMP")
        .env_remove("BF_MAX_STEPS")
        .env_remove("BF_MAX_DEPTH");
    cmd
}

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_unmatched_close_bracket_underflows() {
    let tf = program_file("]");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("stack underflow").and(predicate::str::contains("^")));
}

#[test]
fn test_output_before_fault_is_kept() {
    let tf = program_file("+++.]+.");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout("\u{3}")
        .stderr(predicate::str::contains("at offset 4"));
}

#[test]
fn test_unterminated_skipped_loop() {
    let tf = program_file("[+");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unterminated loop"));
}

#[test]
fn test_unclosed_running_loop() {
    let tf = program_file("+[+");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 open loop(s)"));
}

#[test]
fn test_unreadable_source() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg(dir.path().join("missing.bf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read program"));
}

#[test]
fn test_zero_sized_tape() {
    let tf = program_file("+");
    cargo_bin()
        .arg(tf.path())
        .arg("-m").arg("0")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot allocate a tape of 0 cells"));
}

#[test]
fn test_nesting_limit_overflow() {
    let tf = program_file("+[[-]]");
    cargo_bin()
        .arg(tf.path())
        .arg("--max-depth").arg("1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stack overflow"));
}

#[test]
fn test_invalid_memory_value_is_usage_error() {
    let tf = program_file("+");
    cargo_bin()
        .arg(tf.path())
        .arg("--memory").arg("lots")
        .assert()
        .code(2);
}
