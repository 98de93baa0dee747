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
fn test_ascii_dump_goes_to_stderr() {
    let tf = program_file(&format!("{}.>++", "+".repeat(65)));
    cargo_bin()
        .arg(tf.path())
        .arg("--dump").arg("ascii")
        .assert()
        .success()
        .stdout("A")
        .stderr(predicate::str::contains("0000:  A  ."));
}

#[test]
fn test_bare_dump_flag_means_hex() {
    let tf = program_file(&format!("{}>++", "+".repeat(65)));
    cargo_bin()
        .arg(tf.path())
        .arg("-d")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("0000: 41 02 00"));
}

#[test]
fn test_verbose_logs_config_on_stderr() {
    let tf = program_file("+.");
    cargo_bin()
        .arg(tf.path())
        .arg("-v")
        .assert()
        .success()
        .stdout("\u{1}")
        .stderr(
            predicate::str::contains("INFO parsed config")
                .and(predicate::str::contains("memory size: 512 cells"))
                .and(predicate::str::contains("DBUG").not()),
        );
}

#[test]
fn test_double_verbose_adds_debug_summary() {
    let tf = program_file(">>+");
    cargo_bin()
        .arg(tf.path())
        .arg("-vv")
        .assert()
        .success()
        .stderr(predicate::str::contains("DBUG executed 3 instructions"));
}

#[test]
fn test_trace_table_on_stderr() {
    let tf = program_file(">");
    cargo_bin()
        .arg(tf.path())
        .arg("--trace")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("STEP | POS")
                .and(predicate::str::contains("Moved pointer head to index 1")),
        );
}
