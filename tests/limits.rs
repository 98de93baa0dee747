use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

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

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] repeats forever
}

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_step_limit_flag() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .arg(tf.path())
        .arg("--max-steps").arg("50")
        .timeout(Duration::from_secs(2))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_step_limit_env() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .env("BF_MAX_STEPS", "50")
        .arg(tf.path())
        .timeout(Duration::from_secs(2))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_flag_beats_env() {
    let tf = program_file("+.");
    cargo_bin()
        .env("BF_MEMORY", "0")
        .arg(tf.path())
        .arg("-m").arg("4")
        .assert()
        .success()
        .stdout("\u{1}");
}

#[test]
fn test_config_file_settings() {
    let config = program_file("[interpreter]\nmax_steps = 10\ndump = \"hex\"\n");
    let tf = program_file(infinite_bf());
    cargo_bin()
        .env("BF_CONFIG", config.path())
        .arg(tf.path())
        .timeout(Duration::from_secs(2))
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("step limit exceeded (10)")
                .and(predicate::str::contains("0000: 01 ")),
        );
}

#[test]
fn test_bad_config_value_warns_when_verbose() {
    let config = program_file("[interpreter]\nmemory_size = lots\n");
    let tf = program_file("+.");
    cargo_bin()
        .env("BF_CONFIG", config.path())
        .arg(tf.path())
        .arg("-v")
        .assert()
        .success()
        .stdout("\u{1}")
        .stderr(predicate::str::contains("WARN ignoring memory_size"));
}
