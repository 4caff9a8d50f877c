//! # Binary Smoke Test
//!
//! Purpose: Run the actual `kvbench` binary as a subprocess against a small transaction budget
//! and confirm it exits cleanly and prints at least one report line, matching the teacher's own
//! "exercise the real binary as a subprocess" integration-test discipline.

use std::process::Command;

#[test]
fn runs_to_completion_against_a_small_budget() {
    let exe = env!("CARGO_BIN_EXE_kvbench");
    let output = Command::new(exe)
        .env("KVBENCH_MODE", "sync")
        .env("KVBENCH_WORKERS", "2")
        .env("KVBENCH_RECORDS", "1000")
        .env("KVBENCH_READ_PCT", "50")
        .env("KVBENCH_TX_BUDGET", "50")
        .env("KVBENCH_LATENCY", "false")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run kvbench binary");

    assert!(
        output.status.success(),
        "kvbench exited with {:?}, stderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("read(") || stdout.contains("write("),
        "expected at least one report line, got: {stdout}"
    );
}

#[test]
fn rejects_an_invalid_environment_with_a_nonzero_exit() {
    let exe = env!("CARGO_BIN_EXE_kvbench");
    let output = Command::new(exe)
        .env("KVBENCH_READ_PCT", "250")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run kvbench binary");

    assert!(!output.status.success());
}
