//! Shared harness for CLI integration tests: runs the `cyp` binary in an
//! isolated working directory and keeps a per-case log for failure triage.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tempfile::TempDir;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// Run `cyp` with `args` inside a fresh empty directory, so no model artifact
/// or config is picked up unless the case provides one.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    let workdir = TempDir::new().expect("create workdir");
    run_cli_case_in(case_name, args, workdir.path())
}

/// Run `cyp` with `args` using `workdir` as the current directory.
pub fn run_cli_case_in(case_name: &str, args: &[&str], workdir: &Path) -> CmdResult {
    let output = Command::new(env!("CARGO_BIN_EXE_cyp"))
        .args(args)
        .current_dir(workdir)
        .env_remove("CYP_CONFIG")
        .env_remove("CYP_MODEL_PATH")
        .env("NO_COLOR", "1")
        .output()
        .expect("spawn cyp");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let log_path = write_case_log(case_name, args, &output.status, &stdout, &stderr);

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

fn write_case_log(
    case_name: &str,
    args: &[&str],
    status: &ExitStatus,
    stdout: &str,
    stderr: &str,
) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    std::fs::create_dir_all(&dir).expect("create case log dir");
    let path = dir.join(format!("{case_name}.log"));

    let mut log = String::new();
    let _ = writeln!(log, "args: {args:?}");
    let _ = writeln!(log, "status: {status}");
    let _ = writeln!(log, "--- stdout ---\n{stdout}");
    let _ = writeln!(log, "--- stderr ---\n{stderr}");
    std::fs::write(&path, log).expect("write case log");
    path
}

/// A regression tree that predicts 2.5 for every row.
pub const CONSTANT_MODEL: &str =
    r#"{"format_version": 1, "name": "constant", "root": {"kind": "leaf", "value": 2.5}}"#;
