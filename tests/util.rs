#![allow(dead_code)]
use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

pub const SUCCESS: i32 = 0;
pub const USAGE_ERROR: i32 = 64;
pub const STATIC_ERROR: i32 = 65;
pub const RUNTIME_ERROR: i32 = 70;

pub struct Run {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

/// Writes `source` to a temp file and runs it through the `lox` binary,
/// mirroring the one-argument CLI surface (spec §6).
pub fn run_source(source: &str) -> Run {
    let mut file = NamedTempFile::new().expect("failed to create temp script file");
    write!(file, "{source}").expect("failed to write temp script file");

    let mut cmd = Command::cargo_bin("lox").expect("lox binary not found");
    cmd.arg(file.path());
    let output = cmd.output().expect("failed to run lox binary");

    Run {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().unwrap_or(-1),
    }
}
