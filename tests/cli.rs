mod util;

use assert_cmd::Command;
use predicates::str::contains;
use util::USAGE_ERROR;

#[test]
fn too_many_arguments_prints_usage_and_exits_64() {
    let mut cmd = Command::cargo_bin("lox").expect("lox binary not found");
    cmd.args(["one.lox", "two.lox"]);
    cmd.assert().failure().code(USAGE_ERROR).stderr("Usage: lox [script]\n");
}

#[test]
fn missing_script_file_fails() {
    let mut cmd = Command::cargo_bin("lox").expect("lox binary not found");
    cmd.arg("/nonexistent/path/does-not-exist.lox");
    cmd.assert().failure().stderr(contains("could not read file"));
}
