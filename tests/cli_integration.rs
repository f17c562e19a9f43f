//! Integration tests for the `aw` binary.
//!
//! Each test runs the binary against a scratch directory with its own
//! home, so user configuration never leaks in.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn aw(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aw").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("ACTIONWORK_CONFIG")
        .env_remove("AW_LOG")
        .arg("--no-color")
        .arg("--cwd")
        .arg(dir.path());
    cmd
}

#[test]
fn version_prints_crate_version() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn default_action_lists_builtins() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("List available actions"));
}

#[test]
fn describe_shows_options() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .args(["describe", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: action"))
        .stdout(predicate::str::contains("-a, --all"));
}

#[test]
fn unknown_action_exits_two() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .arg("nope")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown action 'nope'"))
        .stderr(predicate::str::contains("caused by").not());
}

#[test]
fn bad_option_exits_two() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .args(["list", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn argument_mismatch_exits_one() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .arg("describe")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("describe: argument required"));
}

#[test]
fn trace_flag_prints_enter_and_exit() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .args(["--trace", "version"])
        .assert()
        .success()
        .stderr(predicate::str::contains("enter: version"))
        .stderr(predicate::str::contains("exit: version"));
}

#[test]
fn global_flag_after_action_goes_to_the_action() {
    let dir = TempDir::new().unwrap();
    aw(&dir)
        .args(["version", "--trace"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("enter:").not());
}

#[test]
fn global_config_enables_trace() {
    let dir = TempDir::new().unwrap();
    dir.child(".config/actionwork/config.toml")
        .write_str("trace = true\n")
        .unwrap();

    aw(&dir)
        .arg("version")
        .assert()
        .success()
        .stderr(predicate::str::contains("enter: version"));
}

#[test]
fn project_namespaces_and_abbreviations() {
    let dir = TempDir::new().unwrap();
    dir.child("actionwork.toml")
        .write_str(
            r#"
            [abbreviations]
            "d:" = "db:"

            [namespaces]
            "db:" = "Database maintenance"
            "#,
        )
        .unwrap();

    aw(&dir)
        .arg("namespaces")
        .assert()
        .success()
        .stdout(predicate::str::contains("db: (0) Database maintenance"));

    aw(&dir).args(["list", "d:"]).assert().success();

    aw(&dir)
        .args(["list", "x:"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown namespace 'x:'"));
}

#[test]
fn deprecated_project_config_warns() {
    let dir = TempDir::new().unwrap();
    dir.child(".actionwork/config.toml").write_str("").unwrap();

    aw(&dir)
        .arg("version")
        .assert()
        .success()
        .stderr(predicate::str::contains("deprecated config location"));
}

#[test]
fn broken_config_fails_startup() {
    let dir = TempDir::new().unwrap();
    dir.child("actionwork.toml").write_str("[abbreviations").unwrap();

    aw(&dir)
        .arg("version")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("actionwork.toml"));
}
