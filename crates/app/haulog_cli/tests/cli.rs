//! CLI binary tests. Anything touching the network is out of scope here;
//! these cover the offline commands against an isolated session file.

use assert_cmd::Command;
use predicates::prelude::*;

fn haulog() -> Command {
    Command::cargo_bin("haulog").unwrap()
}

#[test]
fn version_prints_name_and_version() {
    haulog()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("haulog_cli"));
}

#[test]
fn whoami_without_a_session_reports_not_logged_in() {
    let dir = tempfile::tempdir().unwrap();
    haulog()
        .env("HAULOG_STORE_PATH", dir.path().join("session.json"))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn logout_without_a_session_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    haulog()
        .env("HAULOG_STORE_PATH", dir.path().join("session.json"))
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("no active session"));
}
