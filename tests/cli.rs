use assert_cmd::{cargo_bin_cmd, Command};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn wtrack(data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("wtrack");
    cmd.env_remove("RUST_LOG").arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn test_login_creates_account_and_whoami() {
    let dir = tempdir().unwrap();

    wtrack(dir.path())
        .args(["login", "ada", "--email", "ada@example.com"])
        .assert()
        .success()
        .stdout(contains("Created account for ada."))
        .stdout(contains("Week total: 0h 0min (0.0%)"));

    wtrack(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("ada <ada@example.com>"));

    assert!(dir.path().join("users.json").exists());
    assert!(dir.path().join("current_user.json").exists());
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn test_set_times_and_report() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();

    wtrack(dir.path())
        .args(["set", "mon", "1", "check-in", "9:00"])
        .assert()
        .success()
        .stdout(contains("#1 09:00 - --:--  0h 0min"));

    wtrack(dir.path())
        .args(["set", "1", "1", "check-out", "13:00"])
        .assert()
        .success()
        .stdout(contains("#1 09:00 - 13:00  4h 0min"))
        .stdout(contains("Week total: 4h 0min (26.7%)"));

    wtrack(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(contains("Weekly Report for ada"))
        .stdout(contains("Total Hours:         4h 0min"))
        .stdout(contains("Hours Remaining:     11h 0min"))
        .stdout(contains("26.7%"));
}

#[test]
fn test_sessions_add_remove_and_last_session_guard() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();

    wtrack(dir.path())
        .args(["remove-session", "friday", "1"])
        .assert()
        .failure()
        .stderr(contains("Friday must keep at least one session"));

    wtrack(dir.path())
        .args(["add-session", "fri"])
        .assert()
        .success()
        .stdout(contains("#2 --:-- - --:--"));

    wtrack(dir.path())
        .args(["set", "fri", "2", "check-in", "16:30"])
        .assert()
        .success();
    wtrack(dir.path())
        .args(["set", "fri", "2", "check-out", "19:00"])
        .assert()
        .success()
        .stdout(contains("#2 16:30 - 19:00  1h 30min"));

    wtrack(dir.path())
        .args(["remove-session", "fri", "1"])
        .assert()
        .success()
        .stdout(contains("#1 16:30 - 19:00  1h 30min"))
        .stdout(contains("#2").not());

    wtrack(dir.path())
        .args(["remove-session", "fri", "5"])
        .assert()
        .failure()
        .stderr(contains("Friday has no session #5"));
}

#[test]
fn test_clear_and_reset() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();
    wtrack(dir.path())
        .args(["set", "tue", "1", "check-in", "10:00"])
        .assert()
        .success();

    wtrack(dir.path())
        .args(["clear", "tue", "1"])
        .assert()
        .success()
        .stdout(contains("#1 --:-- - --:--"));

    wtrack(dir.path())
        .args(["set", "wed", "1", "check-in", "10:00"])
        .assert()
        .success();
    wtrack(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(contains("Week reset for ada."));
    wtrack(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(contains("#1 10:00").not());
}

#[test]
fn test_requires_login() {
    let dir = tempdir().unwrap();

    wtrack(dir.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(contains("Not logged in"));

    wtrack(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("Not logged in."));
}

#[test]
fn test_logout_and_login_restores_week() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();
    wtrack(dir.path())
        .args(["set", "thu", "1", "check-in", "08:00"])
        .assert()
        .success();
    wtrack(dir.path())
        .args(["set", "thu", "1", "check-out", "19:00"])
        .assert()
        .success();

    wtrack(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logged out ada."));
    assert!(!dir.path().join("current_user.json").exists());

    wtrack(dir.path())
        .args(["login", "ada", "--email", "someone@else.org"])
        .assert()
        .success()
        .stdout(contains("Welcome back, ada!"))
        .stdout(contains("Week total: 9h 0min (60.0%)"));

    wtrack(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("someone@else.org").not());
}

#[test]
fn test_input_validation() {
    let dir = tempdir().unwrap();

    wtrack(dir.path())
        .args(["login", "ada", "--email", "not-an-email"])
        .assert()
        .failure()
        .stderr(contains("Please enter a valid email"));

    wtrack(dir.path())
        .args(["login", "   "])
        .assert()
        .failure()
        .stderr(contains("Username is required"));

    wtrack(dir.path()).args(["login", "ada"]).assert().success();

    wtrack(dir.path())
        .args(["set", "mon", "1", "check-in", "25:00"])
        .assert()
        .failure()
        .stderr(contains("invalid time '25:00'"));

    wtrack(dir.path())
        .args(["set", "someday", "1", "check-in", "09:00"])
        .assert()
        .failure()
        .stderr(contains("unknown day"));

    wtrack(dir.path())
        .args(["set", "mon", "0", "check-in", "09:00"])
        .assert()
        .failure();
}

#[test]
fn test_corrupt_week_starts_fresh() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();
    wtrack(dir.path())
        .args(["set", "mon", "1", "check-in", "09:00"])
        .assert()
        .success();

    let weeks = dir.path().join("weeks");
    let entry = fs::read_dir(&weeks).unwrap().next().unwrap().unwrap();
    fs::write(entry.path(), "{ \"userId\": 42 ").unwrap();

    wtrack(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(contains("Total Hours:         0h 0min"))
        .stdout(contains("#1 09:00").not());
}

#[test]
fn test_users_are_isolated() {
    let dir = tempdir().unwrap();
    wtrack(dir.path()).args(["login", "ada"]).assert().success();
    wtrack(dir.path())
        .args(["set", "sat", "1", "check-in", "09:00"])
        .assert()
        .success();
    wtrack(dir.path())
        .args(["set", "sat", "1", "check-out", "18:00"])
        .assert()
        .success();

    wtrack(dir.path())
        .args(["login", "grace"])
        .assert()
        .success()
        .stdout(contains("Created account for grace."))
        .stdout(contains("Week total: 0h 0min"));

    wtrack(dir.path())
        .args(["login", "ada"])
        .assert()
        .success()
        .stdout(contains("Week total: 9h 0min"));
}
