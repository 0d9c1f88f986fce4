//! Integration tests for the FileVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords are supplied through `FILEVAULT_PASSWORD` so no test ever
//! reaches an interactive prompt.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the filevault binary.
fn filevault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("filevault").expect("binary should exist")
}

#[test]
fn help_flag_shows_usage() {
    filevault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Encrypted file vault with per-file passwords",
        ))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn version_flag_shows_version() {
    filevault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("filevault"));
}

#[test]
fn no_args_shows_help() {
    filevault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn list_on_fresh_directory_is_empty() {
    let tmp = TempDir::new().unwrap();

    filevault()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("The vault is empty"));

    tmp.child("vault_data").assert(predicate::path::is_dir());
}

#[test]
fn add_list_export_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.child("hello.txt");
    source.write_str("hello, vault").unwrap();

    filevault()
        .args(["add", "hello.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted 'hello.txt'"));
    source.assert(predicate::path::missing());

    filevault()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hello.txt"))
        .stdout(predicate::str::contains("12 B"));

    filevault()
        .args(["export", "0", "restored.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "wrong-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password"));

    filevault()
        .args(["export", "0", "restored.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .success();
    tmp.child("restored.txt").assert("hello, vault");

    filevault()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("The vault is empty"));
}

#[test]
fn add_rejects_short_password() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.child("a.txt");
    source.write_str("data").unwrap();

    filevault()
        .args(["add", "a.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    source.assert("data");
}

#[test]
fn remove_with_force_deletes_entry() {
    let tmp = TempDir::new().unwrap();
    tmp.child("a.txt").write_str("data").unwrap();

    filevault()
        .args(["add", "a.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .success();

    filevault()
        .args(["remove", "0", "--force"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'a.txt'"));

    filevault()
        .args(["show", "0"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No vault entry matches"));
}

#[test]
fn custom_vault_dir_flag_is_used() {
    let tmp = TempDir::new().unwrap();

    filevault()
        .args(["--vault-dir", "elsewhere", "list"])
        .current_dir(tmp.path())
        .assert()
        .success();

    tmp.child("elsewhere").assert(predicate::path::is_dir());
    tmp.child("vault_data").assert(predicate::path::missing());
}

#[test]
fn export_refuses_roundabout_path_into_vault() {
    let tmp = TempDir::new().unwrap();
    tmp.child("a.txt").write_str("data").unwrap();

    filevault()
        .args(["add", "a.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .success();

    filevault()
        .args(["export", "0", "vault_data/../vault_data/files/plain.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to export into the vault"));

    tmp.child("vault_data/files/plain.txt")
        .assert(predicate::path::missing());
    filevault()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"));
}

#[test]
fn audit_shows_failed_export_for_entry() {
    let tmp = TempDir::new().unwrap();
    tmp.child("a.txt").write_str("data").unwrap();

    filevault()
        .args(["add", "a.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "correct-horse")
        .assert()
        .success();

    filevault()
        .args(["export", "0", "out.txt"])
        .current_dir(tmp.path())
        .env("FILEVAULT_PASSWORD", "not-the-password")
        .assert()
        .failure();

    filevault()
        .args(["audit", "--failed"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 audit events, 1 failed"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("a.txt"));

    filevault()
        .args(["audit", "--op", "add"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 audit events"))
        .stdout(predicate::str::contains("4 B"));
}

#[test]
fn audit_rejects_unknown_operation() {
    let tmp = TempDir::new().unwrap();

    filevault()
        .args(["audit", "--op", "delete"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown operation"));
}
