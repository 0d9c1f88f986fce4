//! Integration tests for secure erase against the real filesystem.

use std::fs;

use filevault::erase::{erase, secure_erase, CHUNK_SIZE};
use filevault::errors::FileVaultError;
use tempfile::TempDir;

#[test]
fn erase_removes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.txt");
    fs::write(&path, b"top secret").unwrap();

    secure_erase(&path).expect("erase should succeed");
    assert!(!path.exists());
}

#[test]
fn erase_handles_multi_chunk_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.bin");
    fs::write(&path, vec![0x5Au8; CHUNK_SIZE * 3 + 17]).unwrap();

    assert!(erase(&path));
    assert!(!path.exists());
}

#[test]
fn erase_handles_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty");
    fs::write(&path, b"").unwrap();

    assert!(erase(&path));
    assert!(!path.exists());
}

#[test]
fn erase_missing_file_reports_false() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent");

    assert!(!erase(&path));
    assert!(matches!(
        secure_erase(&path),
        Err(FileVaultError::InvalidInput(_))
    ));
}

#[test]
fn erase_refuses_directories() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        secure_erase(dir.path()),
        Err(FileVaultError::InvalidInput(_))
    ));
    assert!(dir.path().exists());
}

#[cfg(unix)]
#[test]
fn erase_refuses_symlinks_and_keeps_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("target.txt");
    let link = dir.path().join("link.txt");
    fs::write(&target, b"keep me").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert!(!erase(&link));
    assert_eq!(fs::read(&target).unwrap(), b"keep me");
}
