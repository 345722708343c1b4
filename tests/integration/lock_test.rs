use std::fs;
use std::path::Path;

use predicates::prelude::*;
use setver::files::lock::{self, LockError, LockFile};
use tempfile::TempDir;

use crate::helpers::TestSite;

#[test]
fn lock_path_for_appends_key_and_extension() {
    let path = Path::new("/srv/site/options.toml");
    let lock_path = lock::lock_path_for(path, "setver_version");
    assert_eq!(
        lock_path,
        Path::new("/srv/site/options.toml.setver_version.lock")
    );
}

#[test]
fn acquire_writes_our_pid() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");

    let _guard = LockFile::acquire(&lock_path).unwrap();

    let info = lock::read_lock(&lock_path).unwrap();
    assert_eq!(info.pid, std::process::id());
}

#[test]
fn dropping_the_guard_removes_the_file() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");

    let guard = LockFile::acquire(&lock_path).unwrap();
    assert_eq!(guard.path(), lock_path.as_path());
    drop(guard);

    assert!(!lock_path.exists());
}

#[test]
fn second_acquire_is_refused_while_held() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");

    let _guard = LockFile::acquire(&lock_path).unwrap();
    let err = LockFile::acquire(&lock_path).unwrap_err();

    assert!(matches!(err, LockError::Held { pid, .. } if pid == std::process::id()));
}

#[cfg(unix)]
#[test]
fn lock_of_dead_process_is_reclaimed() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");
    fs::write(
        &lock_path,
        r#"{"pid":999999999,"started":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert!(lock::read_lock(&lock_path).is_none());

    let _guard = LockFile::acquire(&lock_path).unwrap();
    assert_eq!(
        lock::read_lock(&lock_path).map(|info| info.pid),
        Some(std::process::id())
    );
}

#[cfg(unix)]
#[test]
fn leftover_lock_file_from_crashed_run_is_reclaimed() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");
    fs::write(&lock_path, "").unwrap();

    let _guard = LockFile::acquire(&lock_path).unwrap();
    assert_eq!(
        lock::read_lock(&lock_path).map(|info| info.pid),
        Some(std::process::id())
    );
}

#[cfg(unix)]
#[test]
fn late_reclaimer_cannot_displace_the_new_owner() {
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("store.lock");
    let dead_owner = r#"{"pid":999999999,"started":"2025-01-01T00:00:00Z"}"#;
    fs::write(&lock_path, dead_owner).unwrap();

    // Both callers observe the dead owner before either acts.
    assert!(lock::read_lock(&lock_path).is_none());

    let first = LockFile::acquire(&lock_path).unwrap();
    let second = LockFile::acquire(&lock_path);

    assert!(matches!(second, Err(LockError::Held { pid, .. }) if pid == std::process::id()));
    assert!(lock_path.exists());
    drop(first);
    assert!(!lock_path.exists());
}

#[cfg(unix)]
#[test]
fn second_process_is_refused_after_stale_reclaim() {
    let site = TestSite::new();
    site.write_config("", &[site.append(1, "one")]);
    let lock_path = lock::lock_path_for(&site.store_path(), "setver_version");
    fs::write(
        &lock_path,
        r#"{"pid":999999999,"started":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    let _guard = LockFile::acquire(&lock_path).unwrap();

    site.cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("held by running process"));

    assert!(site.log().is_empty());
    assert!(lock_path.exists());
}

#[test]
fn run_refuses_to_start_while_another_process_holds_the_lock() {
    let site = TestSite::new();
    site.write_config("", &[site.append(1, "one")]);
    let _guard =
        LockFile::acquire(&lock::lock_path_for(&site.store_path(), "setver_version")).unwrap();

    site.cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("held by running process"));

    assert!(site.log().is_empty());
}

#[test]
fn run_without_lock_ignores_lock_file() {
    let site = TestSite::new();
    site.write_config("[engine]\nlock = false\n", &[site.append(1, "one")]);
    let _guard =
        LockFile::acquire(&lock::lock_path_for(&site.store_path(), "setver_version")).unwrap();

    site.cmd().arg("run").assert().success();

    assert_eq!(site.log(), vec!["one"]);
}
