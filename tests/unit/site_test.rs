//! Unit tests for site maintenance wired into gated runs

use std::fs;

use setver::site::{IconOutcome, SITE_ICON_KEY};
use setver::{Engine, FileStore, MemoryStore, OptionStore, SiteMaintenance, UploadDir};
use tempfile::TempDir;

use crate::helpers::{contributor, CallLog};

fn site(dir: &TempDir) -> SiteMaintenance {
    let icon = dir.path().join("favicon.png");
    fs::write(&icon, b"png").unwrap();
    SiteMaintenance::new(UploadDir::new(dir.path().join("uploads"))).with_icon(icon)
}

#[test]
fn successful_run_uploads_icon_and_pins_home_page() {
    let dir = TempDir::new().unwrap();
    let log = CallLog::new();
    let mut engine = Engine::new().with_site(site(&dir).with_home_page(12));
    engine.contribute(contributor(&log, &[1], &[]));
    let mut store = FileStore::new(dir.path().join("options.toml"));

    let report = engine.run(&mut store).unwrap();

    let site = report.site.unwrap();
    assert_eq!(site.icon, IconOutcome::Uploaded);
    assert!(site.home_page_pinned);

    let asset = store.get_option(SITE_ICON_KEY).unwrap().unwrap();
    assert!(asset.starts_with("favicon-"));
    assert!(asset.ends_with(".png"));
    assert!(dir.path().join("uploads").join(&asset).is_file());
    assert_eq!(
        store.get_option("page_on_front").unwrap().as_deref(),
        Some("12")
    );
    assert_eq!(
        store.get_option("show_on_front").unwrap().as_deref(),
        Some("page")
    );
}

#[test]
fn site_steps_run_even_when_nothing_is_pending() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::new().with_site(site(&dir));
    let mut store = MemoryStore::from_pairs([("setver_version", "3"), ("home__page_id", "8")]);

    let report = engine.run(&mut store).unwrap();

    assert!(!report.advanced());
    assert_eq!(report.site.unwrap().icon, IconOutcome::Uploaded);
    assert_eq!(store.get("page_on_front"), Some("8"));
}

#[test]
fn second_run_leaves_site_options_alone() {
    let dir = TempDir::new().unwrap();
    let engine = Engine::new().with_site(site(&dir).with_home_page(3));
    let mut store = MemoryStore::new();

    engine.run(&mut store).unwrap();
    let writes = store.writes();
    let report = engine.run(&mut store).unwrap();

    let site = report.site.unwrap();
    assert_eq!(site.icon, IconOutcome::AlreadySet);
    assert!(!site.home_page_pinned);
    assert_eq!(store.writes(), writes);
}

#[test]
fn failed_run_skips_site_maintenance() {
    let dir = TempDir::new().unwrap();
    let log = CallLog::new();
    let mut engine = Engine::new().with_site(site(&dir).with_home_page(3));
    engine.contribute(contributor(&log, &[1], &[1]));
    let mut store = MemoryStore::new();

    assert!(engine.run(&mut store).is_err());
    assert_eq!(store.get(SITE_ICON_KEY), None);
    assert_eq!(store.get("page_on_front"), None);
}

#[test]
fn forced_run_does_not_touch_site_options() {
    let dir = TempDir::new().unwrap();
    let log = CallLog::new();
    let mut engine = Engine::new().with_site(site(&dir).with_home_page(3));
    engine.contribute(contributor(&log, &[1], &[]));

    engine.force_all(|_| {}).unwrap();

    assert!(!dir.path().join("uploads").exists());
}
