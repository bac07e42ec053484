//! Reconciliation Integration Tests
//!
//! Drives the reconciler against temporary library trees and checks the
//! resulting trailer folders.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::Result;
use chrono::{Duration, Utc};
use filetime::FileTime;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use trailer_sync::domain::{LibraryItem, ReconcileReport, RunOutcome};
use trailer_sync::library::{ItemQuery, Library};
use trailer_sync::trailers::{TrailerConfig, TrailerReconciler};

/// Test library with trailer URLs keyed by item name
#[derive(Default)]
struct TestLibrary {
    urls: HashMap<String, String>,
    broken: Vec<String>,
}

impl TestLibrary {
    fn with_url(mut self, name: &str, url: &str) -> Self {
        self.urls.insert(name.to_string(), url.to_string());
        self
    }

    fn with_broken(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }
}

impl Library for TestLibrary {
    fn candidate_items(&self, _query: &ItemQuery) -> Result<Vec<LibraryItem>> {
        Ok(Vec::new())
    }

    fn resolve_trailer_url(&self, item: &LibraryItem) -> Result<Option<String>> {
        if self.broken.contains(&item.name) {
            anyhow::bail!("provider unavailable for {}", item.name);
        }
        Ok(self.urls.get(&item.name).cloned())
    }
}

fn reconciler() -> TrailerReconciler {
    TrailerReconciler::new(TrailerConfig::enabled("MetaTube"))
}

fn run(library: &TestLibrary, items: &[LibraryItem]) -> ReconcileReport {
    match reconciler().reconcile(library, items, &CancellationToken::new(), &|_: f64| {}) {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    }
}

/// Item saved an hour ago, living in `<root>/<folder>`
fn item(root: &Path, folder: &str, name: &str) -> LibraryItem {
    LibraryItem::new(name, root.join(folder), Utc::now() - Duration::hours(1))
        .with_provider_id("MetaTube", folder)
}

fn set_mtime(path: &Path, time: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(time)).unwrap();
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn checksum(path: &Path) -> String {
    hex::encode(Sha256::digest(fs::read(path).unwrap()))
}

fn trailers(root: &Path, folder: &str) -> PathBuf {
    root.join(folder).join("trailers")
}

#[test]
fn test_writes_first_word_trailer() {
    let temp = TempDir::new().unwrap();
    let library = TestLibrary::default()
        .with_url("Inception Director's Cut", "https://example.com/t.mp4");
    let items = vec![item(temp.path(), "Inception", "Inception Director's Cut")];

    let report = run(&library, &items);

    let artifact = trailers(temp.path(), "Inception").join("Inception-Trailer.strm");
    assert_eq!(report.written, 1);
    assert_eq!(fs::read(&artifact).unwrap(), b"https://example.com/t.mp4");

    let entries: Vec<_> = fs::read_dir(trailers(temp.path(), "Inception"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1, "exactly one artifact expected");
}

#[test]
fn test_artifact_has_no_byte_order_mark() {
    let temp = TempDir::new().unwrap();
    let url = "https://example.com/trailers/電影.mp4";
    let library = TestLibrary::default().with_url("Ran", url);
    let items = vec![item(temp.path(), "Ran", "Ran")];

    run(&library, &items);

    let bytes = fs::read(trailers(temp.path(), "Ran").join("Ran-Trailer.strm")).unwrap();
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    assert_eq!(bytes, url.as_bytes());
}

#[test]
fn test_second_run_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let library = TestLibrary::default()
        .with_url("Heat", "https://example.com/heat.mp4")
        .with_url("Ronin", "https://example.com/ronin.mp4");
    let items = vec![
        item(temp.path(), "Heat", "Heat"),
        item(temp.path(), "Ronin", "Ronin"),
        item(temp.path(), "Thief", "Thief"),
    ];

    let first = run(&library, &items);
    assert_eq!(first.written, 2);

    let heat = trailers(temp.path(), "Heat").join("Heat-Trailer.strm");
    let before = (mtime(&heat), checksum(&heat));

    let second = run(&library, &items);

    assert_eq!(second.written, 0);
    assert_eq!(second.up_to_date, 2);
    assert_eq!(second.no_trailer, 1);
    assert_eq!(before, (mtime(&heat), checksum(&heat)));
    assert!(!trailers(temp.path(), "Thief").exists());
}

#[test]
fn test_stale_artifact_is_rewritten() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    let artifact = folder.join("Heat-Trailer.strm");
    fs::write(&artifact, "https://example.com/old-and-much-longer-url.mp4").unwrap();
    set_mtime(&artifact, SystemTime::now() - std::time::Duration::from_secs(86_400));

    let library = TestLibrary::default().with_url("Heat", "https://example.com/new.mp4");
    let items = vec![item(temp.path(), "Heat", "Heat")];

    let report = run(&library, &items);

    assert_eq!(report.written, 1);
    assert_eq!(fs::read_to_string(&artifact).unwrap(), "https://example.com/new.mp4");
}

#[test]
fn test_newer_artifact_is_left_untouched() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    let artifact = folder.join("Heat-Trailer.strm");
    fs::write(&artifact, "https://example.com/hand-edited.mp4").unwrap();
    set_mtime(&artifact, SystemTime::now() - std::time::Duration::from_secs(600));
    let before = (mtime(&artifact), checksum(&artifact));

    let library = TestLibrary::default().with_url("Heat", "https://example.com/new.mp4");
    let items = vec![item(temp.path(), "Heat", "Heat")];

    let report = run(&library, &items);

    assert_eq!(report.up_to_date, 1);
    assert_eq!(before, (mtime(&artifact), checksum(&artifact)));
}

#[test]
fn test_missing_url_prunes_trailers_and_folder() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("Heat-Trailer.strm"), "https://old").unwrap();
    fs::write(folder.join("Heat1995-Trailer.strm"), "https://older").unwrap();

    let library = TestLibrary::default();
    let items = vec![item(temp.path(), "Heat", "Heat")];

    let report = run(&library, &items);

    assert_eq!(report.pruned_files, 2);
    assert_eq!(report.removed_folders, 1);
    assert!(!folder.exists());
    assert!(temp.path().join("Heat").exists());
}

#[test]
fn test_blank_url_prunes_like_missing_url() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("Heat-Trailer.strm"), "https://old").unwrap();

    let library = TestLibrary::default().with_url("Heat", " \t\n");
    let items = vec![item(temp.path(), "Heat", "Heat")];

    run(&library, &items);

    assert!(!folder.exists());
}

#[test]
fn test_pruning_keeps_unrelated_files_and_folder() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("Heat-Trailer.strm"), "https://old").unwrap();
    fs::write(folder.join("Heat-Trailer.mkv"), "local trailer").unwrap();

    let library = TestLibrary::default();
    let items = vec![item(temp.path(), "Heat", "Heat")];

    let report = run(&library, &items);

    assert_eq!(report.pruned_files, 1);
    assert_eq!(report.removed_folders, 0);
    assert!(!folder.join("Heat-Trailer.strm").exists());
    assert!(folder.join("Heat-Trailer.mkv").exists());
}

#[test]
fn test_ignore_marker_freezes_folder() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join(".ignore"), "").unwrap();
    fs::write(folder.join("Heat-Trailer.strm"), "https://kept").unwrap();

    let items = vec![item(temp.path(), "Heat", "Heat")];

    // No URL: nothing deleted
    let report = run(&TestLibrary::default(), &items);
    assert_eq!(report.ignored, 1);
    assert_eq!(
        fs::read_to_string(folder.join("Heat-Trailer.strm")).unwrap(),
        "https://kept"
    );

    // With a URL: nothing written either
    let library = TestLibrary::default().with_url("Heat", "https://example.com/new.mp4");
    let mut newer = items[0].clone();
    newer.date_last_saved = (Utc::now() + Duration::hours(1)).fixed_offset();
    let report = run(&library, &[newer]);
    assert_eq!(report.ignored, 1);
    assert_eq!(
        fs::read_to_string(folder.join("Heat-Trailer.strm")).unwrap(),
        "https://kept"
    );
}

#[test]
fn test_ignored_empty_folder_is_not_removed() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join(".ignore"), "").unwrap();

    run(&TestLibrary::default(), &[item(temp.path(), "Heat", "Heat")]);

    assert!(folder.join(".ignore").exists());
}

#[test]
fn test_item_failures_do_not_stop_the_run() {
    let temp = TempDir::new().unwrap();
    let library = TestLibrary::default()
        .with_url("", "https://example.com/nameless.mp4")
        .with_url("Ronin", "https://example.com/ronin.mp4")
        .with_broken("Heat");

    let items = vec![
        item(temp.path(), "Nameless", ""),
        item(temp.path(), "Heat", "Heat"),
        item(temp.path(), "Ronin", "Ronin"),
    ];

    let report = run(&library, &items);

    assert_eq!(report.failed, 2);
    assert_eq!(report.written, 1);
    assert!(!trailers(temp.path(), "Nameless").exists());
    assert!(trailers(temp.path(), "Ronin").join("Ronin-Trailer.strm").exists());
}

#[test]
fn test_unwritable_item_folder_is_a_per_item_failure() {
    let temp = TempDir::new().unwrap();
    // A regular file where the item folder should be
    fs::write(temp.path().join("Heat"), "not a folder").unwrap();

    let library = TestLibrary::default()
        .with_url("Heat", "https://example.com/heat.mp4")
        .with_url("Ronin", "https://example.com/ronin.mp4");
    let items = vec![
        item(temp.path(), "Heat", "Heat"),
        item(temp.path(), "Ronin", "Ronin"),
    ];

    let report = run(&library, &items);

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 1);
}

#[test]
fn test_disabled_run_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let folder = trailers(temp.path(), "Heat");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("Heat-Trailer.strm"), "https://old").unwrap();

    let seen = Mutex::new(Vec::new());
    let progress = |p: f64| seen.lock().unwrap().push(p);

    let outcome = TrailerReconciler::new(TrailerConfig::default()).reconcile(
        &TestLibrary::default(),
        &[item(temp.path(), "Heat", "Heat")],
        &CancellationToken::new(),
        &progress,
    );

    assert_eq!(outcome, RunOutcome::Disabled);
    assert_eq!(*seen.lock().unwrap(), vec![0.0]);
    assert!(folder.join("Heat-Trailer.strm").exists());
}
