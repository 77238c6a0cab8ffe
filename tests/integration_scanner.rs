//! Integration tests for scanning real directories.
//!
//! These tests walk temporary directories with the filesystem scanner and
//! feed the found files to the duplicate pipeline:
//! - Content scans over real file digests
//! - Filename scans over a nested tree
//! - Reference directories and nonexistent paths
//! - Settings that need audio metadata

use assert_fs::prelude::*;
use assert_fs::TempDir;
use dupe_scan::core::grouping::PriorityPolicy;
use dupe_scan::core::item::{FileItem, ScanItem};
use dupe_scan::core::pipeline::Scanner;
use dupe_scan::core::scanner::{ItemSource, ScanConfig, WalkDirScanner};
use dupe_scan::core::tokenizer::ScanType;
use dupe_scan::error::{DupeFinderError, ScanError};
use dupe_scan::events::{Event, EventChannel, NullSink, ScanEvent};
use predicates::prelude::*;
use std::path::Path;

fn walk(root: &Path, config: ScanConfig) -> Vec<FileItem> {
    let outcome = WalkDirScanner::new(config)
        .scan(&[root.to_path_buf()])
        .unwrap();
    assert!(outcome.errors.is_empty());
    outcome.items
}

fn names_of(items: &[FileItem], ids: impl IntoIterator<Item = dupe_scan::core::item::ItemId>) -> Vec<String> {
    let mut names: Vec<String> = ids
        .into_iter()
        .map(|id| items[id.index()].name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn content_scan_finds_identical_files() {
    let temp = TempDir::new().unwrap();
    temp.child("a/song.mp3").write_str("same payload").unwrap();
    temp.child("b/other name.mp3").write_str("same payload").unwrap();
    temp.child("c/different.mp3").write_str("other payload").unwrap();
    temp.child("c/same size.mp3").write_str("same paylaod").unwrap();

    let items = walk(temp.path(), ScanConfig::default());
    assert_eq!(items.len(), 4);

    let result = Scanner::builder()
        .scan_type(ScanType::Content)
        .build()
        .find_groups(&items, &NullSink)
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        names_of(&items, result.groups[0].members().iter().copied()),
        vec!["other name.mp3", "song.mp3"]
    );
}

#[test]
fn content_scan_handles_files_above_the_mmap_threshold() {
    let temp = TempDir::new().unwrap();
    let payload = vec![7u8; 2 * 1024 * 1024];
    let mut altered = payload.clone();
    *altered.last_mut().unwrap() = 8;

    temp.child("big.bin").write_binary(&payload).unwrap();
    temp.child("big copy.bin").write_binary(&payload).unwrap();
    temp.child("big altered.bin").write_binary(&altered).unwrap();

    let items = walk(temp.path(), ScanConfig::default());
    let result = Scanner::builder()
        .scan_type(ScanType::Content)
        .build()
        .find_groups(&items, &NullSink)
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.len(), 2);
    assert_eq!(items[group.reference().index()].name(), "big.bin");
}

#[test]
fn filename_scan_over_nested_tree() {
    let temp = TempDir::new().unwrap();
    temp.child("music/The White Stripes - Seven Nation Army.mp3").write_str("1").unwrap();
    temp.child("music/old/The White Stripes - Seven Nation Army (1).mp3").write_str("22").unwrap();
    temp.child("music/Limp Bizkit - Rollin.mp3").write_str("333").unwrap();
    temp.child("music/.hidden/The White Stripes - Seven Nation Army.mp3").write_str("4444").unwrap();

    let items = walk(temp.path(), ScanConfig::default());
    assert_eq!(items.len(), 3);

    let result = Scanner::builder().build().find_groups(&items, &NullSink).unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    let reference = &items[group.reference().index()];
    // Bigger file wins
    assert_eq!(reference.size(), 2);
    let parent = reference.path().parent().unwrap().to_string_lossy().into_owned();
    assert!(predicate::str::ends_with("old").eval(parent.as_str()));
}

#[test]
fn reference_directories_are_kept() {
    let temp = TempDir::new().unwrap();
    let library = temp.child("library");
    library.child("track.mp3").write_str("x").unwrap();
    temp.child("incoming/track.mp3").write_str("xx").unwrap();

    let items = walk(
        temp.path(),
        ScanConfig {
            reference_paths: vec![library.path().to_path_buf()],
            ..Default::default()
        },
    );
    let result = Scanner::builder().build().find_groups(&items, &NullSink).unwrap();

    let group = &result.groups[0];
    let reference = &items[group.reference().index()];
    assert!(reference.is_reference());
    assert!(reference.path().starts_with(library.path()));
    library.child("track.mp3").assert(predicate::path::exists());
}

#[test]
fn scan_events_report_found_items() {
    let temp = TempDir::new().unwrap();
    temp.child("one.mp3").touch().unwrap();
    temp.child("two.mp3").touch().unwrap();

    let (sender, receiver) = EventChannel::new();
    let outcome = WalkDirScanner::new(ScanConfig::default())
        .scan_with_events(&[temp.path().to_path_buf()], &sender)
        .unwrap();
    drop(sender);

    let events: Vec<Event> = receiver.iter().collect();
    let found = events
        .iter()
        .filter(|event| matches!(event, Event::Scan(ScanEvent::ItemFound { .. })))
        .count();
    assert_eq!(found, outcome.items.len());
    assert!(matches!(
        events.last(),
        Some(Event::Scan(ScanEvent::Completed { total_items: 2 }))
    ));
}

#[test]
fn nonexistent_root_is_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    temp.child("song.mp3").write_str("a").unwrap();
    let missing = temp.child("missing");
    missing.assert(predicate::path::missing());

    let outcome = WalkDirScanner::new(ScanConfig::default())
        .scan(&[missing.path().to_path_buf(), temp.path().to_path_buf()])
        .unwrap();

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        &outcome.errors[0],
        ScanError::DirectoryNotFound { path } if path == missing.path()
    ));
}

#[test]
fn audio_metadata_settings_are_refused_for_files() {
    let source = WalkDirScanner::new(ScanConfig::default());
    let refused = [
        Scanner::builder().scan_type(ScanType::Tag).build(),
        Scanner::builder().scan_type(ScanType::ContentAudio).build(),
        Scanner::builder().priority(PriorityPolicy::BitrateThenSize).build(),
    ];
    for scanner in &refused {
        assert!(matches!(
            source.check_config(scanner.config()),
            Err(DupeFinderError::Config(_))
        ));
    }

    for scan_type in [ScanType::Filename, ScanType::Fields, ScanType::FieldsNoOrder, ScanType::Content] {
        let scanner = Scanner::builder().scan_type(scan_type).build();
        assert!(source.check_config(scanner.config()).is_ok());
    }
}
