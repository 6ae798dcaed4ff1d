//! No-mock dataset loading tests over real temp files.
//!
//! Covers:
//! - Import following with visited-path deduplication
//! - Missing imports degrading to diagnostics
//! - Encoding detection and forced-encoding override
//! - Save/load round-trips of recognized fields
//! - Cancellation returning a partial aggregate

use idb_common::{DiagnosticLevel, Item, JobFlags, LocationFlags, TradeFlags};
use idb_core::{save, DatasetLoader, LoadStatus, LoaderConfig};
use idb_encoding::TextEncoding;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(&path, content).expect("write fixture");
    path
}

fn loader() -> DatasetLoader {
    DatasetLoader::new(LoaderConfig::default())
}

fn ids(records: &[Item]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn test_single_file_import_manifest() {
    // No body, one import declaration: loads zero records but the
    // import path still comes back
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "manifest.yml",
        "Footer:\n  Imports:\n    - Path: sub/a.yml\n",
    );

    let outcome = loader().load_file(&root).expect("load manifest");
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.imports, vec!["sub/a.yml".to_string()]);
}

#[test]
fn test_dataset_follows_imports_in_declaration_order() {
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "item_db.yml",
        "Body:\n  - Id: 100\nFooter:\n  Imports:\n    - Path: first.yml\n    - Path: second.yml\n",
    );
    write_file(tmp.path(), "first.yml", "- Id: 200\n- Id: 201\n");
    write_file(tmp.path(), "second.yml", "- Id: 300\n");

    let outcome = loader().load_dataset(&root).expect("load dataset");
    assert_eq!(ids(&outcome.records), vec![100, 200, 201, 300]);
    assert_eq!(outcome.visited.len(), 3);
    assert_eq!(outcome.status, LoadStatus::Complete);
}

#[test]
fn test_shared_import_contributes_once() {
    // Two documents import the same file; it may contribute only once
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Body:\n  - Id: 1\nFooter:\n  Imports:\n    - Path: mid.yml\n    - Path: shared.yml\n",
    );
    write_file(
        tmp.path(),
        "mid.yml",
        "Body:\n  - Id: 2\nFooter:\n  Imports:\n    - Path: shared.yml\n",
    );
    write_file(tmp.path(), "shared.yml", "- Id: 99\n");

    let outcome = loader().load_dataset(&root).expect("load dataset");
    assert_eq!(ids(&outcome.records), vec![1, 2, 99]);
    assert_eq!(
        outcome.records.iter().filter(|r| r.id == 99).count(),
        1,
        "shared import must contribute exactly once"
    );
}

#[test]
fn test_missing_import_is_skipped_with_diagnostic() {
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Body:\n  - Id: 10\nFooter:\n  Imports:\n    - Path: gone.yml\n    - Path: here.yml\n",
    );
    write_file(tmp.path(), "here.yml", "- Id: 20\n");

    let outcome = loader().load_dataset(&root).expect("load dataset");
    assert_eq!(ids(&outcome.records), vec![10, 20]);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.level == DiagnosticLevel::Warning && d.message.contains("not found")));
}

#[test]
fn test_missing_root_is_fatal() {
    let tmp = TempDir::new().expect("tempdir");
    let err = loader()
        .load_dataset(&tmp.path().join("nope.yml"))
        .expect_err("missing root must fail");
    assert!(matches!(err, idb_common::Error::FileNotFound { .. }));
}

#[test]
fn test_imports_resolve_against_roots_base_directory() {
    // mid.yml lives in sub/, but its import is authored relative to
    // the root's directory
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Footer:\n  Imports:\n    - Path: sub/mid.yml\n",
    );
    write_file(
        tmp.path(),
        "sub/mid.yml",
        "Body:\n  - Id: 7\nFooter:\n  Imports:\n    - Path: leaf.yml\n",
    );
    write_file(tmp.path(), "leaf.yml", "- Id: 8\n");

    let outcome = loader().load_dataset(&root).expect("load dataset");
    assert_eq!(ids(&outcome.records), vec![7, 8]);
}

#[test]
fn test_gb18030_content_detected_and_decoded() {
    let tmp = TempDir::new().expect("tempdir");
    let yaml = "- Id: 501\n  Name: 红色药水красный\n  Script: 治疗药水恢复生命值使用后生效药效持续一段时间\n";
    let (bytes, _, _) = encoding_rs::GB18030.encode(yaml);
    let path = tmp.path().join("cn.yml");
    fs::write(&path, &bytes).expect("write gb18030 fixture");

    let outcome = loader().load_file(&path).expect("load gb18030 file");
    assert_eq!(outcome.encoding, TextEncoding::Gb18030);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].name.starts_with("红色药水"));
}

#[test]
fn test_forced_encoding_overrides_detection() {
    let tmp = TempDir::new().expect("tempdir");
    let path = write_file(tmp.path(), "ascii.yml", "- Id: 42\n");

    let loader = DatasetLoader::new(LoaderConfig {
        base_dir: None,
        encoding: Some(TextEncoding::Utf8),
    });
    let outcome = loader.load_file(&path).expect("load with forced encoding");
    assert_eq!(outcome.encoding, TextEncoding::Utf8);
    assert_eq!(ids(&outcome.records), vec![42]);
}

#[test]
fn test_save_load_round_trip_preserves_recognized_fields() {
    let tmp = TempDir::new().expect("tempdir");
    let original = vec![
        Item {
            id: 1101,
            aegis_name: "Sword".to_string(),
            name: "Sword".to_string(),
            kind: "Weapon".to_string(),
            sub_type: "1hSword".to_string(),
            buy: Some(100),
            sell: Some(50),
            weight: Some(500),
            attack: Some(25),
            range: Some(1),
            slots: Some(3),
            weapon_level: Some(1),
            equip_level_min: Some(2),
            refineable: Some(true),
            jobs: JobFlags {
                swordman: true,
                merchant: true,
                thief: true,
                ..JobFlags::default()
            },
            locations: LocationFlags {
                right_hand: true,
                ..LocationFlags::default()
            },
            script: "bonus bStr,1;".to_string(),
            ..Item::default()
        },
        Item {
            id: 501,
            name: "Red Herb".to_string(),
            trade: TradeFlags {
                no_drop: true,
                no_mail: true,
                ..TradeFlags::default()
            },
            ..Item::default()
        },
    ];

    let path = tmp.path().join("out.yml");
    save(&path, &original, TextEncoding::Utf8).expect("save");

    let outcome = loader().load_file(&path).expect("reload");
    assert_eq!(outcome.records, original);

    // Save the reloaded records again: a stable fixed point
    let path2 = tmp.path().join("out2.yml");
    save(&path2, &outcome.records, TextEncoding::Utf8).expect("save again");
    assert_eq!(
        fs::read(&path).expect("read first save"),
        fs::read(&path2).expect("read second save")
    );
}

#[test]
fn test_save_load_round_trip_in_utf16le() {
    let tmp = TempDir::new().expect("tempdir");
    let original = vec![Item {
        id: 2301,
        name: "帽子".to_string(),
        ..Item::default()
    }];

    let path = tmp.path().join("hat.yml");
    save(&path, &original, TextEncoding::Utf16Le).expect("save utf-16le");

    // The BOM written by save must drive detection on reload
    let outcome = loader().load_file(&path).expect("reload");
    assert_eq!(outcome.encoding, TextEncoding::Utf16Le);
    assert_eq!(outcome.records, original);
}

#[test]
fn test_cancellation_returns_partial_aggregate() {
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Body:\n  - Id: 1\nFooter:\n  Imports:\n    - Path: a.yml\n    - Path: b.yml\n",
    );
    write_file(tmp.path(), "a.yml", "- Id: 2\n");
    write_file(tmp.path(), "b.yml", "- Id: 3\n");

    // Raise the flag from the first progress event: the file in
    // flight finishes, everything after it is abandoned
    let flag = Arc::new(AtomicBool::new(false));
    let observer_flag = Arc::clone(&flag);
    let loader = DatasetLoader::new(LoaderConfig::default())
        .with_observer(move |_event: &idb_core::ProgressEvent| {
            observer_flag.store(true, Ordering::Relaxed);
        })
        .with_cancel_flag(flag);

    let outcome = loader.load_dataset(&root).expect("load dataset");
    assert_eq!(outcome.status, LoadStatus::Cancelled);
    assert_eq!(ids(&outcome.records), vec![1]);
    assert_eq!(outcome.visited.len(), 1);
}

#[test]
fn test_progress_events_carry_current_file() {
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Body:\n  - Id: 1\nFooter:\n  Imports:\n    - Path: a.yml\n",
    );
    write_file(tmp.path(), "a.yml", "- Id: 2\n");

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let loader = DatasetLoader::new(LoaderConfig::default()).with_observer(
        move |event: &idb_core::ProgressEvent| {
            sink.lock().unwrap().push(event.clone());
        },
    );

    loader.load_dataset(&root).expect("load dataset");
    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].current_file.ends_with("root.yml"));
    assert!(events[1].current_file.ends_with("a.yml"));
    assert!(events[1].percent >= events[0].percent);
}

#[test]
fn test_empty_import_contributes_nothing_without_aborting() {
    let tmp = TempDir::new().expect("tempdir");
    let root = write_file(
        tmp.path(),
        "root.yml",
        "Body:\n  - Id: 5\nFooter:\n  Imports:\n    - Path: empty.yml\n    - Path: more.yml\n",
    );
    write_file(tmp.path(), "empty.yml", "");
    write_file(tmp.path(), "more.yml", "- Id: 6\n");

    let outcome = loader().load_dataset(&root).expect("load dataset");
    assert_eq!(ids(&outcome.records), vec![5, 6]);
}
