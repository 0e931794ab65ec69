//! Tests for FileRecordStore
//!
//! These tests verify:
//! - Create/open lifecycle and its failure modes
//! - insert/read/replace/remove/length/flush
//! - Count invariant against the record area
//! - Space accounting
//! - Persistence across reopen

use std::fs;
use std::path::Path;

use filerecstore::config::{Config, SyncStrategy};
use filerecstore::store::{FileRecordStore, RecordStore, CONTROL_FILENAME, RECORD_AREA_NAME};
use filerecstore::ErrorKind;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_config() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .root_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    (temp_dir, config)
}

fn setup_temp_store() -> (TempDir, Config, FileRecordStore) {
    let (temp_dir, config) = setup_config();
    let store = FileRecordStore::create(&config, "store", "test store").unwrap();
    (temp_dir, config, store)
}

fn files_in(area: &Path) -> usize {
    fs::read_dir(area).unwrap().count()
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_create_lays_out_directories() {
    let (temp, _config, store) = setup_temp_store();

    let dir = temp.path().join("store");
    assert!(dir.join(CONTROL_FILENAME).is_file());
    assert!(dir.join(RECORD_AREA_NAME).is_dir());
    assert_eq!(store.record_area(), dir.join(RECORD_AREA_NAME));
    assert_eq!(store.root(), dir);
    assert_eq!(store.name(), "store");
    assert_eq!(store.description(), "test store");
    assert_eq!(store.count(), 0);
}

#[test]
fn test_create_creates_missing_root() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().root_dir(temp_dir.path().join("a/b")).build();

    FileRecordStore::create(&config, "s", "").unwrap();

    assert!(temp_dir.path().join("a/b/s").is_dir());
}

#[test]
fn test_create_existing_store_fails() {
    let (_temp, config, _store) = setup_temp_store();

    let err = FileRecordStore::create(&config, "store", "again").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[test]
fn test_create_invalid_name_fails() {
    let (_temp, config) = setup_config();

    for name in ["", "a/b", " lead"] {
        let err = FileRecordStore::create(&config, name, "").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Strategy, "name {:?}", name);
    }
}

#[test]
fn test_open_missing_store_fails() {
    let (_temp, config) = setup_config();

    let err = FileRecordStore::open(&config, "nothing").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_open_without_record_area_fails() {
    let (temp, config, store) = setup_temp_store();
    drop(store);
    fs::remove_dir(temp.path().join("store").join(RECORD_AREA_NAME)).unwrap();

    let err = FileRecordStore::open(&config, "store").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Strategy);
}

#[test]
fn test_open_with_file_as_record_area_fails() {
    let (temp, config, store) = setup_temp_store();
    drop(store);
    let area = temp.path().join("store").join(RECORD_AREA_NAME);
    fs::remove_dir(&area).unwrap();
    fs::write(&area, b"not a directory").unwrap();

    let err = FileRecordStore::open(&config, "store").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Strategy);
}

#[test]
fn test_reopen_preserves_records_and_count() {
    let (_temp, config, mut store) = setup_temp_store();
    store.insert("a", b"hello").unwrap();
    store.insert("b", b"world").unwrap();
    drop(store);

    let store = FileRecordStore::open(&config, "store").unwrap();

    assert_eq!(store.count(), 2);
    assert_eq!(store.read("a").unwrap(), b"hello");
    assert_eq!(store.description(), "test store");
}

#[test]
fn test_open_reconciles_count_with_record_area() {
    let (_temp, config, mut store) = setup_temp_store();
    store.insert("a", b"1").unwrap();
    let area = store.record_area().to_path_buf();
    drop(store);

    // Simulate a crash between a record write and the control file update
    fs::write(area.join("orphan"), b"2").unwrap();

    let store = FileRecordStore::open(&config, "store").unwrap();
    assert_eq!(store.count(), 2);
    drop(store);

    let store = FileRecordStore::open(&config, "store").unwrap();
    assert_eq!(store.count(), 2);
}

// =============================================================================
// Insert / Read Tests
// =============================================================================

#[test]
fn test_insert_read_round_trip() {
    let (_temp, _config, mut store) = setup_temp_store();
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

    store.insert("blob", &payload).unwrap();

    assert_eq!(store.read("blob").unwrap(), payload);
    assert_eq!(store.length("blob").unwrap(), payload.len() as u64);
}

#[test]
fn test_insert_empty_record() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.insert("empty", b"").unwrap();

    assert_eq!(store.read("empty").unwrap(), Vec::<u8>::new());
    assert_eq!(store.length("empty").unwrap(), 0);
    assert_eq!(store.count(), 1);
}

#[test]
fn test_insert_writes_file_in_record_area() {
    let (_temp, _config, mut store) = setup_temp_store();

    store.insert("k", b"contents").unwrap();

    assert_eq!(fs::read(store.record_area().join("k")).unwrap(), b"contents");
}

#[test]
fn test_insert_existing_key_fails_without_mutation() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("k", b"original").unwrap();

    let err = store.insert("k", b"other").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(store.read("k").unwrap(), b"original");
    assert_eq!(store.count(), 1);
}

#[test]
fn test_insert_invalid_key_fails() {
    let (_temp, _config, mut store) = setup_temp_store();

    for key in ["", "a/b", "..\\x", " space"] {
        let err = store.insert(key, b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Strategy, "key {:?}", key);
    }
    assert_eq!(store.count(), 0);
    assert_eq!(files_in(store.record_area()), 0);
}

#[test]
fn test_dot_keys_are_invalid() {
    let (_temp, _config, mut store) = setup_temp_store();

    for key in [".", ".."] {
        assert_eq!(store.insert(key, b"x").unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
        assert_eq!(store.read(key).unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
        assert_eq!(store.length(key).unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
        assert_eq!(store.flush(key).unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
        assert_eq!(store.replace(key, b"x").unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
        assert_eq!(store.remove(key).unwrap_err().kind(), ErrorKind::Strategy, "key {:?}", key);
    }
    assert_eq!(store.count(), 0);
}

#[test]
fn test_subdirectory_key_is_not_a_record() {
    let (_temp, _config, mut store) = setup_temp_store();
    fs::create_dir(store.record_area().join("sub")).unwrap();

    assert_eq!(store.read("sub").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.length("sub").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.flush("sub").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.replace("sub", b"x").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.remove("sub").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.insert("sub", b"x").unwrap_err().kind(), ErrorKind::Strategy);

    assert!(store.record_area().join("sub").is_dir());
    assert_eq!(store.count(), 0);
}

#[test]
fn test_read_missing_key_fails() {
    let (_temp, _config, store) = setup_temp_store();

    assert_eq!(store.read("nope").unwrap_err().kind(), ErrorKind::NotFound);
}

// =============================================================================
// Replace Tests
// =============================================================================

#[test]
fn test_replace_changes_contents_not_count() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("a", b"hello").unwrap();
    store.insert("b", b"world").unwrap();

    store.replace("b", b"WORLD!").unwrap();

    assert_eq!(store.length("b").unwrap(), 6);
    assert_eq!(store.read("b").unwrap(), b"WORLD!");
    assert_eq!(store.count(), 2);
}

#[test]
fn test_replace_with_shorter_contents() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("k", b"a long original value").unwrap();

    store.replace("k", b"tiny").unwrap();

    assert_eq!(store.read("k").unwrap(), b"tiny");
}

#[test]
fn test_replace_missing_key_fails() {
    let (_temp, _config, mut store) = setup_temp_store();

    let err = store.replace("nope", b"x").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(files_in(store.record_area()), 0);
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_deletes_file_and_decrements() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("a", b"hello").unwrap();
    store.insert("b", b"world").unwrap();

    store.remove("a").unwrap();

    assert_eq!(store.count(), 1);
    assert!(!store.record_area().join("a").exists());
    assert_eq!(store.read("a").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_remove_missing_key_fails() {
    let (_temp, _config, mut store) = setup_temp_store();

    assert_eq!(store.remove("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.count(), 0);
}

#[test]
fn test_reinsert_after_remove() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("k", b"first").unwrap();
    store.remove("k").unwrap();

    store.insert("k", b"second").unwrap();

    assert_eq!(store.read("k").unwrap(), b"second");
    assert_eq!(store.count(), 1);
}

// =============================================================================
// Length / Flush Tests
// =============================================================================

#[test]
fn test_length_missing_key_fails() {
    let (_temp, _config, store) = setup_temp_store();

    assert_eq!(store.length("nope").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_flush_existing_record() {
    let (_temp, _config, mut store) = setup_temp_store();
    store.insert("k", b"v").unwrap();

    store.flush("k").unwrap();

    assert_eq!(store.read("k").unwrap(), b"v");
}

#[test]
fn test_flush_missing_key_fails() {
    let (_temp, _config, mut store) = setup_temp_store();

    assert_eq!(store.flush("nope").unwrap_err().kind(), ErrorKind::NotFound);
}

// =============================================================================
// Count Invariant Tests
// =============================================================================

#[test]
fn test_count_matches_record_area() {
    let (_temp, config, mut store) = setup_temp_store();

    for i in 0..50 {
        store.insert(&format!("key{}", i), format!("value{}", i).as_bytes()).unwrap();
    }
    for i in (0..50).step_by(3) {
        store.remove(&format!("key{}", i)).unwrap();
    }
    let _ = store.insert("key1", b"dup");
    let _ = store.remove("key0");

    assert_eq!(store.count() as usize, files_in(store.record_area()));
    drop(store);

    let store = FileRecordStore::open(&config, "store").unwrap();
    assert_eq!(store.count() as usize, files_in(store.record_area()));
}

#[test]
fn test_insert_rolls_back_when_count_cannot_be_persisted() {
    let (_temp, _config, mut store) = setup_temp_store();
    // A directory squatting on the scratch name makes every control update fail
    fs::create_dir(store.root().join(".rscontrol.tmp")).unwrap();

    let err = store.insert("k", b"value").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Strategy);
    assert_eq!(store.count(), 0);
    assert_eq!(files_in(store.record_area()), 0);
}

#[test]
fn test_remove_keeps_count_in_step_when_count_cannot_be_persisted() {
    let (_temp, config, mut store) = setup_temp_store();
    store.insert("a", b"1").unwrap();
    store.insert("b", b"2").unwrap();
    let scratch = store.root().join(".rscontrol.tmp");
    fs::create_dir(&scratch).unwrap();

    let err = store.remove("a").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Strategy);
    assert_eq!(store.count(), 1);
    assert_eq!(store.count() as usize, files_in(store.record_area()));
    drop(store);

    // The stale control file is repaired on the next open
    fs::remove_dir(&scratch).unwrap();
    let store = FileRecordStore::open(&config, "store").unwrap();
    assert_eq!(store.count(), 1);
}

// =============================================================================
// Space Accounting Tests
// =============================================================================

#[test]
fn test_space_used_empty_store_charges_metadata() {
    let (_temp, _config, store) = setup_temp_store();

    assert!(store.space_used().unwrap() > 0);
}

#[test]
fn test_space_used_grows_and_shrinks() {
    let (_temp, _config, mut store) = setup_temp_store();
    let empty = store.space_used().unwrap();

    store.insert("big", &vec![0x5A; 256 * 1024]).unwrap();
    let full = store.space_used().unwrap();
    assert!(full > empty);

    store.remove("big").unwrap();
    assert_eq!(store.space_used().unwrap(), empty);
}

#[test]
fn test_space_used_missing_record_area_fails() {
    let (_temp, _config, store) = setup_temp_store();
    fs::remove_dir(store.record_area()).unwrap();

    assert_eq!(store.space_used().unwrap_err().kind(), ErrorKind::Strategy);
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[test]
fn test_change_description_persists() {
    let (_temp, config, mut store) = setup_temp_store();

    store.change_description("fingerprint templates").unwrap();
    store.sync().unwrap();
    drop(store);

    let store = FileRecordStore::open(&config, "store").unwrap();
    assert_eq!(store.description(), "fingerprint templates");
}

#[test]
fn test_default_sync_strategy_store() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().root_dir(temp_dir.path()).build();
    let mut store = FileRecordStore::create(&config, "plain", "").unwrap();

    store.insert("k", b"v").unwrap();

    assert_eq!(store.read("k").unwrap(), b"v");
}
