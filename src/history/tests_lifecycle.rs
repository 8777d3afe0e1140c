#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::tests::{make_record, temp_store};
use super::*;
use tempfile::TempDir;

/// A path whose parent is a regular file can never be created.
fn unusable_store(dir: &TempDir) -> HistoryStore {
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").expect("write blocker");
    HistoryStore::new(blocker.join("history.db"), HistoryConfig::default())
}

#[test]
fn new_store_does_no_io() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("history.db");
    let store = HistoryStore::new(&path, HistoryConfig::default());
    assert!(!store.is_ready());
    assert!(!path.exists());
    assert_eq!(store.path(), path);
}

#[test]
fn ensure_ready_creates_parent_dirs_and_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("a").join("b").join("history.db");
    let store = HistoryStore::new(&path, HistoryConfig::default());
    store.ensure_ready().expect("ready");
    assert!(path.exists());
}

#[test]
fn first_operation_triggers_setup() {
    let (_dir, store) = temp_store();
    assert!(!store.is_ready());
    assert_eq!(store.count().expect("count"), 0);
    assert!(store.is_ready());
}

#[test]
fn ensure_ready_repeatedly_is_idempotent() {
    let (_dir, store) = temp_store();
    for _ in 0..5 {
        store.ensure_ready().expect("ready");
    }
    store.append(&make_record(1.0, "svcA", "q")).expect("append");
    store.ensure_ready().expect("ready after write");
    assert_eq!(store.count().expect("count"), 1);
}

#[test]
fn schema_init_on_existing_file_does_not_duplicate_objects() {
    let (dir, store) = temp_store();
    store.append(&make_record(1.0, "svcA", "q")).expect("append");
    drop(store);

    // A second store on the same file runs CREATE ... IF NOT EXISTS again.
    let again = HistoryStore::new(dir.path().join("history.db"), HistoryConfig::default());
    again.ensure_ready().expect("ready");

    let conn = again.connection().expect("conn").lock().expect("lock");
    init_history_table(&conn).expect("third init");
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='history'",
            [],
            |r| r.get(0),
        )
        .expect("tables");
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name LIKE 'idx_history_%'",
            [],
            |r| r.get(0),
        )
        .expect("indexes");
    assert_eq!((tables, indexes), (1, 1));
}

#[test]
fn unwritable_location_fails_with_init_error() {
    let dir = TempDir::new().expect("tempdir");
    let store = unusable_store(&dir);
    let err = store.ensure_ready().unwrap_err();
    assert!(err.is_init(), "expected init error, got {err:?}");
    assert!(!store.is_ready());
}

#[test]
fn failed_store_short_circuits_every_operation() {
    let dir = TempDir::new().expect("tempdir");
    let store = unusable_store(&dir);
    let first = store.ensure_ready().unwrap_err();

    // Remove the obstacle: a retrying store would now succeed.
    std::fs::remove_file(dir.path().join("not-a-dir")).expect("remove blocker");

    assert!(store.ensure_ready().unwrap_err().is_init());
    assert!(store.append(&make_record(1.0, "svcA", "q")).unwrap_err().is_init());
    assert!(store.list_recent(10, 0).unwrap_err().is_init());
    assert!(store.list_recent(0, 0).unwrap_err().is_init());
    assert!(store.clear_all().unwrap_err().is_init());
    assert!(store.count().unwrap_err().is_init());
    assert!(!store.try_append(&make_record(1.0, "svcA", "q")));
    assert!(!dir.path().join("not-a-dir").exists(), "no setup retry");

    let later = store.get(1).unwrap_err();
    assert!(first.summary().contains("not-a-dir"));
    assert_eq!(later.summary(), first.summary(), "later calls replay the first cause");
}

#[test]
fn corrupted_file_fails_with_init_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("history.db");
    std::fs::write(&path, vec![0xAB_u8; 4096]).expect("write garbage");
    let store = HistoryStore::new(&path, HistoryConfig::default());
    let err = store.ensure_ready().unwrap_err();
    assert!(err.is_init(), "expected init error, got {err:?}");
}

#[test]
fn debug_output_reports_state() {
    let (_dir, store) = temp_store();
    assert!(format!("{store:?}").contains("uninitialized"));
    store.ensure_ready().expect("ready");
    assert!(format!("{store:?}").contains("ready"));
}

fn exec_on_store(store: &HistoryStore, sql: &str) {
    let conn = store.connection().expect("conn").lock().expect("lock");
    conn.execute_batch(sql).expect("exec");
}

#[test]
fn read_failure_after_ready_is_a_read_error_not_empty() {
    let (_dir, store) = temp_store();
    store.append(&make_record(1.0, "svcA", "q")).expect("append");
    exec_on_store(&store, "DROP TABLE history;");

    let err = store.list_recent(10, 0).unwrap_err();
    assert!(err.is_read(), "expected read error, got {err:?}");
    assert!(err.summary().contains("list history"), "got: {}", err.summary());
    assert!(store.count().unwrap_err().is_read());
    assert!(store.get(1).unwrap_err().is_read());
    assert!(store.is_ready(), "a broken table does not reset the lifecycle");
}

#[test]
fn write_failure_after_ready_is_a_write_error() {
    let (_dir, store) = temp_store();
    store.ensure_ready().expect("ready");
    exec_on_store(&store, "DROP TABLE history;");

    let err = store.append(&make_record(1.0, "svcA", "q")).unwrap_err();
    assert!(err.is_write(), "expected write error, got {err:?}");
    assert!(store.clear_all().unwrap_err().is_write());
    assert!(store.delete(1).unwrap_err().is_write());
    assert!(!store.try_append(&make_record(1.0, "svcA", "q")));
}

#[test]
fn failed_clear_leaves_every_row_in_place() {
    let (_dir, store) = temp_store();
    for i in 1..=4 {
        store
            .append(&make_record(f64::from(i), "svcA", &format!("q{i}")))
            .expect("append");
    }
    store
        .append(&make_record(5.0, "svcA", "pinned"))
        .expect("append pinned");
    let before = store.count().expect("count before");

    // The DELETE gets through the first rows, then aborts on the pinned one.
    exec_on_store(
        &store,
        "CREATE TRIGGER refuse_pinned BEFORE DELETE ON history
         WHEN old.query_text = 'pinned'
         BEGIN SELECT RAISE(ABORT, 'pinned row'); END;",
    );

    let err = store.clear_all().unwrap_err();
    assert!(err.is_write(), "expected write error, got {err:?}");
    assert_eq!(store.count().expect("count after"), before);
    assert_eq!(store.list_recent(10, 0).expect("list").len(), 5);
}
