use rusqlite::{Connection, OptionalExtension as _, Transaction};

use super::types::{HistoryEntry, HistoryRecord};

const SELECT_COLUMNS: &str = "SELECT id, created_at, service_id, from_lang, to_lang,
        query_text, translated_text, raw_json
 FROM history";

/// Newest first; equal timestamps keep append order.
const ORDER_RECENT: &str = "ORDER BY created_at DESC, id ASC";

/// Create the history table and its paging index if absent.
///
/// The `CHECK` constraints mirror the validation done before insert, so rows
/// written by other tools cannot break the non-empty invariant either.
pub fn init_history_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS history (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at        REAL    NOT NULL,
            service_id        TEXT    NOT NULL CHECK (service_id <> ''),
            from_lang         TEXT    NOT NULL,
            to_lang           TEXT    NOT NULL,
            query_text        TEXT    NOT NULL CHECK (query_text <> ''),
            translated_text   TEXT    NOT NULL,
            raw_json          TEXT    NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_created_at
            ON history(created_at DESC, id ASC);",
    )
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        created_at: row.get(1)?,
        service_id: row.get(2)?,
        from_lang: row.get(3)?,
        to_lang: row.get(4)?,
        query_text: row.get(5)?,
        translated_text: row.get(6)?,
        raw_json: row.get(7)?,
    })
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Insert one row and, when `retention` is set, keep only the `retention` most
/// recently inserted rows. Both happen in the caller's transaction.
///
/// The cap follows insertion order, not `created_at`, so the row just written
/// always survives the trim.
pub fn insert_record(
    tx: &Transaction<'_>,
    record: &HistoryRecord,
    retention: Option<u32>,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO history
            (created_at, service_id, from_lang, to_lang,
             query_text, translated_text, raw_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            record.created_at,
            record.service_id,
            record.from_lang,
            record.to_lang,
            record.query_text,
            record.translated_text,
            record.raw_json,
        ],
    )?;

    if let Some(keep) = retention {
        tx.execute(
            "DELETE FROM history
             WHERE id NOT IN (
                 SELECT id FROM history ORDER BY id DESC LIMIT ?1
             )",
            [i64::from(keep)],
        )?;
    }
    Ok(())
}

/// Eagerly read one page of entries in retrieval order.
pub fn select_recent(
    conn: &Connection,
    limit: usize,
    offset: usize,
) -> rusqlite::Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_COLUMNS} {ORDER_RECENT} LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(
        rusqlite::params![to_sql_count(limit), to_sql_count(offset)],
        map_row,
    )?;
    rows.collect()
}

pub fn select_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<HistoryEntry>> {
    conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], map_row)
        .optional()
}

pub fn count_rows(conn: &Connection) -> rusqlite::Result<u64> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |r| r.get(0))?;
    Ok(u64::try_from(n).unwrap_or(0))
}

/// Returns `true` when a row was removed.
pub fn delete_by_id(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let removed = conn.execute("DELETE FROM history WHERE id = ?1", [id])?;
    Ok(removed > 0)
}

/// Remove every row and restart the id sequence.
pub fn delete_all(tx: &Transaction<'_>) -> rusqlite::Result<usize> {
    let removed = tx.execute("DELETE FROM history", [])?;
    // sqlite_sequence only exists once an AUTOINCREMENT table has been written to.
    let has_sequence: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='sqlite_sequence')",
        [],
        |r| r.get(0),
    )?;
    if has_sequence {
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'history'", [])?;
    }
    Ok(removed)
}
