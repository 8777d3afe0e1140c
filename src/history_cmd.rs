use std::path::Path;

use anyhow::Context as _;

use qhist::history::export::{self, ExportFormat};
use qhist::history::{HistoryEntry, HistoryRecord, HistoryStore, now_timestamp};

/// Fields for `qhist add`, as parsed by clap.
pub struct AddArgs<'a> {
    pub service: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub query: &'a str,
    pub translated: &'a str,
    pub raw_json: &'a str,
    pub created_at: Option<f64>,
}

fn format_time(created_at: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let secs = created_at.floor() as i64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = ((created_at - created_at.floor()) * 1e9) as u32;
    chrono::DateTime::from_timestamp(secs, nanos).map_or_else(
        || format!("{created_at:.3}"),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Single-line preview: newlines flattened, long text cut with an ellipsis.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

fn print_entry_line(entry: &HistoryEntry) {
    println!(
        "{} {} [{}] {}\u{2192}{} {} => {}",
        entry.id,
        format_time(entry.created_at),
        entry.service_id,
        entry.from_lang,
        entry.to_lang,
        preview(&entry.query_text, 40),
        preview(&entry.translated_text, 40),
    );
}

pub fn cmd_history_list(store: &HistoryStore, limit: usize, offset: usize, json: bool) -> i32 {
    let entries = match store.list_recent(limit, offset) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("[qhist] error listing history: {}", e.summary());
            return 1;
        }
    };

    if json {
        return match export::to_json(&entries) {
            Ok(s) => {
                println!("{s}");
                0
            }
            Err(e) => {
                eprintln!("[qhist] error rendering JSON: {e}");
                1
            }
        };
    }

    if entries.is_empty() {
        eprintln!("[qhist] no history entries found");
        return 0;
    }
    for entry in &entries {
        print_entry_line(entry);
    }
    0
}

pub fn cmd_history_show(store: &HistoryStore, id: i64, raw: bool) -> i32 {
    let entry = match store.get(id) {
        Ok(Some(e)) => e,
        Ok(None) => {
            eprintln!("[qhist] history entry {id} not found");
            return 1;
        }
        Err(e) => {
            eprintln!("[qhist] error getting history entry: {}", e.summary());
            return 1;
        }
    };

    if raw {
        println!("{}", entry.raw_json);
        return 0;
    }

    println!("ID: {}", entry.id);
    println!("Time: {}", format_time(entry.created_at));
    println!("Service: {}", entry.service_id);
    println!("Languages: {} \u{2192} {}", entry.from_lang, entry.to_lang);
    println!("\n--- Query ---");
    println!("{}", entry.query_text);
    println!("\n--- Translation ---");
    println!("{}", entry.translated_text);
    0
}

/// # Errors
/// Returns an error if the record is rejected or cannot be written.
pub fn cmd_history_add(store: &HistoryStore, args: &AddArgs<'_>) -> anyhow::Result<i32> {
    let record = HistoryRecord {
        created_at: args.created_at.unwrap_or_else(now_timestamp),
        service_id: args.service.to_owned(),
        from_lang: args.from.to_owned(),
        to_lang: args.to.to_owned(),
        query_text: args.query.to_owned(),
        translated_text: args.translated.to_owned(),
        raw_json: args.raw_json.to_owned(),
    };
    store.append(&record).context("record history entry")?;
    Ok(0)
}

pub fn cmd_history_delete(store: &HistoryStore, id: i64) -> i32 {
    match store.delete(id) {
        Ok(true) => {
            eprintln!("[qhist] deleted history entry {id}");
            0
        }
        Ok(false) => {
            eprintln!("[qhist] history entry {id} not found");
            1
        }
        Err(e) => {
            eprintln!("[qhist] error deleting history entry: {}", e.summary());
            1
        }
    }
}

pub fn cmd_history_clear(store: &HistoryStore) -> i32 {
    if let Err(e) = store.clear_all() {
        eprintln!("[qhist] error clearing history: {}", e.summary());
        return 1;
    }
    eprintln!("[qhist] history cleared");
    0
}

pub fn cmd_history_count(store: &HistoryStore) -> i32 {
    match store.count() {
        Ok(n) => {
            println!("{n}");
            0
        }
        Err(e) => {
            eprintln!("[qhist] error counting history: {}", e.summary());
            1
        }
    }
}

/// `qhist_history_<unix seconds>.<ext>`, the file name used when exporting into a directory.
fn default_export_name(format: ExportFormat) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let secs = now_timestamp() as i64;
    format!("qhist_history_{secs}.{}", format.extension())
}

/// Export the whole history, newest first, to `output` or stdout.
///
/// When `output` is an existing directory the file is created inside it under
/// a timestamped default name.
///
/// # Errors
/// Returns an error if reading, rendering or writing fails.
pub fn cmd_history_export(
    store: &HistoryStore,
    format: ExportFormat,
    output: Option<&Path>,
) -> anyhow::Result<i32> {
    let total = store.count().context("count history")?;
    let limit = usize::try_from(total).unwrap_or(usize::MAX);
    let entries = store.list_recent(limit, 0).context("read history")?;
    let rendered = export::render(&entries, format).context("render export")?;

    match output {
        Some(target) => {
            let path = if target.is_dir() {
                target.join(default_export_name(format))
            } else {
                target.to_path_buf()
            };
            std::fs::write(&path, &rendered)
                .with_context(|| format!("write export to {}", path.display()))?;
            eprintln!(
                "[qhist] exported {} entries to {}",
                entries.len(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(0)
}

pub fn cmd_path(store: &HistoryStore) -> i32 {
    println!("{}", store.path().display());
    0
}
