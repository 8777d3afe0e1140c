//! Render history entries for export. Pure functions, no I/O.

use std::fmt::Write as _;

use super::types::HistoryEntry;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Pretty-printed JSON array, `raw_json` included verbatim as a string.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_json(entries: &[HistoryEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

const CSV_HEADER: &str = "id,created_at,service_id,from_lang,to_lang,query_text,translated_text";

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}

/// CSV with a header row and CRLF line endings. `raw_json` is left out.
pub fn to_csv(entries: &[HistoryEntry]) -> String {
    let mut out = String::with_capacity(64 * (entries.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");
    for e in entries {
        let _ = write!(
            out,
            "{},{},{},{},{},{},{}\r\n",
            e.id,
            e.created_at,
            csv_field(&e.service_id),
            csv_field(&e.from_lang),
            csv_field(&e.to_lang),
            csv_field(&e.query_text),
            csv_field(&e.translated_text),
        );
    }
    out
}

/// Render `entries` in `format`.
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn render(entries: &[HistoryEntry], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => to_json(entries),
        ExportFormat::Csv => Ok(to_csv(entries)),
    }
}
