use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// One persisted translation result, as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Store-assigned insertion sequence.
    pub id: i64,
    /// Seconds since the Unix epoch, fractional.
    pub created_at: f64,
    pub service_id: String,
    pub from_lang: String,
    pub to_lang: String,
    pub query_text: String,
    pub translated_text: String,
    /// Opaque service payload, returned exactly as it was written.
    pub raw_json: String,
}

/// Parameters for recording one service's answer to one query.
///
/// `created_at` is supplied by the caller so that every service answering the
/// same query can share a single timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub created_at: f64,
    pub service_id: String,
    pub from_lang: String,
    pub to_lang: String,
    pub query_text: String,
    pub translated_text: String,
    pub raw_json: String,
}

impl HistoryRecord {
    /// Build a record stamped with the current wall-clock time.
    pub fn now(
        service_id: &str,
        from_lang: &str,
        to_lang: &str,
        query_text: &str,
        translated_text: &str,
        raw_json: &str,
    ) -> Self {
        Self {
            created_at: now_timestamp(),
            service_id: service_id.to_owned(),
            from_lang: from_lang.to_owned(),
            to_lang: to_lang.to_owned(),
            query_text: query_text.to_owned(),
            translated_text: translated_text.to_owned(),
            raw_json: raw_json.to_owned(),
        }
    }
}

/// Current time as fractional seconds since the Unix epoch.
///
/// A clock set before 1970 yields `0.0`.
pub fn now_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
