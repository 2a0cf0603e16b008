//! Rank record and app-id set data structures.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store identifier for Google Play in the shared dataset.
pub const STORE_GOOGLE_PLAY: u8 = 1;

/// One ranked chart entry for a (category, collection, country) triple.
///
/// Field order matches the serialized output consumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankRecord {
    /// Calendar date (UTC) the entry was collected
    pub crawled_date: NaiveDate,

    /// Store identifier (always [`STORE_GOOGLE_PLAY`] here)
    pub store: u8,

    /// Two-letter country code the chart was requested for
    pub country: String,

    /// Ranking bucket token (e.g. "TOP_FREE")
    pub collection: String,

    /// Category token (e.g. "GAME_TRIVIA")
    pub category: String,

    /// 1-based position in the chart response
    pub rank: u32,

    /// App identifier as reported by the store
    pub store_id: String,
}

/// Extract the app identifier from one provider app-summary entry.
///
/// Provider payloads are kept opaque; `appId` is the only field the
/// pipeline interprets.
pub fn app_id(item: &Value) -> Option<&str> {
    item.get("appId").and_then(Value::as_str)
}

/// Deduplicated set of app identifiers, preserving first-seen order.
///
/// Union semantics: inserting the same id twice keeps the first
/// occurrence, so accumulation order never changes membership and the
/// persisted file stays deterministic for a given query sequence.
#[derive(Debug, Default)]
pub struct AppIdSet {
    seen: HashSet<String>,
    ids: Vec<String>,
}

impl AppIdSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one id. Returns true if it was not already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.insert(id.clone()) {
            self.ids.push(id);
            true
        } else {
            false
        }
    }

    /// Insert every id from an iterator, returning how many were new.
    pub fn extend<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for id in ids {
            if self.insert(id) {
                added += 1;
            }
        }
        added
    }

    /// Number of unique ids held.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set holds no ids.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the set contains the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Ids in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rank_record_serialized_field_order() {
        let record = RankRecord {
            crawled_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            store: STORE_GOOGLE_PLAY,
            country: "us".to_string(),
            collection: "TOP_FREE".to_string(),
            category: "GAME_TRIVIA".to_string(),
            rank: 1,
            store_id: "com.example.trivia".to_string(),
        };

        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(
            line,
            r#"{"crawled_date":"2026-08-24","store":1,"country":"us","collection":"TOP_FREE","category":"GAME_TRIVIA","rank":1,"store_id":"com.example.trivia"}"#
        );
    }

    #[test]
    fn test_app_id_extraction() {
        assert_eq!(app_id(&json!({"appId": "a.b.c", "title": "x"})), Some("a.b.c"));
        assert_eq!(app_id(&json!({"title": "no id"})), None);
        assert_eq!(app_id(&json!({"appId": 42})), None);
        assert_eq!(app_id(&json!("not an object")), None);
    }

    #[test]
    fn test_app_id_set_dedup() {
        let mut set = AppIdSet::new();
        assert!(set.insert("a"));
        assert!(set.insert("b"));
        assert!(!set.insert("a"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_app_id_set_extend_counts_new_only() {
        let mut set = AppIdSet::new();
        set.insert("x");
        let added = set.extend(vec!["x".to_string(), "y".to_string(), "z".to_string()]);
        assert_eq!(added, 2);
        assert_eq!(set.as_slice(), &["x".to_string(), "y".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_accumulation_order_preserves_first_seen() {
        let mut set = AppIdSet::new();
        set.extend(vec!["y", "z"]);
        set.extend(vec!["z", "y", "w"]);
        assert_eq!(
            set.as_slice(),
            &["y".to_string(), "z".to_string(), "w".to_string()]
        );
    }
}
