//! Daily encouragement message selection and caching.
//!
//! The message for a calendar day is a pure function of the date and the
//! configured message list. The cache is explicit: keyed by user and UTC
//! date, stored in the kv table, expired by a TTL checked against a
//! caller-supplied clock. No ambient storage, no ambient `now`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::LedgerDb;

/// Deterministic day-of-year message picker.
#[derive(Debug, Clone)]
pub struct MessageSelector {
    messages: Vec<String>,
}

impl MessageSelector {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Message for a calendar date: day-of-year modulo the list length.
    /// Returns `None` when the list is empty.
    pub fn for_date(&self, date: NaiveDate) -> Option<&str> {
        if self.messages.is_empty() {
            return None;
        }
        let index = date.ordinal0() as usize % self.messages.len();
        Some(&self.messages[index])
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedMessage {
    text: String,
    cached_at: DateTime<Utc>,
}

/// Explicit cache over the kv store, keyed `(user_id, dateUTC)`.
pub struct MessageCache<'a> {
    db: &'a LedgerDb,
    ttl: Duration,
}

impl<'a> MessageCache<'a> {
    pub fn new(db: &'a LedgerDb, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Cached message for the day, or select and cache a fresh one.
    ///
    /// A cached entry is served only while `now - cached_at < ttl`; an
    /// expired entry is overwritten.
    pub fn get_or_insert(
        &self,
        user_id: &str,
        date: NaiveDate,
        now: DateTime<Utc>,
        selector: &MessageSelector,
    ) -> Result<Option<String>, CoreError> {
        let key = format!("daily_message:{user_id}:{date}");

        if let Some(raw) = self.db.kv_get(&key)? {
            if let Ok(cached) = serde_json::from_str::<CachedMessage>(&raw) {
                if now - cached.cached_at < self.ttl {
                    return Ok(Some(cached.text));
                }
            }
        }

        let Some(text) = selector.for_date(date) else {
            return Ok(None);
        };

        let entry = CachedMessage {
            text: text.to_string(),
            cached_at: now,
        };
        self.db.kv_set(&key, &serde_json::to_string(&entry)?)?;
        Ok(Some(text.to_string()))
    }
}
