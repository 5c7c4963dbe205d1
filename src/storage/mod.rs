//! Chat Record Storage Abstraction
//!
//! Information Hiding:
//! - Backends only know how to put, get and scan whole records
//! - Identifier, title and timestamp assignment live in the provided trait methods,
//!   so every backend applies the same record lifecycle
//! - Listing order and summary projection are computed here, not in the backends

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub mod filesystem;
pub mod memory;

/// One opaque conversation turn.
///
/// The store never looks inside a message; whatever JSON the client submitted is
/// written back out unchanged, including object key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// Build the usual `{role, content}` shape.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self(serde_json::json!({
            "role": role.into(),
            "content": content.into(),
        }))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.0.get("content").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    /// Last write instant, UTC RFC 3339 with microseconds. Empty for legacy records
    /// that never carried one, or carried a non-string.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ChatRecord {
    fn new(title: Option<String>, messages: Vec<Message>) -> Self {
        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ => default_title(),
        };

        Self {
            id: Uuid::new_v4().to_string(),
            title,
            timestamp: now_timestamp(),
            messages,
        }
    }

    /// Apply an update: supplied fields replace, the timestamp always moves forward.
    fn apply(&mut self, title: Option<String>, messages: Option<Vec<Message>>) {
        if let Some(messages) = messages {
            self.messages = messages;
        }
        if let Some(title) = title {
            self.title = title;
        }
        self.timestamp = next_timestamp(&self.timestamp);
    }

    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            timestamp: self.timestamp.clone(),
            message_count: self.messages.len(),
        }
    }
}

/// Listing projection of a record. Never carries message bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub message_count: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chat '{0}' not found")]
    NotFound(String),

    #[error("failed to write chat record to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read chat storage at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize chat record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Trait defining chat record storage.
///
/// Implementors provide raw record persistence; the lifecycle operations
/// (`create`, `load`, `update`, `list_all`, `list_latest`) are provided on top.
#[async_trait]
pub trait ChatStorage: Send + Sync {
    /// Persist a full record under its id, replacing any previous version.
    async fn put(&self, record: &ChatRecord) -> Result<(), StoreError>;

    /// Fetch a record by id. Unreadable records are reported as `None`.
    async fn get(&self, id: &str) -> Result<Option<ChatRecord>, StoreError>;

    /// Read every readable record, in no particular order.
    async fn scan(&self) -> Result<Vec<ChatRecord>, StoreError>;

    /// Create a record with a fresh id and timestamp.
    async fn create(
        &self,
        title: Option<String>,
        messages: Vec<Message>,
    ) -> Result<ChatRecord, StoreError> {
        let record = ChatRecord::new(title, messages);
        self.put(&record).await?;
        tracing::debug!(
            "[ChatStorage] Created chat '{}' with {} messages",
            record.id,
            record.messages.len()
        );
        Ok(record)
    }

    async fn load(&self, id: &str) -> Result<ChatRecord, StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replace the supplied fields of an existing record. Nothing is written when
    /// the record does not exist.
    async fn update(
        &self,
        id: &str,
        title: Option<String>,
        messages: Option<Vec<Message>>,
    ) -> Result<ChatRecord, StoreError> {
        let mut record = self.load(id).await?;
        record.apply(title, messages);
        self.put(&record).await?;
        tracing::debug!("[ChatStorage] Updated chat '{}'", record.id);
        Ok(record)
    }

    /// Summaries of every record, most recently written first.
    ///
    /// Full scan on every call.
    async fn list_all(&self) -> Result<Vec<ChatSummary>, StoreError> {
        let records = self.scan().await?;
        let mut chats: Vec<ChatSummary> = records.iter().map(ChatRecord::summary).collect();
        sort_newest_first(&mut chats);
        Ok(chats)
    }

    async fn list_latest(&self, n: usize) -> Result<Vec<ChatSummary>, StoreError> {
        let mut chats = self.list_all().await?;
        chats.truncate(n);
        Ok(chats)
    }
}

/// Ids are used as file stems, so only a conservative character set is addressable.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `null`, numbers and other non-strings read as "".
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(timestamp)) => timestamp,
        _ => String::new(),
    })
}

/// Descending by write instant. Timestamps that don't parse sort as if empty, i.e. last.
pub fn sort_newest_first(chats: &mut [ChatSummary]) {
    chats.sort_by_cached_key(|chat| std::cmp::Reverse(sort_key(&chat.timestamp)));
}

/// RFC 3339 first, then the naive local-time values older records carry.
fn sort_key(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(instant.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .map(|naive| {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
        })
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// A timestamp strictly after `previous` when that parses, otherwise plain now.
pub(crate) fn next_timestamp(previous: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => {
            let prev = prev.with_timezone(&Utc);
            if now > prev {
                format_timestamp(now)
            } else {
                format_timestamp(prev + Duration::microseconds(1))
            }
        }
        Err(_) => format_timestamp(now),
    }
}

fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn default_title() -> String {
    format!("Conversation - {}", Local::now().format("%Y-%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_when_missing_or_empty() {
        let untitled = ChatRecord::new(None, vec![]);
        let blank = ChatRecord::new(Some(String::new()), vec![]);

        assert!(untitled.title.starts_with("Conversation - "));
        assert!(blank.title.starts_with("Conversation - "));
        assert_ne!(untitled.id, blank.id);
    }

    #[test]
    fn test_next_timestamp_is_strictly_later() {
        let future = "2999-01-01T00:00:00.000000Z";
        assert_eq!(next_timestamp(future), "2999-01-01T00:00:00.000001Z");

        let past = "2000-01-01T00:00:00.000000Z";
        assert!(next_timestamp(past).as_str() > past);
    }

    #[test]
    fn test_next_timestamp_tolerates_garbage() {
        let stamp = next_timestamp("not a time");
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_sort_puts_missing_timestamps_last() {
        let summary = |id: &str, ts: &str| ChatSummary {
            id: id.to_string(),
            title: id.to_string(),
            timestamp: ts.to_string(),
            message_count: 0,
        };
        let mut chats = vec![
            summary("legacy", ""),
            summary("old", "2024-01-01T00:00:00.000000Z"),
            summary("new", "2025-06-01T12:00:00.000000Z"),
        ];

        sort_newest_first(&mut chats);

        let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "legacy"]);
    }

    #[test]
    fn test_sort_puts_unparseable_timestamps_last() {
        let summary = |id: &str, ts: &str| ChatSummary {
            id: id.to_string(),
            title: id.to_string(),
            timestamp: ts.to_string(),
            message_count: 0,
        };
        let mut chats = vec![
            summary("garbage", "not-a-time"),
            summary("naive", "2023-03-04T10:11:12.345678"),
            summary("naive-no-fraction", "2022-01-01T00:00:00"),
            summary("new", "2025-06-01T12:00:00.000000Z"),
        ];

        sort_newest_first(&mut chats);

        let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "naive", "naive-no-fraction", "garbage"]);
        assert_eq!(chats[3].timestamp, "not-a-time");
    }

    #[test]
    fn test_non_string_timestamp_reads_as_empty() {
        for raw in [
            r#"{"id": "a", "title": "t", "timestamp": null}"#,
            r#"{"id": "a", "title": "t", "timestamp": 1700000000}"#,
        ] {
            let record: ChatRecord = serde_json::from_str(raw).unwrap();
            assert_eq!(record.timestamp, "");
        }
    }

    #[test]
    fn test_id_validation() {
        assert!(is_valid_id(&Uuid::new_v4().to_string()));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("a/b"));
    }

    #[test]
    fn test_message_passthrough_keeps_extra_fields() {
        let raw = serde_json::json!({"role": "user", "content": "hi", "sent_at": 12});
        let message = Message::from(raw.clone());

        assert_eq!(message.role(), Some("user"));
        assert_eq!(serde_json::to_value(&message).unwrap(), raw);
    }
}
