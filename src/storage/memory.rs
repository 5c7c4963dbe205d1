//! In-Memory Chat Storage
//!
//! Information Hiding:
//! - HashMap storage structure hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and ephemeral sessions

use super::{ChatRecord, ChatStorage, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage using HashMap
/// Data is lost when process terminates
pub struct InMemoryStorage {
    chats: Arc<RwLock<HashMap<String, ChatRecord>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            chats: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStorage for InMemoryStorage {
    async fn put(&self, record: &ChatRecord) -> Result<(), StoreError> {
        let mut chats = self.chats.write().await;
        chats.insert(record.id.clone(), record.clone());
        tracing::debug!(
            "[InMemoryStorage] Saved chat '{}' ({} messages)",
            record.id,
            record.messages.len()
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ChatRecord>, StoreError> {
        let chats = self.chats.read().await;
        Ok(chats.get(id).cloned())
    }

    async fn scan(&self) -> Result<Vec<ChatRecord>, StoreError> {
        let chats = self.chats.read().await;
        tracing::debug!("[InMemoryStorage] Scanned {} chats", chats.len());
        Ok(chats.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Message;

    #[tokio::test]
    async fn test_create_and_load() {
        let storage = InMemoryStorage::new();
        let messages = vec![Message::user("Hello"), Message::assistant("Hi there")];

        let created = storage
            .create(Some("Test".to_string()), messages.clone())
            .await
            .unwrap();
        let loaded = storage.load(&created.id).await.unwrap();

        assert_eq!(loaded.messages, messages);
        assert_eq!(loaded.messages[0].content(), Some("Hello"));
        assert_eq!(loaded.messages[1].role(), Some("assistant"));
    }

    #[tokio::test]
    async fn test_load_nonexistent_chat() {
        let storage = InMemoryStorage::new();
        assert!(matches!(
            storage.load("nonexistent").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_nonexistent_chat_writes_nothing() {
        let storage = InMemoryStorage::new();

        let result = storage
            .update("nonexistent", Some("x".to_string()), None)
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(storage.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_updates_keep_timestamps_increasing() {
        let storage = InMemoryStorage::new();
        let created = storage.create(None, vec![]).await.unwrap();

        let mut previous = created.timestamp;
        for i in 0..20 {
            let updated = storage
                .update(&created.id, Some(format!("title {}", i)), None)
                .await
                .unwrap();
            assert!(updated.timestamp > previous);
            previous = updated.timestamp;
        }
    }

    #[tokio::test]
    async fn test_list_latest_truncates() {
        let storage = InMemoryStorage::new();
        for _ in 0..7 {
            storage.create(None, vec![Message::user("Test")]).await.unwrap();
        }

        assert_eq!(storage.list_all().await.unwrap().len(), 7);
        assert_eq!(storage.list_latest(5).await.unwrap().len(), 5);
        assert_eq!(storage.list_latest(50).await.unwrap().len(), 7);
    }
}
