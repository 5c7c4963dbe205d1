//! Chat service and HTTP surface
//!
//! `ChatService` turns request payloads into storage calls and shapes what comes
//! back: full records for single-chat routes, summaries for listings. The axum
//! wiring lives in the submodules.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

use crate::storage::{ChatRecord, ChatStorage, ChatSummary, Message};
use serde::Deserialize;
use std::sync::Arc;

/// Number of entries served by the "latest chats" listing.
pub const LATEST_CHATS_LIMIT: usize = 5;

/// Body of `POST /api/chat` and `PUT /api/chat/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

pub struct ChatService {
    storage: Arc<dyn ChatStorage>,
}

impl ChatService {
    pub fn new(storage: Arc<dyn ChatStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_chat(&self, payload: ChatPayload) -> Result<ChatRecord, ApiError> {
        let chat = self
            .storage
            .create(payload.title, payload.messages.unwrap_or_default())
            .await?;
        tracing::info!(chat_id = %chat.id, "Created chat");
        Ok(chat)
    }

    pub async fn get_chat(&self, id: &str) -> Result<ChatRecord, ApiError> {
        Ok(self.storage.load(id).await?)
    }

    /// Only the fields present in the payload are replaced.
    pub async fn update_chat(&self, id: &str, payload: ChatPayload) -> Result<ChatRecord, ApiError> {
        let chat = self
            .storage
            .update(id, payload.title, payload.messages)
            .await?;
        tracing::info!(chat_id = %chat.id, messages = chat.messages.len(), "Updated chat");
        Ok(chat)
    }

    pub async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        Ok(self.storage.list_all().await?)
    }

    pub async fn latest_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        Ok(self.storage.list_latest(LATEST_CHATS_LIMIT).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStorage;

    fn service() -> ChatService {
        ChatService::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_create_without_messages_starts_empty() {
        let service = service();

        let chat = service.create_chat(ChatPayload::default()).await.unwrap();

        assert!(chat.messages.is_empty());
        assert!(chat.title.starts_with("Conversation - "));
    }

    #[tokio::test]
    async fn test_unknown_chat_maps_to_not_found() {
        let service = service();

        assert!(matches!(
            service.get_chat("missing").await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            service.update_chat("missing", ChatPayload::default()).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_latest_is_capped() {
        let service = service();
        for _ in 0..(LATEST_CHATS_LIMIT + 3) {
            service.create_chat(ChatPayload::default()).await.unwrap();
        }

        assert_eq!(service.list_chats().await.unwrap().len(), LATEST_CHATS_LIMIT + 3);
        assert_eq!(service.latest_chats().await.unwrap().len(), LATEST_CHATS_LIMIT);
    }

    #[tokio::test]
    async fn test_update_with_empty_payload_only_touches_timestamp() {
        let service = service();
        let chat = service
            .create_chat(ChatPayload {
                title: Some("Keep".to_string()),
                messages: Some(vec![Message::user("one")]),
            })
            .await
            .unwrap();

        let updated = service
            .update_chat(&chat.id, ChatPayload::default())
            .await
            .unwrap();

        assert_eq!(updated.title, "Keep");
        assert_eq!(updated.messages, chat.messages);
        assert!(updated.timestamp > chat.timestamp);
    }
}
