//! Application state shared by every handler.

use super::ChatService;
use crate::config::LLMConfig;
use crate::core::llm::TextGenerator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub chats: Arc<ChatService>,
    pub generator: Arc<dyn TextGenerator>,
    pub llm: Arc<LLMConfig>,
}

impl AppState {
    pub fn new(chats: ChatService, generator: Arc<dyn TextGenerator>, llm: LLMConfig) -> Self {
        Self {
            chats: Arc::new(chats),
            generator,
            llm: Arc::new(llm),
        }
    }
}
