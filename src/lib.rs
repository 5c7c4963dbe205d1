//! Chatstash - chat history service with file-backed conversations
//!
//! This library provides durable per-file chat records, an HTTP API over
//! them, and a thin proxy to the Gemini text-generation API.

pub mod api;
pub mod cli;
mod config;
pub mod core;
pub mod storage;
pub mod utils;

pub use api::{build_router, AppState, ChatService};
pub use crate::config::{LLMConfig, LoggingConfig, ServerConfig, Settings, StoreConfig};
pub use crate::core::llm::{GeminiClient, TextGenerator};
pub use storage::{ChatRecord, ChatStorage, ChatSummary, Message};

use anyhow::{Context, Result};
use std::sync::Arc;
use storage::filesystem::FileSystemStorage;

/// Wire storage, generator and router together from settings.
pub async fn build_app(
    settings: &Settings,
    generator: Arc<dyn TextGenerator>,
) -> Result<axum::Router> {
    let storage = FileSystemStorage::from_config(&settings.storage)
        .await
        .context("Failed to open chat storage")?;

    let state = AppState::new(
        ChatService::new(Arc::new(storage)),
        generator,
        settings.llm.clone(),
    );

    let router = build_router(state);
    Ok(api::router::with_web_ui(router, &settings.server.static_dir))
}

/// Run the HTTP server until Ctrl+C.
pub async fn serve(settings: Settings, api_key: String) -> Result<()> {
    let generator = GeminiClient::new(api_key, &settings.llm)
        .context("Failed to build Gemini client")?;
    let app = build_app(&settings, Arc::new(generator)).await?;

    let addr = settings.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        storage = ?settings.storage.root_path,
        model = %settings.llm.model,
        "Chatstash server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Chatstash server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
