//! Route handlers.
//!
//! Bodies are taken as raw bytes and decoded here so that a malformed or missing
//! body produces the same `{"error": ...}` shape as every other failure.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, AppState, ChatPayload};
use crate::storage::{ChatRecord, ChatSummary};

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub prompt: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Decode a JSON body; an empty body decodes as `T::default()`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

fn require_prompt(request: &GenerateRequest) -> Result<(), ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::Validation("prompt must not be empty".to_string()));
    }
    Ok(())
}

/// GET /api/chats - Every chat, newest first, without message bodies.
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    Ok(Json(state.chats.list_chats().await?))
}

/// GET /api/chats/latest - The five most recently written chats.
pub async fn latest_chats(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    Ok(Json(state.chats.latest_chats().await?))
}

/// GET /api/chat/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatRecord>, ApiError> {
    Ok(Json(state.chats.get_chat(&id).await?))
}

/// POST /api/chat
pub async fn create_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ChatRecord>), ApiError> {
    let payload: ChatPayload = parse_body(&body)?;
    let chat = state.chats.create_chat(payload).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

/// PUT /api/chat/{id}
pub async fn update_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ChatRecord>, ApiError> {
    let payload: ChatPayload = parse_body(&body)?;
    Ok(Json(state.chats.update_chat(&id, payload).await?))
}

/// POST /generate - Generate with the configured default model.
pub async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request: GenerateRequest = parse_body(&body)?;
    require_prompt(&request)?;

    let result = state.generator.generate(&request.prompt, &state.llm.model).await?;

    Ok(Json(GenerateResponse {
        prompt: request.prompt,
        result,
        model: None,
    }))
}

/// POST /generate-http - Generate with a caller-chosen model.
pub async fn generate_http(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request: GenerateRequest = parse_body(&body)?;
    require_prompt(&request)?;

    let model = request
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.llm.http_model.clone());
    let result = state.generator.generate(&request.prompt, &model).await?;

    Ok(Json(GenerateResponse {
        prompt: request.prompt,
        result,
        model: Some(model),
    }))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_default_payload() {
        let payload: ChatPayload = parse_body(&Bytes::from_static(b"  \n")).unwrap();
        assert!(payload.title.is_none());
        assert!(payload.messages.is_none());
    }

    #[test]
    fn test_malformed_body_is_validation_error() {
        let result: Result<ChatPayload, _> = parse_body(&Bytes::from_static(b"{\"messages\": 3}"));
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let request = GenerateRequest {
            prompt: "   ".to_string(),
            model: None,
        };
        assert!(matches!(require_prompt(&request), Err(ApiError::Validation(_))));
    }
}
