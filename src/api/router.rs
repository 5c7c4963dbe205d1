//! Axum router configuration with middleware.
//!
//! Chat routes live under `/api/`, generation routes at the top level.
//! Middleware: CORS, request tracing.

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chats", get(handlers::list_chats))
        .route("/chats/latest", get(handlers::latest_chats))
        .route("/chat", post(handlers::create_chat))
        .route(
            "/chat/{id}",
            get(handlers::get_chat).put(handlers::update_chat),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/generate", post(handlers::generate))
        .route("/generate-http", post(handlers::generate_http))
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the web UI from `dir` for every path the API does not claim.
/// Returns the router unchanged when the directory doesn't exist.
pub fn with_web_ui(router: Router, dir: &Path) -> Router {
    if !dir.is_dir() {
        tracing::debug!(path = ?dir, "No web UI directory, serving API only");
        return router;
    }

    tracing::info!(path = ?dir, "Static web UI serving enabled");
    router.fallback_service(ServeDir::new(dir))
}
