use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Conversational turn (multipart audio upload)
        .route("/agent/chat/:session_id", post(handlers::agent_chat))
        // Static assets (fallback clip, web client)
        .nest_service("/static", ServeDir::new("static"))
        // Audio uploads exceed axum's default 2 MiB body cap
        .layer(DefaultBodyLimit::max(handlers::MAX_AUDIO_UPLOAD_BYTES))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
