//! HTTP API for the voice assistant
//!
//! This module provides the request boundary around the turn orchestrator:
//! - POST /agent/chat/:session_id - Run one conversational turn
//! - GET /health - Per-subsystem availability and session count
//! - GET /static/* - Static assets, including the fallback clip
//!
//! Failure policy lives here: any turn failure is answered with the static
//! fallback audio clip and an `X-Error: true` header, never a raw error.

mod handlers;
mod routes;
mod state;

pub use handlers::{ChatResponse, HealthResponse, ServiceAvailability, MAX_AUDIO_UPLOAD_BYTES};
pub use routes::create_router;
pub use state::AppState;
