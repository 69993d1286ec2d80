use super::state::AppState;
use crate::error::AgentError;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, info};

/// Maximum accepted audio upload: 10 MiB.
pub const MAX_AUDIO_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub audio_url: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceAvailability,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ServiceAvailability {
    pub transcription: bool,
    pub generation: bool,
    pub synthesis: bool,
    pub sessions: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /agent/chat/:session_id
/// Run one conversational turn over an uploaded audio file.
///
/// On success the body is JSON with the synthesized reply's audio URL. On any
/// failure (unavailable providers, a bad upload, a failed turn) the body is
/// the static fallback clip with the `X-Error: true` header, so the caller
/// always receives playable audio.
pub async fn agent_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> Response {
    info!("processing chat request for session: {}", session_id);

    let Some(orchestrator) = state.orchestrator() else {
        let err = AgentError::ServiceUnavailable(
            "one or more provider clients failed to initialize".to_string(),
        );
        error!("{}; serving fallback audio", err);
        return fallback_response(&state);
    };

    let audio = match read_audio_upload(multipart).await {
        Ok(audio) => audio,
        Err(reason) => {
            error!("rejecting chat upload for session {}: {}", session_id, reason);
            return fallback_response(&state);
        }
    };

    match orchestrator.run_turn(&session_id, &audio).await {
        Ok(synthesis) => (
            StatusCode::OK,
            Json(ChatResponse {
                audio_url: synthesis.audio_url,
                success: true,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("turn failed for session {}: {}; serving fallback audio", session_id, e);
            fallback_response(&state)
        }
    }
}

/// GET /health
/// Report per-subsystem availability and the active session count.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let services = ServiceAvailability {
        transcription: state.stt.is_some(),
        generation: state.llm.is_some(),
        synthesis: state.tts.is_some(),
        sessions: true,
    };

    let healthy = services.transcription && services.generation && services.synthesis;

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        services,
        active_sessions: state.sessions.count().await,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Pulls the audio file out of the multipart upload (first field wins).
async fn read_audio_upload(mut multipart: Multipart) -> Result<Vec<u8>, String> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| format!("multipart error: {e}"))?
        .ok_or_else(|| "no audio file provided".to_string())?;

    let data = field
        .bytes()
        .await
        .map_err(|e| format!("failed to read upload: {e}"))?;

    if data.is_empty() {
        return Err("uploaded audio file is empty".to_string());
    }
    if data.len() > MAX_AUDIO_UPLOAD_BYTES {
        return Err(format!(
            "file too large: {} bytes (max {})",
            data.len(),
            MAX_AUDIO_UPLOAD_BYTES
        ));
    }

    Ok(data.to_vec())
}

/// Static audio response with the out-of-band error signal set.
fn fallback_response(state: &AppState) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (HeaderName::from_static("x-error"), "true"),
        ],
        (*state.fallback_audio).clone(),
    )
        .into_response()
}
