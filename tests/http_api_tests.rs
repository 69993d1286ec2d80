// Tests for the HTTP API
//
// These drive the real router with tower's oneshot: the chat endpoint's
// fallback-audio policy, the multipart round-trip over fake providers, and
// the per-subsystem health report.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use voice_agent::providers::{
    ChatTurn, Reply, ReplyGenerator, SpeechSynthesizer, SpeechToText, Synthesis, Transcription,
};
use voice_agent::{create_router, AgentError, AgentResult, AppState, SessionStore};

const BOUNDARY: &str = "voice-agent-test-boundary";
const FALLBACK_CLIP: &[u8] = b"fallback-clip-bytes";

struct FakeStt;

#[async_trait]
impl SpeechToText for FakeStt {
    async fn transcribe(&self, _audio: &[u8]) -> AgentResult<Transcription> {
        Ok(Transcription {
            text: "hello".to_string(),
            confidence: None,
        })
    }
}

struct FakeLlm;

#[async_trait]
impl ReplyGenerator for FakeLlm {
    async fn generate(
        &self,
        user_text: &str,
        history: &[ChatTurn],
    ) -> AgentResult<(Reply, Vec<ChatTurn>)> {
        let mut updated = history.to_vec();
        updated.push(ChatTurn::user(user_text));
        updated.push(ChatTurn::model("hi there"));
        Ok((
            Reply {
                text: "hi there".to_string(),
            },
            updated,
        ))
    }
}

struct FakeTts {
    fail: bool,
}

#[async_trait]
impl SpeechSynthesizer for FakeTts {
    async fn synthesize(&self, _text: &str, _voice_id: Option<&str>) -> AgentResult<Synthesis> {
        if self.fail {
            Err(AgentError::Synthesis("no audio file URL in provider response".into()))
        } else {
            Ok(Synthesis {
                audio_url: "https://audio/1.mp3".to_string(),
            })
        }
    }
}

fn full_state(sessions: SessionStore, tts_fails: bool) -> AppState {
    let stt: Arc<dyn SpeechToText> = Arc::new(FakeStt);
    let llm: Arc<dyn ReplyGenerator> = Arc::new(FakeLlm);
    let tts: Arc<dyn SpeechSynthesizer> = Arc::new(FakeTts { fail: tts_fails });
    AppState::new(
        Some(stt),
        Some(llm),
        Some(tts),
        sessions,
        FALLBACK_CLIP.to_vec(),
    )
}

fn degraded_state(sessions: SessionStore) -> AppState {
    // Generation credential missing at startup; the other clients came up
    let stt: Arc<dyn SpeechToText> = Arc::new(FakeStt);
    let tts: Arc<dyn SpeechSynthesizer> = Arc::new(FakeTts { fail: false });
    AppState::new(Some(stt), None, Some(tts), sessions, FALLBACK_CLIP.to_vec())
}

fn multipart_audio_request(session_id: &str, audio: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"audio_file\"; filename=\"turn.wav\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(audio);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/agent/chat/{session_id}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_chat_round_trip_returns_audio_url_json() {
    let sessions = SessionStore::new();
    let app = create_router(full_state(sessions.clone(), false));

    let response = app
        .oneshot(multipart_audio_request("abc", b"fake audio bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-error").is_none());

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["audio_url"], "https://audio/1.mp3");
    assert_eq!(json["success"], true);

    // The turn committed one user/model exchange for the session
    assert_eq!(sessions.get_or_create("abc").await.history.len(), 2);
}

#[tokio::test]
async fn test_chat_without_providers_serves_fallback_clip() {
    let app = create_router(degraded_state(SessionStore::new()));

    let response = app
        .oneshot(multipart_audio_request("abc", b"fake audio bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    assert_eq!(response.headers().get("x-error").unwrap(), "true");
    assert_eq!(body_bytes(response).await, FALLBACK_CLIP);
}

#[tokio::test]
async fn test_failed_turn_serves_fallback_but_keeps_generated_history() {
    let sessions = SessionStore::new();

    // First turn succeeds end-to-end
    let app = create_router(full_state(sessions.clone(), false));
    app.oneshot(multipart_audio_request("abc", b"turn one"))
        .await
        .unwrap();

    // Second turn fails at synthesis: fallback audio, error flagged
    let app = create_router(full_state(sessions.clone(), true));
    let response = app
        .oneshot(multipart_audio_request("abc", b"turn two"))
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-error").unwrap(), "true");
    assert_eq!(body_bytes(response).await, FALLBACK_CLIP);

    // The second generation step had already committed before synthesis
    // failed, so the history shows both turns
    assert_eq!(sessions.get_or_create("abc").await.history.len(), 4);
}

#[tokio::test]
async fn test_chat_with_empty_upload_serves_fallback_clip() {
    let app = create_router(full_state(SessionStore::new(), false));

    let response = app
        .oneshot(multipart_audio_request("abc", b""))
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-error").unwrap(), "true");
    assert_eq!(body_bytes(response).await, FALLBACK_CLIP);
}

#[tokio::test]
async fn test_health_reports_missing_subsystem_and_session_count() {
    let sessions = SessionStore::new();
    sessions.get_or_create("abc").await;
    sessions.get_or_create("def").await;

    let app = create_router(degraded_state(sessions));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["services"]["transcription"], true);
    assert_eq!(json["services"]["generation"], false);
    assert_eq!(json["services"]["synthesis"], true);
    assert_eq!(json["services"]["sessions"], true);
    assert_eq!(json["active_sessions"], 2);
}

#[tokio::test]
async fn test_health_is_healthy_with_all_providers() {
    let app = create_router(full_state(SessionStore::new(), false));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["active_sessions"], 0);
}
