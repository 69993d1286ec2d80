//! End-to-end execution of one conversational turn
//!
//! A turn is strictly sequential: transcribe the inbound audio, read the
//! session history, generate a reply, commit the updated history, synthesize
//! the reply to speech. The first failing step aborts the turn; the caller
//! sees a single turn failure regardless of which step failed, while the
//! logs carry the distinction.

use crate::error::AgentResult;
use crate::providers::{ReplyGenerator, SpeechSynthesizer, SpeechToText, Synthesis};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Sequences the three provider clients and the session store into single
/// voice-in/voice-out exchanges.
#[derive(Clone)]
pub struct TurnOrchestrator {
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn ReplyGenerator>,
    tts: Arc<dyn SpeechSynthesizer>,
    sessions: SessionStore,
}

impl TurnOrchestrator {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        llm: Arc<dyn ReplyGenerator>,
        tts: Arc<dyn SpeechSynthesizer>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            sessions,
        }
    }

    /// Runs one turn for `session_id` over the uploaded audio, returning the
    /// URL of the synthesized reply.
    ///
    /// History is committed immediately after a successful generation step.
    /// A later synthesis failure fails the turn but keeps that commit: the
    /// session tracks the last successful generation, not the last
    /// successful turn.
    pub async fn run_turn(&self, session_id: &str, audio: &[u8]) -> AgentResult<Synthesis> {
        let turn_id = Uuid::new_v4();
        info!(
            "processing turn {} for session {} ({} bytes of audio)",
            turn_id,
            session_id,
            audio.len()
        );

        let transcription = self.stt.transcribe(audio).await.map_err(|e| {
            error!("turn {}: transcription step failed: {}", turn_id, e);
            e
        })?;
        info!(
            "turn {}: user said: {}",
            turn_id,
            preview(&transcription.text)
        );

        let session = self.sessions.get_or_create(session_id).await;

        let (reply, updated_history) = self
            .llm
            .generate(&transcription.text, &session.history)
            .await
            .map_err(|e| {
                error!("turn {}: generation step failed: {}", turn_id, e);
                e
            })?;

        self.sessions.update_history(session_id, updated_history).await;

        let synthesis = self.tts.synthesize(&reply.text, None).await.map_err(|e| {
            error!("turn {}: synthesis step failed: {}", turn_id, e);
            e
        })?;

        info!(
            "turn {} completed for session {}: {}",
            turn_id, session_id, synthesis.audio_url
        );

        Ok(synthesis)
    }
}

/// Truncates text for log lines.
fn preview(text: &str) -> String {
    const MAX: usize = 80;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_leaves_short_text_alone() {
        assert_eq!(preview("hello"), "hello");
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(200);
        let p = preview(&long);
        assert!(p.len() < long.len());
        assert!(p.ends_with("..."));
    }
}
