use crate::orchestrator::TurnOrchestrator;
use crate::providers::{ReplyGenerator, SpeechSynthesizer, SpeechToText};
use crate::session::SessionStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers.
///
/// Each provider client is `None` when its credential was missing at startup;
/// the session store and fallback clip exist regardless, so `/health` can
/// always report and chat requests can always answer with audio.
#[derive(Clone)]
pub struct AppState {
    pub stt: Option<Arc<dyn SpeechToText>>,
    pub llm: Option<Arc<dyn ReplyGenerator>>,
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
    pub sessions: SessionStore,
    pub fallback_audio: Arc<Vec<u8>>,
}

impl AppState {
    pub fn new(
        stt: Option<Arc<dyn SpeechToText>>,
        llm: Option<Arc<dyn ReplyGenerator>>,
        tts: Option<Arc<dyn SpeechSynthesizer>>,
        sessions: SessionStore,
        fallback_audio: Vec<u8>,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            sessions,
            fallback_audio: Arc::new(fallback_audio),
        }
    }

    /// Builds a turn orchestrator when every provider client is available.
    /// This is the single availability check gating every chat request.
    pub fn orchestrator(&self) -> Option<TurnOrchestrator> {
        Some(TurnOrchestrator::new(
            self.stt.clone()?,
            self.llm.clone()?,
            self.tts.clone()?,
            self.sessions.clone(),
        ))
    }
}
