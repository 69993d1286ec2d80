//! Speech synthesis via the Murf speech/generate API
//!
//! One JSON request per synthesis: `{text, voiceId, format, volume}`. A
//! successful response carries a URL to the hosted audio asset in its
//! `audioFile` field; a response without that field is a synthesis failure.

use crate::config::TtsConfig;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Pointer to the synthesized audio asset. Returned to the caller, not stored.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub audio_url: String,
}

/// Converts reply text into hosted audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` with the given voice persona, or the configured
    /// default when `voice_id` is `None`.
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> AgentResult<Synthesis>;
}

/// Murf REST client.
#[derive(Debug, Clone)]
pub struct MurfClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    default_voice: String,
    format: String,
    volume: String,
}

impl MurfClient {
    pub fn new(
        api_key: impl Into<String>,
        config: &TtsConfig,
        timeout: Duration,
    ) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build TTS HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            default_voice: config.voice_id.clone(),
            format: config.format.clone(),
            volume: config.volume.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for MurfClient {
    async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> AgentResult<Synthesis> {
        let voice = voice_id.unwrap_or(&self.default_voice);
        info!("generating speech with voice {} ({} chars)", voice, text.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                voice_id: voice,
                format: &self.format,
                volume: &self.volume,
            })
            .send()
            .await
            .map_err(|e| AgentError::Synthesis(format!("TTS request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Synthesis(format!(
                "TTS API error {status}: {body}"
            )));
        }

        let parsed: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Synthesis(format!("failed to parse TTS response: {e}")))?;

        let audio_url = hosted_audio_url(parsed)?;
        info!("speech synthesis successful");

        Ok(Synthesis { audio_url })
    }
}

fn hosted_audio_url(response: SynthesisResponse) -> AgentResult<String> {
    response
        .audio_file
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AgentError::Synthesis("no audio file URL in provider response".to_string()))
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    #[serde(rename = "voiceId")]
    voice_id: &'a str,
    format: &'a str,
    volume: &'a str,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    #[serde(rename = "audioFile")]
    audio_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_provider_field_names() {
        let json = serde_json::to_value(SynthesisRequest {
            text: "hi there",
            voice_id: "en-US-natalie",
            format: "MP3",
            volume: "100%",
        })
        .unwrap();

        assert_eq!(json["text"], "hi there");
        assert_eq!(json["voiceId"], "en-US-natalie");
        assert_eq!(json["format"], "MP3");
        assert_eq!(json["volume"], "100%");
    }

    #[test]
    fn response_with_audio_file_succeeds() {
        let response: SynthesisResponse =
            serde_json::from_value(serde_json::json!({"audioFile": "https://audio/1.mp3"}))
                .unwrap();

        assert_eq!(hosted_audio_url(response).unwrap(), "https://audio/1.mp3");
    }

    #[test]
    fn response_without_audio_file_is_synthesis_failure() {
        let response: SynthesisResponse =
            serde_json::from_value(serde_json::json!({"other": "field"})).unwrap();

        let err = hosted_audio_url(response).unwrap_err();
        assert!(matches!(err, AgentError::Synthesis(_)));
    }

    #[test]
    fn empty_audio_file_is_synthesis_failure() {
        let response: SynthesisResponse =
            serde_json::from_value(serde_json::json!({"audioFile": ""})).unwrap();

        assert!(hosted_audio_url(response).is_err());
    }
}
