//! Speech-to-text via the AssemblyAI transcript API
//!
//! AssemblyAI exposes transcription as a job protocol: upload the raw audio
//! bytes, submit a transcript job pointing at the upload, then poll the job
//! until it reaches a terminal status. The polling loop below is that
//! protocol, not a retry policy; a terminal error or poll exhaustion is a
//! single transcription failure.

use crate::config::SttConfig;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Transcribed text for one audio recording. Ephemeral.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,

    /// Provider-reported confidence (0.0 to 1.0), if available
    pub confidence: Option<f32>,
}

/// Converts an audio byte stream into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribes one recording. Empty or absent text is treated as
    /// "no speech detected" and reported as a failure, not an empty result.
    async fn transcribe(&self, audio: &[u8]) -> AgentResult<Transcription>;
}

/// AssemblyAI REST client.
#[derive(Debug, Clone)]
pub struct AssemblyAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl AssemblyAiClient {
    pub fn new(
        api_key: impl Into<String>,
        config: &SttConfig,
        timeout: Duration,
    ) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build STT HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    /// Uploads raw audio bytes; returns the provider-hosted audio URL.
    async fn upload(&self, audio: &[u8]) -> AgentResult<String> {
        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| AgentError::Transcription(format!("audio upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Transcription(format!(
                "STT upload error {status}: {body}"
            )));
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| {
            AgentError::Transcription(format!("failed to parse upload response: {e}"))
        })?;

        Ok(parsed.upload_url)
    }

    /// Submits a transcript job for a previously uploaded recording.
    async fn submit(&self, audio_url: &str) -> AgentResult<TranscriptJob> {
        let response = self
            .http
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&TranscriptRequest { audio_url })
            .send()
            .await
            .map_err(|e| AgentError::Transcription(format!("transcript submit failed: {e}")))?;

        self.parse_job(response).await
    }

    async fn fetch(&self, id: &str) -> AgentResult<TranscriptJob> {
        let response = self
            .http
            .get(format!("{}/transcript/{}", self.base_url, id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| AgentError::Transcription(format!("transcript poll failed: {e}")))?;

        self.parse_job(response).await
    }

    async fn parse_job(&self, response: reqwest::Response) -> AgentResult<TranscriptJob> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Transcription(format!(
                "STT API error {status}: {body}"
            )));
        }

        response.json().await.map_err(|e| {
            AgentError::Transcription(format!("failed to parse transcript job: {e}"))
        })
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiClient {
    async fn transcribe(&self, audio: &[u8]) -> AgentResult<Transcription> {
        info!("starting audio transcription ({} bytes)", audio.len());

        let audio_url = self.upload(audio).await?;
        let mut job = self.submit(&audio_url).await?;
        let job_id = job.id.clone();

        let mut polls = 0;
        loop {
            match job_state(job) {
                JobState::Done(transcription) => {
                    info!(
                        "transcription completed ({} chars, confidence {:?})",
                        transcription.text.len(),
                        transcription.confidence
                    );
                    return Ok(transcription);
                }
                JobState::Failed(message) => {
                    warn!("transcript job {} failed: {}", job_id, message);
                    return Err(AgentError::Transcription(message));
                }
                JobState::Pending => {
                    polls += 1;
                    if polls > self.max_poll_attempts {
                        return Err(AgentError::Transcription(format!(
                            "transcript job {} still pending after {} polls",
                            job_id, self.max_poll_attempts
                        )));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                    job = self.fetch(&job_id).await?;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

enum JobState {
    Pending,
    Done(Transcription),
    Failed(String),
}

fn job_state(job: TranscriptJob) -> JobState {
    match job.status.as_str() {
        "completed" => {
            let text = job.text.unwrap_or_default().trim().to_string();
            if text.is_empty() {
                // Silence or unintelligible audio: a failed turn, not an
                // empty-text success.
                JobState::Failed("no speech detected in audio".to_string())
            } else {
                JobState::Done(Transcription {
                    text,
                    confidence: job.confidence,
                })
            }
        }
        "error" => JobState::Failed(
            job.error
                .unwrap_or_else(|| "unknown transcription error".to_string()),
        ),
        _ => JobState::Pending,
    }
}
