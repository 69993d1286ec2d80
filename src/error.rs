use thiserror::Error;

/// Result type alias for conversational turn operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur while driving a conversational turn.
///
/// Each remote provider client maps its transport and provider-side failures
/// into its own variant. Clients never retry; the orchestrator propagates the
/// first failure and the HTTP layer substitutes the fallback audio clip.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("reply generation failed: {0}")]
    Generation(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}
