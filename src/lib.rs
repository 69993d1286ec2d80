pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod providers;
pub mod session;

pub use config::{Config, ProviderKeys};
pub use error::{AgentError, AgentResult};
pub use http::{create_router, AppState, ChatResponse, HealthResponse};
pub use orchestrator::TurnOrchestrator;
pub use providers::{
    AssemblyAiClient, ChatTurn, GeminiClient, MurfClient, Reply, ReplyGenerator, SpeechSynthesizer,
    SpeechToText, Synthesis, Transcription,
};
pub use session::{Session, SessionStore};
