//! Clients for the three remote AI providers
//!
//! Each provider gets a thin adapter over its wire contract:
//! - `stt`: speech-to-text (AssemblyAI transcript jobs)
//! - `llm`: conversational reply generation (Gemini generateContent)
//! - `tts`: speech synthesis (Murf speech/generate)
//!
//! Every client is behind a trait so the turn orchestrator can be exercised
//! against in-process fakes. Clients surface failures immediately and never
//! retry; recovery happens only at the request boundary.

pub mod llm;
pub mod stt;
pub mod tts;

pub use llm::{ChatPart, ChatTurn, GeminiClient, Reply, ReplyGenerator};
pub use stt::{AssemblyAiClient, SpeechToText, Transcription};
pub use tts::{MurfClient, SpeechSynthesizer, Synthesis};
