//! Reply generation via the Gemini generateContent API
//!
//! This module owns the conversation history format. History is a list of
//! `ChatTurn` records in the provider's turn shape (`role` + `parts`); the
//! orchestrator threads it between calls without interpreting it. A call
//! sends the prior history plus the new user turn and returns the reply text
//! together with the full updated history (user turn and model turn appended).

use crate::config::LlmConfig;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// One turn of conversation context in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub parts: Vec<ChatPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPart {
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![ChatPart { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![ChatPart { text: text.into() }],
        }
    }
}

/// Generated reply for one conversational turn. Ephemeral.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
}

/// Generates a reply from the user's text and prior conversation history.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Returns the reply and the full updated history, inclusive of the new
    /// user turn and the new model turn. A failed call updates nothing.
    async fn generate(
        &self,
        user_text: &str,
        history: &[ChatTurn],
    ) -> AgentResult<(Reply, Vec<ChatTurn>)>;
}

/// Gemini REST client for conversational reply generation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        config: &LlmConfig,
        timeout: Duration,
    ) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build LLM HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(
        &self,
        user_text: &str,
        history: &[ChatTurn],
    ) -> AgentResult<(Reply, Vec<ChatTurn>)> {
        let contents = with_user_turn(history, user_text);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&GenerateContentRequest {
                contents: &contents,
            })
            .send()
            .await
            .map_err(|e| AgentError::Generation(format!("LLM request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Generation(format!(
                "LLM API error {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Generation(format!("failed to parse LLM response: {e}")))?;

        let text = extract_reply(parsed)?;
        info!("LLM reply generated ({} chars)", text.len());

        let mut updated_history = contents;
        updated_history.push(ChatTurn::model(text.clone()));

        Ok((Reply { text }, updated_history))
    }
}

/// Copies `history` and appends the new user turn.
fn with_user_turn(history: &[ChatTurn], user_text: &str) -> Vec<ChatTurn> {
    let mut contents = history.to_vec();
    contents.push(ChatTurn::user(user_text));
    contents
}

fn extract_reply(response: GenerateContentResponse) -> AgentResult<String> {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            AgentError::Generation("no text in provider response candidates".to_string())
        })
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [ChatTurn],
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_user_turn_appends_without_touching_prior_turns() {
        let history = vec![ChatTurn::user("hello"), ChatTurn::model("hi there")];

        let contents = with_user_turn(&history, "how are you?");

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[..2], history[..]);
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "how are you?");
    }

    #[test]
    fn extract_reply_takes_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "hi there"}]}}
            ]
        }))
        .unwrap();

        assert_eq!(extract_reply(response).unwrap(), "hi there");
    }

    #[test]
    fn extract_reply_fails_on_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();

        let err = extract_reply(response).unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
    }

    #[test]
    fn extract_reply_fails_on_textless_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{}]}}]
        }))
        .unwrap();

        assert!(extract_reply(response).is_err());
    }

    #[test]
    fn chat_turns_round_trip_through_json() {
        let turn = ChatTurn::model("reply text");

        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "model");
        assert_eq!(json["parts"][0]["text"], "reply text");

        let back: ChatTurn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }
}
