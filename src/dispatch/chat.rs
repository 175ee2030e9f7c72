//! OpenAI-compatible chat completions dispatcher

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::Dispatcher;
use crate::agents::AgentProfile;
use crate::config::{LlmConfig, TripSageConfig};
use crate::{TripSageError, http};

/// Dispatcher backed by any `/chat/completions` endpoint (OpenAI, Groq,
/// OpenRouter, a local server, ...)
pub struct ChatDispatcher {
    client: ClientWithMiddleware,
    endpoint: String,
    api_key: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatDispatcher {
    /// Create a dispatcher for the configured endpoint
    pub fn new(llm: &LlmConfig, api_key: impl Into<String>) -> crate::Result<Self> {
        let client = http::build_client(llm.timeout_seconds, llm.max_retries)?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", llm.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            max_tokens: llm.max_tokens,
        })
    }

    /// Create a dispatcher from the full configuration. Fails without an API key.
    pub fn from_config(config: &TripSageConfig) -> crate::Result<Self> {
        let api_key = config.require_api_key()?;
        Self::new(&config.llm, api_key)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn user_message(context: &str, instruction: &str) -> String {
    format!("Context:\n{context}\n\nInstruction:\n{instruction}")
}

#[async_trait]
impl Dispatcher for ChatDispatcher {
    #[instrument(skip(self, agent, context, instruction), fields(agent = %agent.kind, model = %agent.model))]
    async fn dispatch(
        &self,
        agent: &AgentProfile,
        context: &str,
        instruction: &str,
    ) -> crate::Result<String> {
        let start_time = Instant::now();
        let system = agent.system_prompt();
        let user = user_message(context, instruction);

        let request = ChatRequest {
            model: &agent.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: agent.temperature,
            max_tokens: self.max_tokens,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| TripSageError::dispatch(format!("Failed to encode request: {e}")))?;

        debug!(
            "Dispatching to {} ({} bytes of context)",
            self.endpoint,
            context.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Model request failed: {}", e);
                TripSageError::dispatch(format!("Request to model endpoint failed: {e}"))
            })?;

        let body = http::read_body(response).await.map_err(|message| {
            error!("Model endpoint returned an error: {}", message);
            TripSageError::dispatch(message)
        })?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            TripSageError::dispatch(format!(
                "Malformed model response: {e}, body: {}",
                http::preview(&body)
            ))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TripSageError::dispatch("Model response contained no choices"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!("Model output was truncated at the token limit");
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| TripSageError::dispatch("Model returned an empty report"))?;

        let duration = start_time.elapsed();
        match parsed.usage {
            Some(usage) => info!(
                "Agent {} answered in {:.3}s ({} prompt / {} completion tokens)",
                agent.kind,
                duration.as_secs_f64(),
                usage.prompt_tokens,
                usage.completion_tokens
            ),
            None => info!(
                "Agent {} answered in {:.3}s",
                agent.kind,
                duration.as_secs_f64()
            ),
        }

        Ok(content)
    }
}
