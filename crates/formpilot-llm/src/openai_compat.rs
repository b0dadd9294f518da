use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::{ChatMessage, LlmClient, LlmError};

/// OpenAI-compatible chat-completions client, configured from
/// `LLM_API_ENDPOINT`/`LLM_API_KEY`/`LLM_MODEL_NAME`/`LLM_REQUEST_TIMEOUT_SEC`.
///
/// One call per `complete()`, wrapped in a hard `tokio::time::timeout` — no
/// retry logic lives here (see `LlmClient`'s doc comment).
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiCompatClient {
    pub fn new(endpoint: String, api_key: String, model: String, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError> {
        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt,
        })];
        for m in history {
            messages.push(serde_json::json!({
                "role": m.role,
                "content": m.content,
            }));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        debug!(model = %self.model, endpoint = %self.endpoint, "calling LLM");

        let call = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send();

        let resp = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(LlmError::Transport(e.to_string())),
            Err(_) => {
                return Err(LlmError::Timeout { secs: self.timeout.as_secs() });
            }
        };

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "LLM API error");
            return Err(LlmError::Api { status, message: text });
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("no choices in LLM response".to_string()))
    }
}
