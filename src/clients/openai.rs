//! OpenAI-compatible `/chat/completions` client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::traits::{ChatMessage, ChatModel, ChatRequest, ModelError};
use crate::config::ModelConfig;

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ProviderError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: reqwest::Client, config: &ModelConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, ModelError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            response_format: request.json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(
            "Sending chat completion (model={}, messages={})",
            self.model,
            request.messages.len()
        );

        let mut builder = self.client.post(self.url()).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<CompletionResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(ModelError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::ParseError(format!("Failed to parse response JSON: {}", e)))?;

        if let Some(err) = parsed.error {
            return Err(ModelError::Provider(
                err.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content))
    }
}
