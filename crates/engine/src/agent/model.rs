use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use shelfwise_shared::{Message, Tool};

use crate::config::ModelConfig;

/// A language model that answers a message history, optionally with tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[Message], tools: &[Tool]) -> Result<Message>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Tool]>,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Message,
}

/// OpenAI-compatible `/chat/completions` client. Also works against Ollama's
/// compatible endpoint, which needs no API key.
pub struct OpenAiChat {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(client: Client, config: &ModelConfig) -> Self {
        Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn invoke(&self, messages: &[Message], tools: &[Tool]) -> Result<Message> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        debug!(model = %self.model, messages = messages.len(), "invoking model");

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("model request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("model returned {}: {}", status, body));
        }

        let response: ChatResponse = response
            .json()
            .await
            .context("model returned an undecodable response")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow!("model returned no choices"))
    }
}
