use anyhow::Result;
use serde::{Deserialize, Serialize};
use futures_util::StreamExt;
use shelfwise_shared::events::ChatEvent;
use shelfwise_shared::Message;

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub message: &'a str,
    stream: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub messages: Vec<Message>,
    pub content: String,
}

#[derive(Deserialize, Debug)]
struct GreetingResponse {
    messages: Vec<Message>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The seeded opening history, possibly empty.
    pub async fn greeting(&self) -> Result<Vec<Message>> {
        let url = format!("{}/greeting", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Request failed: {}", response.status()));
        }

        Ok(response.json::<GreetingResponse>().await?.messages)
    }

    pub async fn chat(&self, history: &[Message], message: &str) -> Result<ChatResponse> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            messages: history,
            message,
            stream: None,
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Request failed: {} {}", status, body));
        }

        Ok(response.json::<ChatResponse>().await?)
    }

    /// Stream one turn, handing each event to `event_handler`. Returns the messages
    /// appended this turn.
    pub async fn chat_stream(
        &self,
        history: &[Message],
        message: &str,
        mut event_handler: impl FnMut(&ChatEvent),
    ) -> Result<Vec<Message>> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            messages: history,
            message,
            stream: Some(true),
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Request failed: {}", response.status()));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();
        let mut appended = None;
        let mut failure = None;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            buffer.extend_from_slice(&bytes);

            // Process complete lines
            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let line = String::from_utf8_lossy(&line);

                // SSE format: "data: {json}\n"
                if let Some(data) = line.strip_prefix("data: ") {
                    let data = data.trim();
                    if data.is_empty() {
                        continue;
                    }

                    if let Ok(event) = serde_json::from_str::<ChatEvent>(data) {
                        match &event {
                            ChatEvent::Done { messages } => appended = Some(messages.clone()),
                            ChatEvent::Error { message } => failure = Some(message.clone()),
                            _ => {}
                        }
                        event_handler(&event);
                    }
                }
            }
        }

        match (appended, failure) {
            (Some(messages), _) => Ok(messages),
            (None, Some(message)) => Err(anyhow::anyhow!(message)),
            (None, None) => Err(anyhow::anyhow!("Stream ended without a response")),
        }
    }
}
