use serde::{Deserialize, Serialize};
use shelfwise_shared::{Message, Tool};

// Chat endpoint
#[derive(Deserialize, Serialize, Debug)]
pub struct ChatRequest {
    /// History so far, as returned by earlier turns. The server keeps none.
    #[serde(default)]
    pub messages: Vec<Message>,
    pub message: String,
    #[serde(default)]
    pub stream: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    /// Messages appended this turn, starting with the user message.
    pub messages: Vec<Message>,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GreetingResponse {
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<Tool>,
}
