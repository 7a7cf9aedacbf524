use serde::{Deserialize, Serialize};

use crate::Message;

/// Progress events streamed from the engine to clients, one per SSE `data:` line.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    ToolCall {
        id: String,
        tool: String,
        args: serde_json::Value,
    },
    ToolResult {
        id: String,
        tool: String,
        result: String,
        truncated: bool,
    },
    ResponseComplete {
        content: String,
    },
    /// Messages appended during this turn, for the client to keep as history.
    Done {
        messages: Vec<Message>,
    },
    Error {
        message: String,
    },
}
