use tokio::sync::mpsc;
pub use shelfwise_shared::events::ChatEvent;
use shelfwise_shared::Message;

const RESULT_PREVIEW_CHARS: usize = 500;

/// Create the event channel for one streaming request.
pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<ChatEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// Reports graph progress to a streaming client. Sends are dropped once the client
/// has gone away.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl EventSender {
    pub fn tool_call(&self, id: &str, tool: &str, args: serde_json::Value) {
        self.send(ChatEvent::ToolCall {
            id: id.to_string(),
            tool: tool.to_string(),
            args,
        });
    }

    pub fn tool_result(&self, id: &str, tool: &str, result: &str) {
        let total = result.chars().count();
        let truncated = total > RESULT_PREVIEW_CHARS;
        let display_result = if truncated {
            let preview: String = result.chars().take(RESULT_PREVIEW_CHARS).collect();
            format!("{}... ({} chars total)", preview, total)
        } else {
            result.to_string()
        };

        self.send(ChatEvent::ToolResult {
            id: id.to_string(),
            tool: tool.to_string(),
            result: display_result,
            truncated,
        });
    }

    pub fn response_complete(&self, content: String) {
        self.send(ChatEvent::ResponseComplete { content });
    }

    pub fn done(&self, messages: Vec<Message>) {
        self.send(ChatEvent::Done { messages });
    }

    pub fn error(&self, message: String) {
        self.send(ChatEvent::Error { message });
    }

    fn send(&self, event: ChatEvent) {
        let _ = self.tx.send(event);
    }
}
