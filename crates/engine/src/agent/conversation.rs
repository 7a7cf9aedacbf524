use anyhow::Result;
use shelfwise_shared::{Message, Role, Tool};

use super::model::ChatModel;

/// One model turn: system instruction + history in, one assistant reply out.
pub struct ConversationStep<'a> {
    model: &'a dyn ChatModel,
    system_prompt: Option<&'a str>,
    tools: Vec<Tool>,
}

impl<'a> ConversationStep<'a> {
    pub fn new(model: &'a dyn ChatModel, system_prompt: Option<&'a str>, tools: Vec<Tool>) -> Self {
        Self { model, system_prompt, tools }
    }

    /// Model failures propagate untouched; there is no retry.
    pub async fn step(&self, history: &[Message]) -> Result<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = self.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend_from_slice(history);

        let mut reply = self.model.invoke(&messages, &self.tools).await?;
        reply.role = Role::Assistant;
        reply.ensure_tool_call_ids();

        Ok(reply)
    }
}
