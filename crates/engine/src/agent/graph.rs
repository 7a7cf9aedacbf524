use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use shelfwise_shared::{Message, Toolbox};
use tracing::{debug, info};

use super::conversation::ConversationStep;
use crate::config::GraphConfig;
use crate::events::EventSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Conversation,
    Tools,
    End,
}

/// Outgoing edges of the Tools node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterTools {
    /// Return to the model so it can react to the tool results.
    Conversation,
    /// Stop right after the tools ran.
    End,
    /// Edges to both Conversation and End. Conversation takes precedence.
    Both,
}

impl AfterTools {
    pub fn next(self) -> Node {
        match self {
            AfterTools::Conversation | AfterTools::Both => Node::Conversation,
            AfterTools::End => Node::End,
        }
    }
}

impl FromStr for AfterTools {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conversation" => Ok(AfterTools::Conversation),
            "end" => Ok(AfterTools::End),
            "both" => Ok(AfterTools::Both),
            other => Err(format!("expected conversation, end or both, got '{}'", other)),
        }
    }
}

impl fmt::Display for AfterTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AfterTools::Conversation => "conversation",
            AfterTools::End => "end",
            AfterTools::Both => "both",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The full history, input included.
    pub messages: Vec<Message>,
    /// How many of `messages` were passed in.
    pub prior: usize,
    /// Nodes visited in order, ending with `Node::End`.
    pub trace: Vec<Node>,
}

impl RunOutcome {
    /// Messages appended by this run.
    pub fn appended(&self) -> &[Message] {
        &self.messages[self.prior.min(self.messages.len())..]
    }

    /// Text of this run's last assistant message without tool calls, if any.
    pub fn final_text(&self) -> Option<&str> {
        self.appended()
            .iter()
            .rev()
            .find(|m| m.role == shelfwise_shared::Role::Assistant && !m.has_tool_calls())
            .and_then(|m| m.content.as_deref())
    }

    pub fn tool_runs(&self) -> usize {
        self.trace.iter().filter(|n| **n == Node::Tools).count()
    }
}

/// Routes between the model and the tools until the model answers in plain text.
pub struct Graph<'a> {
    step: ConversationStep<'a>,
    toolbox: &'a Toolbox,
    config: &'a GraphConfig,
}

impl<'a> Graph<'a> {
    pub fn new(step: ConversationStep<'a>, toolbox: &'a Toolbox, config: &'a GraphConfig) -> Self {
        Self { step, toolbox, config }
    }

    /// Initial history before the first user turn.
    pub fn seed(config: &GraphConfig) -> Vec<Message> {
        config
            .greeting
            .as_ref()
            .map(|g| vec![Message::assistant(g.as_str())])
            .unwrap_or_default()
    }

    pub async fn run(&self, mut messages: Vec<Message>, events: Option<&EventSender>) -> Result<RunOutcome> {
        let prior = messages.len();
        let mut node = Node::Conversation;
        let mut trace = Vec::new();
        let mut model_steps = 0;

        loop {
            trace.push(node);
            node = match node {
                Node::Conversation => {
                    model_steps += 1;
                    if model_steps > self.config.max_steps {
                        bail!(
                            "recursion limit of {} model steps reached without a final answer",
                            self.config.max_steps
                        );
                    }

                    let reply = self.step.step(&messages).await?;
                    let next = if reply.has_tool_calls() { Node::Tools } else { Node::End };
                    debug!(step = model_steps, ?next, "model replied");
                    messages.push(reply);
                    next
                }
                Node::Tools => {
                    self.run_tools(&mut messages, events).await;
                    self.config.after_tools.next()
                }
                Node::End => break,
            };
        }

        Ok(RunOutcome { messages, prior, trace })
    }

    /// Resolve every tool call of the latest reply, in order, one result each.
    async fn run_tools(&self, messages: &mut Vec<Message>, events: Option<&EventSender>) {
        let calls = messages.last().map(|m| m.calls().to_vec()).unwrap_or_default();

        for call in calls {
            let name = &call.function.name;
            let args = &call.function.arguments;

            info!(tool = %name, %args, "calling tool");
            if let Some(events) = events {
                events.tool_call(&call.id, name, args.clone());
            }

            let result = self.toolbox.dispatch(name, args).await;

            debug!(tool = %name, chars = result.len(), "tool finished");
            if let Some(events) = events {
                events.tool_result(&call.id, name, &result);
            }

            messages.push(Message::tool_result(&call.id, result));
        }
    }
}
