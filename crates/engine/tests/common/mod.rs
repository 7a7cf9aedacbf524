#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shelfwise_engine::agent::ChatModel;
use shelfwise_engine::config::{Config, GraphConfig};
use shelfwise_engine::agent::AfterTools;
use shelfwise_shared::toolbelts::catalog::Catalog;
use shelfwise_shared::{Message, Tool, Toolbox};

/// Replays canned replies and records every history it was shown.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Message, String>>>,
    fallback: Option<Message>,
    pub seen: Mutex<Vec<Vec<Message>>>,
    pub offered_tools: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Message>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<Message, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            seen: Mutex::new(Vec::new()),
            offered_tools: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with the same reply.
    pub fn repeating(reply: Message) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::new(vec![])
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn history(&self, call: usize) -> Vec<Message> {
        self.seen.lock().unwrap()[call].clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[Message], tools: &[Tool]) -> Result<Message> {
        self.seen.lock().unwrap().push(messages.to_vec());
        *self.offered_tools.lock().unwrap() =
            tools.iter().map(|t| t.function.name.clone()).collect();

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow!(e)),
            None => self.fallback.clone().ok_or_else(|| anyhow!("script exhausted")),
        }
    }
}

pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn toolbox(catalog_url: &str) -> Toolbox {
    Toolbox::new(Catalog::new(http(), catalog_url, 3), None)
}

pub fn graph_config(after_tools: AfterTools) -> GraphConfig {
    GraphConfig {
        after_tools,
        max_steps: 25,
        greeting: None,
    }
}

pub fn config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

pub fn results_page(titles: &[&str]) -> String {
    let cards: String = titles
        .iter()
        .map(|t| format!(r#"<li class="cp-search-result-item"><h2>{t}</h2><span>Available now</span></li>"#))
        .collect();
    format!("<html><body><ul>{cards}</ul></body></html>")
}
