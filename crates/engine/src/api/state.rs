use std::sync::Arc;

use anyhow::Result;
use shelfwise_shared::Toolbox;

use crate::agent::{ChatModel, ConversationStep, Graph, OpenAiChat};
use crate::config::Config;
use crate::prompt;

/// Everything a request needs, built once at startup and shared read-only.
pub struct AppState {
    pub config: Config,
    pub model: Arc<dyn ChatModel>,
    pub toolbox: Toolbox,
    pub system_prompt: String,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn ChatModel>, toolbox: Toolbox, system_prompt: String) -> Self {
        Self { config, model, toolbox, system_prompt }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let system_prompt = prompt::load(config.prompt_path.as_deref())?;
        let model: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(client.clone(), &config.model));
        let toolbox = config.toolbox(&client);

        Ok(Self::new(config, model, toolbox, system_prompt))
    }

    pub fn graph(&self) -> Graph<'_> {
        let step = ConversationStep::new(
            self.model.as_ref(),
            Some(self.system_prompt.as_str()),
            self.toolbox.tools(),
        );
        Graph::new(step, &self.toolbox, &self.config.graph)
    }
}
