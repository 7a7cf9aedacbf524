use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use shelfwise_shared::toolbelts::{
    catalog::{Catalog, DEFAULT_CATALOG_URL, DEFAULT_MAX_RESULTS},
    notion::{Notion, DEFAULT_LIBRARY, DEFAULT_NOTION_API, DEFAULT_NOTION_VERSION},
};
use shelfwise_shared::Toolbox;

use crate::agent::graph::AfterTools;

pub const DEFAULT_MODEL_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_STEPS: usize = 25;
pub const DEFAULT_GREETING: &str =
    "Hi! I can look up books in the library catalog and save them to your reading list. What are you looking for?";

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub catalog: CatalogConfig,
    pub notion: Option<NotionConfig>,
    pub graph: GraphConfig,
    pub prompt_path: Option<PathBuf>,
    pub bind: String,
    pub http_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_url: String,
    pub token: String,
    pub database_id: String,
    pub version: String,
    pub default_location: String,
}

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub after_tools: AfterTools,
    pub max_steps: usize,
    pub greeting: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            after_tools: AfterTools::Both,
            max_steps: DEFAULT_MAX_STEPS,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

impl Config {
    /// Read `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let model = ModelConfig {
            base_url: string_or("SHELFWISE_MODEL_URL", DEFAULT_MODEL_URL),
            api_key: get("OPENAI_API_KEY"),
            model: string_or("SHELFWISE_MODEL", DEFAULT_MODEL),
            temperature: parse_or(get("SHELFWISE_TEMPERATURE"), "SHELFWISE_TEMPERATURE", 0.0)?,
        };

        let catalog = CatalogConfig {
            base_url: string_or("SHELFWISE_CATALOG_URL", DEFAULT_CATALOG_URL),
            max_results: parse_or(get("SHELFWISE_MAX_RESULTS"), "SHELFWISE_MAX_RESULTS", DEFAULT_MAX_RESULTS)?,
        };

        let notion = match (get("NOTION_TOKEN"), get("NOTION_DATABASE_ID")) {
            (Some(token), Some(database_id)) => Some(NotionConfig {
                api_url: string_or("NOTION_API_URL", DEFAULT_NOTION_API),
                token,
                database_id,
                version: string_or("NOTION_VERSION", DEFAULT_NOTION_VERSION),
                default_location: string_or("SHELFWISE_LIBRARY", DEFAULT_LIBRARY),
            }),
            (None, None) => None,
            _ => return Err(anyhow!("NOTION_TOKEN and NOTION_DATABASE_ID must be set together")),
        };

        // An explicitly empty greeting disables seeding.
        let greeting = match lookup("SHELFWISE_GREETING") {
            Some(g) if g.trim().is_empty() => None,
            Some(g) => Some(g),
            None => Some(DEFAULT_GREETING.to_string()),
        };

        let graph = GraphConfig {
            after_tools: parse_or(get("SHELFWISE_AFTER_TOOLS"), "SHELFWISE_AFTER_TOOLS", AfterTools::Both)?,
            max_steps: parse_or(get("SHELFWISE_MAX_STEPS"), "SHELFWISE_MAX_STEPS", DEFAULT_MAX_STEPS)?,
            greeting,
        };
        if graph.max_steps == 0 {
            return Err(anyhow!("SHELFWISE_MAX_STEPS must be at least 1"));
        }

        let http_timeout = get("SHELFWISE_HTTP_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("SHELFWISE_HTTP_TIMEOUT_SECS: invalid value '{}'", v))
            })
            .transpose()?;

        Ok(Self {
            model,
            catalog,
            notion,
            graph,
            prompt_path: get("SHELFWISE_PROMPT").map(PathBuf::from),
            bind: string_or("SHELFWISE_BIND", DEFAULT_BIND),
            http_timeout,
        })
    }

    /// One HTTP client shared by the model and the tools.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent("Shelfwise/0.1");
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    pub fn toolbox(&self, client: &reqwest::Client) -> Toolbox {
        let catalog = Catalog::new(client.clone(), &self.catalog.base_url, self.catalog.max_results);

        let notion = self.notion.as_ref().map(|n| {
            Notion::new(client.clone(), &n.api_url, &n.token, &n.database_id)
                .with_version(&n.version)
                .with_default_location(&n.default_location)
        });

        Toolbox::new(catalog, notion)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow!("{}: invalid value '{}': {}", key, v, e)),
        None => Ok(default),
    }
}
