use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::schemas::{Tool, ToolSchema};
use crate::toolbelts::catalog::{self, Catalog};
use crate::toolbelts::notion::{self, Notion};

/// Every action the model may request, decoded from a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    SearchCatalog {
        query: String,
        max_results: Option<usize>,
    },
    LookupCallNumber {
        title: String,
    },
    RecordBook {
        book_title: String,
        call_number: String,
        status: String,
        location: Option<String>,
        date: Option<String>,
    },
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

#[derive(Deserialize)]
struct CallNumberArgs {
    title: String,
}

#[derive(Deserialize)]
struct RecordArgs {
    book_title: String,
    call_number: String,
    status: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl ToolRequest {
    pub fn parse(name: &str, args: &Value) -> Result<Self> {
        let args = args.clone();
        let request = match name {
            "catalog_search" => {
                let a: SearchArgs = serde_json::from_value(args)?;
                ToolRequest::SearchCatalog { query: a.query, max_results: a.max_results }
            }
            "catalog_call_number" => {
                let a: CallNumberArgs = serde_json::from_value(args)?;
                ToolRequest::LookupCallNumber { title: a.title }
            }
            "notion_record_book" => {
                let a: RecordArgs = serde_json::from_value(args)?;
                ToolRequest::RecordBook {
                    book_title: a.book_title,
                    call_number: a.call_number,
                    status: a.status,
                    location: a.location.filter(|s| !s.trim().is_empty()),
                    date: a.date.filter(|s| !s.trim().is_empty()),
                }
            }
            other => return Err(anyhow!("Tool '{}' not found", other)),
        };
        Ok(request)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolRequest::SearchCatalog { .. } => "catalog_search",
            ToolRequest::LookupCallNumber { .. } => "catalog_call_number",
            ToolRequest::RecordBook { .. } => "notion_record_book",
        }
    }
}

/// The tools one engine instance offers, bound to their HTTP clients.
#[derive(Clone, Debug)]
pub struct Toolbox {
    catalog: Catalog,
    notion: Option<Notion>,
}

impl Toolbox {
    pub fn new(catalog: Catalog, notion: Option<Notion>) -> Self {
        Self { catalog, notion }
    }

    pub fn schemas(&self) -> Vec<&ToolSchema> {
        let mut schemas: Vec<&ToolSchema> = catalog::SCHEMAS.iter().collect();
        if self.notion.is_some() {
            schemas.extend(notion::SCHEMAS.iter());
        }
        schemas
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.schemas().iter().map(|s| s.to_tool()).collect()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.schemas().iter().map(|s| s.name).collect()
    }

    /// Run a tool call by name. Unknown tools and bad arguments become error text
    /// for the model rather than failing the run.
    pub async fn dispatch(&self, name: &str, args: &Value) -> String {
        if !self.tool_names().iter().any(|n| *n == name) {
            return format!(
                "Error: {} is not a valid tool, try one of [{}].",
                name,
                self.tool_names().join(", ")
            );
        }

        match ToolRequest::parse(name, args) {
            Ok(request) => self.execute(&request).await,
            Err(e) => format!("Error: invalid arguments for {}: {}", name, e),
        }
    }

    pub async fn execute(&self, request: &ToolRequest) -> String {
        info!(tool = request.name(), "executing tool");

        match request {
            ToolRequest::SearchCatalog { query, max_results } => {
                if query.trim().is_empty() {
                    return "Error: query cannot be empty".to_string();
                }
                self.catalog.search(query, *max_results).await
            }
            ToolRequest::LookupCallNumber { title } => {
                if title.trim().is_empty() {
                    return "Error: title cannot be empty".to_string();
                }
                self.catalog.call_number(title).await
            }
            ToolRequest::RecordBook { book_title, call_number, status, location, date } => {
                let Some(notion) = &self.notion else {
                    return "Error: the Notion reading list is not configured".to_string();
                };
                let record = notion.book(
                    book_title.as_str(),
                    call_number.as_str(),
                    status.as_str(),
                    location.clone(),
                    date.clone(),
                );
                notion.write_record(&record).await
            }
        }
    }
}
