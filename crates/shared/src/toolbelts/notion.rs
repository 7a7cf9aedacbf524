use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::schemas::{ParameterSchema, ToolSchema};

pub const DEFAULT_NOTION_API: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_LIBRARY: &str = "Sunnyvale Public Library";

/// Availability values the reading-list database accepts.
pub const STATUSES: &[&str] = &["Available now", "Not available", "All copies in use"];

pub static SCHEMAS: Lazy<Vec<ToolSchema>> = Lazy::new(|| {
    vec![ToolSchema {
        name: "notion_record_book",
        description: "Record a book found in the library catalog in the user's Notion reading list.",
        parameters: vec![
            ParameterSchema::required("book_title", "string", "Title of the book"),
            ParameterSchema::required("call_number", "string", "Call number from the catalog"),
            ParameterSchema::required("status", "string", "Availability status from the catalog")
                .one_of(STATUSES),
            ParameterSchema::optional(
                "location",
                "string",
                "Library branch holding the book (defaults to the home library)",
            ),
            ParameterSchema::optional("date", "string", "ISO date of the lookup (defaults to today)"),
        ],
    }]
});

/// A reading-list entry. `status` is passed through as given.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub call_number: String,
    pub status: String,
    pub location: String,
    pub date: String,
}

impl BookRecord {
    pub fn new(
        title: impl Into<String>,
        call_number: impl Into<String>,
        status: impl Into<String>,
        location: impl Into<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            call_number: call_number.into(),
            status: status.into(),
            location: location.into(),
            date: date.unwrap_or_else(today),
        }
    }

    pub fn payload(&self, database_id: &str) -> Value {
        json!({
            "parent": { "database_id": database_id },
            "properties": {
                "Title": { "title": [{ "text": { "content": self.title } }] },
                "Status": { "select": { "name": self.status } },
                "Call Number": { "rich_text": [{ "text": { "content": self.call_number } }] },
                "Library Location": { "rich_text": [{ "text": { "content": self.location } }] },
                "Date": { "date": { "start": self.date } }
            }
        })
    }
}

pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Creates pages in one Notion database. Write-only.
#[derive(Clone, Debug)]
pub struct Notion {
    client: reqwest::Client,
    api_url: String,
    token: String,
    database_id: String,
    version: String,
    default_location: String,
}

impl Notion {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            database_id: database_id.into(),
            version: DEFAULT_NOTION_VERSION.to_string(),
            default_location: DEFAULT_LIBRARY.to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// A record for this database, located at the configured library unless given.
    pub fn book(
        &self,
        title: impl Into<String>,
        call_number: impl Into<String>,
        status: impl Into<String>,
        location: Option<String>,
        date: Option<String>,
    ) -> BookRecord {
        let location = location.unwrap_or_else(|| self.default_location.clone());
        BookRecord::new(title, call_number, status, location, date)
    }

    /// Creates the page and describes the outcome. Never fails outward.
    pub async fn write_record(&self, record: &BookRecord) -> String {
        let url = format!("{}/pages", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(&record.payload(&self.database_id))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(title = %record.title, error = %e, "notion request failed");
                return format!("Error writing '{}' to Notion: {}", record.title, e);
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!(title = %record.title, call_number = %record.call_number, "recorded book in notion");
            return format!(
                "Added '{}' (call number {}, {}) to the Notion reading list.",
                record.title, record.call_number, record.status
            );
        }

        let body = response.text().await.unwrap_or_default();
        warn!(title = %record.title, %status, "notion rejected record");
        format!(
            "Failed to add '{}' to Notion: HTTP {} {}",
            record.title,
            status.as_u16(),
            body
        )
    }
}
