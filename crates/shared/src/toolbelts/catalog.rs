use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::schemas::{ParameterSchema, ToolSchema};

pub const DEFAULT_CATALOG_URL: &str = "https://sunnyvale.bibliocommons.com";
pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const MAX_RESULTS_CAP: usize = 10;

pub const FETCH_FAILED: &str = "Failed to fetch search results.";
pub const NO_RESULTS: &str = "No search results found.";
pub const LOOKUP_FAILED: &str = "Failed to look up call number.";
pub const CALL_NUMBER_NOT_FOUND: &str = "Call number not found.";

static RESULT_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.cp-search-result-item").expect("valid result selector"));
static CALL_NUMBER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".call-number").expect("valid call number selector"));

pub static SCHEMAS: Lazy<Vec<ToolSchema>> = Lazy::new(|| {
    vec![
        ToolSchema {
            name: "catalog_search",
            description: "Search the public library catalog by title, author or keyword. \
                          Returns the visible text of the top result cards (title, author, \
                          format, availability, call number) for you to interpret.",
            parameters: vec![
                ParameterSchema::required("query", "string", "Title, author or keyword to search for"),
                ParameterSchema::optional(
                    "max_results",
                    "integer",
                    "Maximum number of result cards to return (default: 3, max: 10)",
                ),
            ],
        },
        ToolSchema {
            name: "catalog_call_number",
            description: "Find the call number (shelf location code) of a book in the library by its title.",
            parameters: vec![ParameterSchema::required("title", "string", "Book title")],
        },
    ]
});

/// Scrapes the BiblioCommons search page of one library.
#[derive(Clone, Debug)]
pub struct Catalog {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl Catalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: clamp_results(max_results),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/v2/search?query={}&searchType=smart",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Visible text of up to `max_results` result cards. Failures come back as prose.
    pub async fn search(&self, query: &str, max_results: Option<usize>) -> String {
        let limit = max_results.map(clamp_results).unwrap_or(self.max_results);

        match self.fetch(query).await {
            Ok(Some(html)) => extract_results(&html, limit),
            Ok(None) => FETCH_FAILED.to_string(),
            Err(e) => {
                warn!(query, error = %e, "catalog search request failed");
                format!("Failed to fetch search results: {}", e)
            }
        }
    }

    pub async fn call_number(&self, title: &str) -> String {
        match self.fetch(title).await {
            Ok(Some(html)) => {
                extract_call_number(&html).unwrap_or_else(|| CALL_NUMBER_NOT_FOUND.to_string())
            }
            Ok(None) => LOOKUP_FAILED.to_string(),
            Err(e) => {
                warn!(title, error = %e, "call number lookup failed");
                format!("Failed to look up call number: {}", e)
            }
        }
    }

    /// `Ok(None)` on a non-success status.
    async fn fetch(&self, query: &str) -> reqwest::Result<Option<String>> {
        let url = self.search_url(query);
        debug!(%url, "fetching catalog page");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "catalog returned non-success status");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

fn clamp_results(n: usize) -> usize {
    n.clamp(1, MAX_RESULTS_CAP)
}

pub fn extract_results(html: &str, max_results: usize) -> String {
    let document = Html::parse_document(html);

    let results: Vec<String> = document
        .select(&RESULT_CARD)
        .take(max_results)
        .map(|card| visible_text(&card))
        .enumerate()
        .map(|(i, text)| format!("--- Result {} ---\n{}", i + 1, text))
        .collect();

    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results.join("\n\n")
}

pub fn extract_call_number(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&CALL_NUMBER)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn visible_text(element: &ElementRef) -> String {
    let mut parts = Vec::new();
    collect_text(element, &mut parts);
    parts.join("\n")
}

fn collect_text(element: &ElementRef, parts: &mut Vec<String>) {
    if matches!(element.value().name(), "script" | "style" | "noscript" | "template") {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        } else if let Some(child_ref) = ElementRef::wrap(child) {
            collect_text(&child_ref, parts);
        }
    }
}
