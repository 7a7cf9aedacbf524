use std::path::Path;

use anyhow::{Context, Result};

/// Persona and tool policy shipped with the engine.
pub const LIBRARIAN: &str = include_str!("../prompts/librarian.md");

/// Load the system prompt, preferring an override file when one is configured.
pub fn load(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let prompt = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt file {}", path.display()))?;
            Ok(prompt.trim().to_string())
        }
        None => Ok(LIBRARIAN.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwise_shared::toolbelts::notion::STATUSES;

    #[test]
    fn embedded_prompt_lists_every_status() {
        let prompt = load(None).unwrap();
        for status in STATUSES {
            assert!(prompt.contains(status), "prompt is missing status {:?}", status);
        }
    }

    #[test]
    fn embedded_prompt_names_every_tool() {
        for tool in ["catalog_search", "catalog_call_number", "notion_record_book"] {
            assert!(LIBRARIAN.contains(tool));
        }
    }

    #[test]
    fn missing_override_is_an_error() {
        assert!(load(Some(Path::new("/nonexistent/shelfwise/prompt.md"))).is_err());
    }
}
